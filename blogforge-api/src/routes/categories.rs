/// Category endpoints
///
/// # Endpoints
///
/// - `GET /api/v1/categories` - All categories by `sort` (public)
/// - `GET /api/v1/categories/:id` - One category (public)
/// - `POST /api/v1/admin/categories` - Create (admin)
/// - `PUT /api/v1/admin/categories/:id` - Update (admin)
/// - `DELETE /api/v1/admin/categories/:id` - Delete if unused (admin)

use crate::{
    app::AppState,
    error::ApiResult,
    extract::{IdPath, ValidJson},
    response::ApiResponse,
};
use axum::extract::State;
use blogforge_shared::models::category::{Category, CategoryChanges, NewCategory};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 255, message = "Description must be at most 255 characters"))]
    pub description: String,

    #[serde(default)]
    pub sort: i32,
}

/// Partial update; omitted fields are left unchanged
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 255, message = "Description must be at most 255 characters"))]
    pub description: Option<String>,

    pub sort: Option<i32>,
}

pub async fn list_categories(State(state): State<AppState>) -> ApiResult<ApiResponse<Vec<Category>>> {
    Ok(ApiResponse::success(state.categories.list().await?))
}

pub async fn get_category(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> ApiResult<ApiResponse<Category>> {
    Ok(ApiResponse::success(state.categories.get(id).await?))
}

pub async fn create_category(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<CreateCategoryRequest>,
) -> ApiResult<ApiResponse<Category>> {
    let category = state
        .categories
        .create(NewCategory {
            name: req.name,
            description: req.description,
            sort: req.sort,
        })
        .await?;

    Ok(ApiResponse::with_msg("Created successfully", category))
}

pub async fn update_category(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ValidJson(req): ValidJson<UpdateCategoryRequest>,
) -> ApiResult<ApiResponse<Category>> {
    let category = state
        .categories
        .update(
            id,
            CategoryChanges {
                name: req.name,
                description: req.description,
                sort: req.sort,
            },
        )
        .await?;

    Ok(ApiResponse::with_msg("Updated successfully", category))
}

pub async fn delete_category(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> ApiResult<ApiResponse<()>> {
    state.categories.delete(id).await?;
    Ok(ApiResponse::message("Deleted successfully"))
}
