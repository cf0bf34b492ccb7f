/// Tag endpoints
///
/// - `GET /api/v1/tags` - All tags by name (public)
/// - `POST /api/v1/admin/tags` - Create (admin)
/// - `DELETE /api/v1/admin/tags/:id` - Delete and detach (admin)

use crate::{
    app::AppState,
    error::ApiResult,
    extract::{IdPath, ValidJson},
    response::ApiResponse,
};
use axum::extract::State;
use blogforge_shared::models::tag::Tag;
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTagRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: String,
}

pub async fn list_tags(State(state): State<AppState>) -> ApiResult<ApiResponse<Vec<Tag>>> {
    Ok(ApiResponse::success(state.tags.list().await?))
}

pub async fn create_tag(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<CreateTagRequest>,
) -> ApiResult<ApiResponse<Tag>> {
    let tag = state.tags.create(&req.name).await?;
    Ok(ApiResponse::with_msg("Created successfully", tag))
}

pub async fn delete_tag(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> ApiResult<ApiResponse<()>> {
    state.tags.delete(id).await?;
    Ok(ApiResponse::message("Deleted successfully"))
}
