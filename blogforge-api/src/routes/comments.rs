/// Comment endpoints
///
/// - `GET /api/v1/articles/:id/comments` - Active comments, oldest first
/// - `POST /api/v1/articles/:id/comments` - Post a comment or reply
/// - `DELETE /api/v1/comments/:id` - Soft delete (author or admin)

use crate::{
    app::AppState,
    error::ApiResult,
    extract::{IdPath, ValidJson},
    response::ApiResponse,
};
use axum::{extract::State, Extension};
use blogforge_shared::{auth::middleware::AuthContext, models::comment::CommentView};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 1000, message = "Content must be 1-1000 characters"))]
    pub content: String,

    /// Comment being replied to
    pub parent_id: Option<i64>,
}

pub async fn list_comments(
    State(state): State<AppState>,
    IdPath(article_id): IdPath,
) -> ApiResult<ApiResponse<Vec<CommentView>>> {
    let comments = state.comments.list_for_article(article_id).await?;
    Ok(ApiResponse::success(comments))
}

pub async fn create_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    IdPath(article_id): IdPath,
    ValidJson(req): ValidJson<CreateCommentRequest>,
) -> ApiResult<ApiResponse<CommentView>> {
    let comment = state
        .comments
        .create(article_id, auth.user_id, req.content, req.parent_id)
        .await?;

    Ok(ApiResponse::with_msg("Commented successfully", comment))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    IdPath(id): IdPath,
) -> ApiResult<ApiResponse<()>> {
    state.comments.delete(id, &auth).await?;
    Ok(ApiResponse::message("Deleted successfully"))
}
