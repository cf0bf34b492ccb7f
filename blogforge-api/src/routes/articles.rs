/// Article endpoints
///
/// # Endpoints
///
/// - `GET /api/v1/articles` - Paginated listing (public)
/// - `GET /api/v1/articles/:id` - Detail; counts a view (public)
/// - `POST /api/v1/articles` - Create
/// - `PUT /api/v1/articles/:id` - Partial update
/// - `DELETE /api/v1/articles/:id` - Delete
/// - `POST /api/v1/articles/:id/like` - Like
///
/// `status` is `0` (draft) or `1` (published) on input. A `category_id` of
/// `0` means "no category".

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{IdPath, QueryParams, ValidJson},
    response::ApiResponse,
    routes::non_empty,
};
use axum::{extract::State, Extension};
use blogforge_shared::{
    auth::middleware::AuthContext,
    models::article::{ArticleChanges, ArticleStatus, ArticleView, NewArticle},
    services::{articles::ArticleQuery, Page, Pagination},
};
use serde::Deserialize;
use validator::Validate;

/// Listing query string
#[derive(Debug, Default, Deserialize)]
pub struct ListArticlesQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub status: Option<i16>,
    pub category_id: Option<i64>,
}

impl TryFrom<ListArticlesQuery> for ArticleQuery {
    type Error = ApiError;

    fn try_from(q: ListArticlesQuery) -> Result<Self, Self::Error> {
        Ok(ArticleQuery {
            pagination: Pagination::new(q.page, q.page_size),
            status: q.status.map(parse_status).transpose()?,
            category_id: q.category_id,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateArticleRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: String,

    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,

    #[serde(default)]
    #[validate(length(max = 255, message = "Cover must be at most 255 characters"))]
    pub cover: String,

    pub category_id: Option<i64>,

    #[serde(default)]
    pub tag_ids: Vec<i64>,

    #[serde(default)]
    #[validate(range(min = 0, max = 1, message = "Status must be 0 or 1"))]
    pub status: i16,

    #[serde(default)]
    pub is_top: bool,
}

/// Partial update; omitted fields and empty strings are left unchanged
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateArticleRequest {
    #[validate(length(max = 200, message = "Title must be at most 200 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    pub content: Option<String>,

    #[validate(length(max = 255, message = "Cover must be at most 255 characters"))]
    pub cover: Option<String>,

    pub category_id: Option<i64>,

    /// Replaces the tag set only when non-empty
    pub tag_ids: Option<Vec<i64>>,

    #[validate(range(min = 0, max = 1, message = "Status must be 0 or 1"))]
    pub status: Option<i16>,

    pub is_top: Option<bool>,
}

fn parse_status(code: i16) -> ApiResult<ArticleStatus> {
    ArticleStatus::from_code(code)
        .ok_or_else(|| ApiError::BadRequest("Status must be 0 or 1".to_string()))
}

/// `0` and absent both mean "no category"
fn category(id: Option<i64>) -> Option<i64> {
    id.filter(|&id| id > 0)
}

impl TryFrom<CreateArticleRequest> for NewArticle {
    type Error = ApiError;

    fn try_from(req: CreateArticleRequest) -> Result<Self, Self::Error> {
        Ok(NewArticle {
            title: req.title,
            description: req.description,
            content: req.content,
            cover: req.cover,
            category_id: category(req.category_id),
            status: parse_status(req.status)?,
            is_top: req.is_top,
            tag_ids: req.tag_ids,
        })
    }
}

impl TryFrom<UpdateArticleRequest> for ArticleChanges {
    type Error = ApiError;

    fn try_from(req: UpdateArticleRequest) -> Result<Self, Self::Error> {
        Ok(ArticleChanges {
            title: non_empty(req.title),
            description: non_empty(req.description),
            content: non_empty(req.content),
            cover: non_empty(req.cover),
            category_id: req.category_id.map(|id| category(Some(id))),
            status: req.status.map(parse_status).transpose()?,
            is_top: req.is_top,
            tag_ids: req.tag_ids,
        })
    }
}

pub async fn list_articles(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListArticlesQuery>,
) -> ApiResult<ApiResponse<Page<ArticleView>>> {
    let page = state.articles.list(query.try_into()?).await?;
    Ok(ApiResponse::success(page))
}

pub async fn get_article(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> ApiResult<ApiResponse<ArticleView>> {
    let article = state.articles.get(id).await?;
    Ok(ApiResponse::success(article))
}

pub async fn create_article(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidJson(req): ValidJson<CreateArticleRequest>,
) -> ApiResult<ApiResponse<ArticleView>> {
    let article = state
        .articles
        .create(auth.user_id, req.try_into()?)
        .await?;

    Ok(ApiResponse::with_msg("Created successfully", article))
}

pub async fn update_article(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ValidJson(req): ValidJson<UpdateArticleRequest>,
) -> ApiResult<ApiResponse<ArticleView>> {
    let article = state.articles.update(id, req.try_into()?).await?;
    Ok(ApiResponse::with_msg("Updated successfully", article))
}

pub async fn delete_article(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> ApiResult<ApiResponse<()>> {
    state.articles.delete(id).await?;
    Ok(ApiResponse::message("Deleted successfully"))
}

pub async fn like_article(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> ApiResult<ApiResponse<()>> {
    state.articles.like(id).await?;
    Ok(ApiResponse::message("Liked successfully"))
}
