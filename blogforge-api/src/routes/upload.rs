/// File upload endpoint
///
/// ```text
/// POST /api/v1/upload
/// Content-Type: multipart/form-data; field "file"
/// ```
///
/// Responds with `{"path": "2025-01-01/<uuid>.png", "url": "<base>/uploads/..."}`.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    response::ApiResponse,
};
use axum::extract::{Multipart, State};
use blogforge_shared::upload::StoredFile;

/// Multipart field carrying the file
const FILE_FIELD: &str = "file";

pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<ApiResponse<StoredFile>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        let stored = state.uploads.save(&filename, &bytes).await?;
        return Ok(ApiResponse::success(stored));
    }

    Err(ApiError::BadRequest(
        "Please choose a file to upload".to_string(),
    ))
}
