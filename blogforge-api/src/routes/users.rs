/// User endpoints
///
/// # Endpoints
///
/// - `GET /api/v1/user/profile` - Own profile
/// - `PUT /api/v1/user/profile` - Update nickname, email, avatar
/// - `PUT /api/v1/user/password` - Change own password
/// - `GET /api/v1/admin/users/:id` - Any user's profile (admin)

use crate::{
    app::AppState,
    error::ApiResult,
    extract::{IdPath, ValidJson},
    response::ApiResponse,
    routes::non_empty,
};
use axum::{extract::State, Extension};
use blogforge_shared::{
    auth::middleware::AuthContext,
    models::user::{ProfileChanges, User},
};
use serde::Deserialize;
use validator::Validate;

/// Profile update; empty or missing fields are left unchanged
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 50, message = "Nickname must be at most 50 characters"))]
    pub nickname: Option<String>,

    #[validate(custom(function = "crate::routes::validate_optional_email"))]
    pub email: Option<String>,

    #[validate(length(max = 255, message = "Avatar must be at most 255 characters"))]
    pub avatar: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileChanges {
    fn from(req: UpdateProfileRequest) -> Self {
        ProfileChanges {
            nickname: non_empty(req.nickname),
            email: non_empty(req.email).map(Some),
            avatar: non_empty(req.avatar),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Old password is required"))]
    pub old_password: String,

    #[validate(length(min = 6, max = 50, message = "New password must be 6-50 characters"))]
    pub new_password: String,
}

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<ApiResponse<User>> {
    let user = state.accounts.get_user(auth.user_id).await?;
    Ok(ApiResponse::success(user))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidJson(req): ValidJson<UpdateProfileRequest>,
) -> ApiResult<ApiResponse<User>> {
    let user = state
        .accounts
        .update_profile(auth.user_id, req.into())
        .await?;

    Ok(ApiResponse::with_msg("Updated successfully", user))
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidJson(req): ValidJson<ChangePasswordRequest>,
) -> ApiResult<ApiResponse<()>> {
    state
        .accounts
        .change_password(auth.user_id, &req.old_password, &req.new_password)
        .await?;

    Ok(ApiResponse::message("Password changed successfully"))
}

pub async fn get_user(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> ApiResult<ApiResponse<User>> {
    let user = state.accounts.get_user(id).await?;
    Ok(ApiResponse::success(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_fields_are_unchanged() {
        let changes: ProfileChanges = UpdateProfileRequest {
            nickname: Some(String::new()),
            email: Some(String::new()),
            avatar: Some("/uploads/a.png".to_string()),
        }
        .into();

        assert_eq!(changes.nickname, None);
        assert_eq!(changes.email, None);
        assert_eq!(changes.avatar.as_deref(), Some("/uploads/a.png"));
    }
}
