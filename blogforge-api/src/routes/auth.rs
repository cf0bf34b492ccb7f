/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/v1/register` - Register new user
/// - `POST /api/v1/login` - Login and get tokens
/// - `POST /api/v1/refresh` - Exchange a refresh token for an access token

use crate::{
    app::AppState,
    error::ApiResult,
    extract::ValidJson,
    response::ApiResponse,
};
use axum::extract::State;
use blogforge_shared::services::account::{Registration, TokenPair};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,

    #[validate(length(min = 6, max = 50, message = "Password must be 6-50 characters"))]
    pub password: String,

    /// Optional; an empty string counts as absent
    #[serde(default)]
    #[validate(custom(function = "crate::routes::validate_optional_email"))]
    pub email: Option<String>,

    #[validate(length(max = 50, message = "Nickname must be at most 50 characters"))]
    pub nickname: Option<String>,
}

/// Register response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: i64,
    pub username: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Refresh token request
#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub token: String,
}

/// Register a new user
///
/// ```text
/// POST /api/v1/register
///
/// {"username": "alice", "password": "secret1", "email": "a@example.com", "nickname": "Alice"}
/// ```
///
/// Responds with `{"id": 1, "username": "alice"}`.
pub async fn register(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<RegisterRequest>,
) -> ApiResult<ApiResponse<RegisterResponse>> {
    let user = state
        .accounts
        .register(Registration {
            username: req.username,
            password: req.password,
            email: req.email,
            nickname: req.nickname,
        })
        .await?;

    Ok(ApiResponse::with_msg(
        "Registered successfully",
        RegisterResponse {
            id: user.id,
            username: user.username,
        },
    ))
}

/// Login endpoint
///
/// ```text
/// POST /api/v1/login
///
/// {"username": "alice", "password": "secret1"}
/// ```
///
/// Responds with `{"token": "eyJ...", "refresh_token": "eyJ..."}`. Unknown
/// usernames and wrong passwords get the same answer.
pub async fn login(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> ApiResult<ApiResponse<TokenPair>> {
    let (_, tokens) = state.accounts.login(&req.username, &req.password).await?;

    Ok(ApiResponse::success(tokens))
}

/// Token refresh endpoint
///
/// The refresh token itself is not rotated and stays valid until it
/// expires.
pub async fn refresh(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<RefreshRequest>,
) -> ApiResult<ApiResponse<RefreshResponse>> {
    let token = state.accounts.refresh(&req.refresh_token).await?;

    Ok(ApiResponse::success(RefreshResponse { token }))
}
