//! Authentication middleware for Axum
//!
//! The JWT middleware takes a request through
//! `Unauthenticated -> TokenExtracted -> Validated` and either binds an
//! [`AuthContext`] into the request extensions or rejects with `401`.
//! Rejections are written directly with the HTTP status line and the
//! standard `{code, msg}` body, before any handler runs.
//!
//! # Example
//!
//! ```no_run
//! use axum::{middleware, routing::get, Extension, Router};
//! use blogforge_shared::auth::jwt::{JwtConfig, TokenService};
//! use blogforge_shared::auth::middleware::{jwt_auth_middleware, AuthContext};
//!
//! async fn whoami(Extension(auth): Extension<AuthContext>) -> String {
//!     format!("user {} ({})", auth.username, auth.role)
//! }
//!
//! let tokens = TokenService::new(JwtConfig::new("a-secret-that-is-at-least-32-bytes!!"));
//! let app: Router = Router::new()
//!     .route("/whoami", get(whoami))
//!     .layer(middleware::from_fn_with_state(tokens, jwt_auth_middleware));
//! ```

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::jwt::{Claims, JwtError, TokenService};

/// Authenticated principal bound to the request by [`jwt_auth_middleware`]
///
/// Handlers extract it with `Extension<AuthContext>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: i64,

    /// Username carried in the token
    pub username: String,

    /// Role carried in the token
    pub role: String,
}

impl AuthContext {
    /// Builds the context from validated claims
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
            role: claims.role,
        }
    }

    /// Exact, case-sensitive role comparison
    pub fn has_role(&self, role: &str) -> bool {
        self.role == role
    }
}

/// Error type for authentication middleware
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Missing authorization header
    #[error("Missing authorization header")]
    MissingCredentials,

    /// Authorization header is not `Bearer <token>`
    #[error("{0}")]
    InvalidFormat(String),

    /// Token validation failed
    #[error("{0}")]
    InvalidToken(String),
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
            JwtError::NotYetValid => AuthError::InvalidToken("Token not valid yet".to_string()),
            _ => AuthError::InvalidToken("Invalid token".to_string()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        gate_rejection(StatusCode::UNAUTHORIZED, self.to_string())
    }
}

/// Builds a gate rejection: real HTTP status plus the `{code, msg}` body
pub(crate) fn gate_rejection(status: StatusCode, msg: String) -> Response {
    let body = Json(json!({
        "code": status.as_u16(),
        "msg": msg,
    }));

    (status, body).into_response()
}

/// Extracts the token from an `Authorization` header value
///
/// The value is split on the first space only and must yield exactly
/// `Bearer` followed by a non-empty token.
pub fn extract_bearer(header_value: &str) -> Result<&str, AuthError> {
    let mut parts = header_value.splitn(2, ' ');

    match (parts.next(), parts.next()) {
        (Some("Bearer"), Some(token)) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::InvalidFormat(
            "Authorization header must be 'Bearer <token>'".to_string(),
        )),
    }
}

/// JWT authentication middleware
///
/// Validates the access token from `Authorization: Bearer <token>` and
/// inserts an [`AuthContext`] into the request extensions.
///
/// # Errors
///
/// Returns 401 Unauthorized if:
/// - Authorization header is missing
/// - Header is not of the form `Bearer <token>`
/// - Token signature or validity window check fails
/// - A refresh token is presented
pub async fn jwt_auth_middleware(
    State(tokens): State<TokenService>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthError::InvalidFormat("Authorization header is not valid ASCII".to_string()))?;

    let token = extract_bearer(auth_header)?;

    let claims = tokens.validate_access_token(token).map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
        AuthError::from(e)
    })?;

    req.extensions_mut().insert(AuthContext::from_claims(claims));

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::JwtConfig;
    use axum::{body::Body, http::Request as HttpRequest, middleware, routing::get, Extension, Router};
    use tower::ServiceExt;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn app(tokens: TokenService) -> Router {
        async fn whoami(Extension(auth): Extension<AuthContext>) -> String {
            format!("{}:{}:{}", auth.user_id, auth.username, auth.role)
        }

        Router::new()
            .route("/whoami", get(whoami))
            .layer(middleware::from_fn_with_state(tokens, jwt_auth_middleware))
    }

    async fn call(tokens: TokenService, auth: Option<&str>) -> Response {
        let mut builder = HttpRequest::builder().uri("/whoami");
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        app(tokens)
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer("Bearer abc").unwrap(), "abc");
        assert!(extract_bearer("bearer abc").is_err());
        assert!(extract_bearer("Token abc").is_err());
        assert!(extract_bearer("Bearer").is_err());
        assert!(extract_bearer("Bearer ").is_err());
        assert!(extract_bearer("abc").is_err());
    }

    #[test]
    fn test_extract_bearer_splits_on_first_space_only() {
        assert_eq!(extract_bearer("Bearer a b").unwrap(), "a b");
    }

    #[test]
    fn test_auth_error_into_response() {
        let response = AuthError::MissingCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthError::InvalidFormat("test".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_valid_token_binds_context() {
        let tokens = TokenService::new(JwtConfig::new(SECRET));
        let token = tokens.issue_access_token(5, "dave", "user").unwrap();

        let response = call(tokens, Some(&format!("Bearer {}", token))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"5:dave:user");
    }

    #[tokio::test]
    async fn test_rejections_are_401() {
        let tokens = TokenService::new(JwtConfig::new(SECRET));
        let token = tokens.issue_access_token(5, "dave", "user").unwrap();
        let refresh = tokens.issue_refresh_token(5, "dave", "user").unwrap();

        let cases = [
            None,
            Some(token.clone()),
            Some(format!("Token {}", token)),
            Some(format!("Bearer {} extra", token)),
            Some(format!("Bearer {}", refresh)),
            Some("Bearer garbage".to_string()),
        ];

        for case in cases {
            let response = call(tokens.clone(), case.as_deref()).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "case {:?}", case);

            let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(json["code"], 401);
        }
    }
}
