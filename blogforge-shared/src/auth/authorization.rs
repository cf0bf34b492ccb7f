//! Role-based authorization
//!
//! Roles are flat strings checked by exact membership against a fixed
//! allow-list per route. There is no hierarchy: `admin` does not imply
//! `user`, it only passes gates that list `admin`.
//!
//! # Example
//!
//! ```no_run
//! use axum::{middleware, routing::get, Router};
//! use blogforge_shared::auth::authorization::{role_gate_middleware, ADMIN_ONLY};
//!
//! let admin: Router = Router::new()
//!     .route("/stats", get(|| async { "secret" }))
//!     .route_layer(middleware::from_fn_with_state(ADMIN_ONLY, role_gate_middleware));
//! ```

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::middleware::{gate_rejection, AuthContext};
use crate::models::user::UserRole;

/// Allow-list for administrator routes
pub const ADMIN_ONLY: &[&str] = &[UserRole::Admin.as_str()];

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// No authenticated principal was bound to the request
    #[error("Authentication required")]
    Unauthenticated,

    /// Principal's role is not in the route's allow-list
    #[error("Insufficient permissions")]
    InsufficientRole { actual: String },
}

impl IntoResponse for AuthzError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthzError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AuthzError::InsufficientRole { .. } => StatusCode::FORBIDDEN,
        };
        gate_rejection(status, self.to_string())
    }
}

/// Checks the principal's role against an allow-list
pub fn require_role(auth: &AuthContext, allowed: &[&str]) -> Result<(), AuthzError> {
    if allowed.iter().any(|role| auth.has_role(role)) {
        Ok(())
    } else {
        Err(AuthzError::InsufficientRole {
            actual: auth.role.clone(),
        })
    }
}

/// Role gate middleware
///
/// Must run after the JWT middleware so that an [`AuthContext`] is bound.
/// Rejects with 403 when the bound role is not in `allowed`.
pub async fn role_gate_middleware(
    State(allowed): State<&'static [&'static str]>,
    req: Request,
    next: Next,
) -> Result<Response, AuthzError> {
    let auth = req
        .extensions()
        .get::<AuthContext>()
        .ok_or(AuthzError::Unauthenticated)?;

    if let Err(e) = require_role(auth, allowed) {
        tracing::info!(user_id = auth.user_id, role = %auth.role, "Role gate rejected request");
        return Err(e);
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{JwtConfig, TokenService};
    use crate::auth::middleware::jwt_auth_middleware;
    use axum::{body::Body, http::header, middleware, routing::get, Router};
    use tower::ServiceExt;

    fn ctx(role: &str) -> AuthContext {
        AuthContext {
            user_id: 1,
            username: "eve".to_string(),
            role: role.to_string(),
        }
    }

    #[test]
    fn test_require_role_exact_membership() {
        assert!(require_role(&ctx("admin"), ADMIN_ONLY).is_ok());
        assert!(require_role(&ctx("user"), ADMIN_ONLY).is_err());
        assert!(require_role(&ctx("Admin"), ADMIN_ONLY).is_err());
        assert!(require_role(&ctx("user"), &["user", "admin"]).is_ok());
        assert!(require_role(&ctx("admin"), &[]).is_err());
    }

    #[tokio::test]
    async fn test_role_gate_behind_jwt() {
        let tokens = TokenService::new(JwtConfig::new("test-secret-key-at-least-32-bytes-long"));
        let app = Router::new()
            .route("/admin", get(|| async { "ok" }))
            .route_layer(middleware::from_fn_with_state(ADMIN_ONLY, role_gate_middleware))
            .route_layer(middleware::from_fn_with_state(tokens.clone(), jwt_auth_middleware));

        let send = |token: String| {
            let app = app.clone();
            async move {
                let req = axum::http::Request::builder()
                    .uri("/admin")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap();
                app.oneshot(req).await.unwrap().status()
            }
        };

        let user = tokens.issue_access_token(2, "bob", "user").unwrap();
        let admin = tokens.issue_access_token(1, "root", "admin").unwrap();

        assert_eq!(send(user).await, StatusCode::FORBIDDEN);
        assert_eq!(send(admin).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_role_gate_without_context() {
        let app = Router::new()
            .route("/admin", get(|| async { "ok" }))
            .route_layer(middleware::from_fn_with_state(ADMIN_ONLY, role_gate_middleware));

        let req = axum::http::Request::builder()
            .uri("/admin")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
