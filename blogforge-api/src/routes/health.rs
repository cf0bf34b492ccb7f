/// Health check endpoint
///
/// Verifies that the server is running and that the database and Redis
/// answer.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "code": 200,
///   "msg": "success",
///   "data": {
///     "status": "healthy",
///     "version": "0.1.0",
///     "database": "connected",
///     "redis": "connected"
///   }
/// }
/// ```

use crate::{app::AppState, error::ApiResult, response::ApiResponse};
use axum::extract::State;
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `healthy` or `degraded`
    pub status: String,

    pub version: String,

    pub database: String,

    /// `disabled` when the server runs without Redis
    pub redis: String,
}

pub async fn health_check(State(state): State<AppState>) -> ApiResult<ApiResponse<HealthResponse>> {
    let database = match state.store.ping().await {
        Ok(()) => "connected",
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            "disconnected"
        }
    };

    let redis = match &state.redis {
        Some(client) if client.is_healthy().await => "connected",
        Some(_) => "disconnected",
        None => "disabled",
    };

    let healthy = database == "connected" && redis != "disconnected";

    Ok(ApiResponse::success(HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
        redis: redis.to_string(),
    }))
}
