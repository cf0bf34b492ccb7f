/// Request extractors that reject into the response envelope
///
/// axum's stock `Json`, `Path` and `Query` rejections answer with a 4xx
/// status line and a plain-text body. These wrappers turn the same
/// failures into [`ApiError::BadRequest`] so malformed input gets the usual
/// `{code: 400, msg}` envelope.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::ApiError;

/// JSON body that has passed `validator` checks
#[derive(Debug)]
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid parameters: {}", e.body_text())))?;

        value.validate()?;
        Ok(Self(value))
    }
}

/// Numeric `:id` path segment
#[derive(Debug, Clone, Copy)]
pub struct IdPath(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::BadRequest("Invalid ID".to_string()))?;

        Ok(Self(id))
    }
}

/// Query string parameters
#[derive(Debug)]
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid parameters: {}", e.body_text())))?;

        Ok(Self(value))
    }
}
