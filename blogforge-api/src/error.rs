/// Error handling for the API server
///
/// Every handler returns `Result<T, ApiError>`. Errors render into the
/// response envelope with HTTP status 200 and the failure class in the
/// body's `code` field:
///
/// | Variant           | code |
/// |-------------------|------|
/// | `BadRequest`      | 400  |
/// | `ValidationError` | 400  |
/// | `Unauthorized`    | 401  |
/// | `Forbidden`       | 403  |
/// | `NotFound`        | 404  |
/// | `Conflict`        | 500  |
/// | `InternalError`   | 500  |
///
/// Only the auth and role gates answer with a real 401/403 status line.
///
/// # Example
///
/// ```
/// use blogforge_api::error::{ApiError, ApiResult};
///
/// fn parse_page(raw: &str) -> ApiResult<i64> {
///     raw.parse()
///         .map_err(|_| ApiError::BadRequest("page must be a number".to_string()))
/// }
/// # assert!(parse_page("x").is_err());
/// ```

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use blogforge_shared::{auth::jwt::JwtError, services::ServiceError, upload::UploadError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),

    Unauthorized(String),

    Forbidden(String),

    NotFound(String),

    /// Duplicate names and entities still in use
    Conflict(String),

    /// Field-level validation failures
    ValidationError(Vec<ValidationErrorDetail>),

    /// Details are logged, never sent
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error body: the envelope without a success payload
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: u16,

    pub msg: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<ValidationErrorDetail>>,
}

impl ApiError {
    /// In-body response code
    pub fn code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) | ApiError::ValidationError(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) | ApiError::InternalError(_) => 500,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.code();

        let (msg, data) = match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg) => (msg, None),
            ApiError::ValidationError(errors) => {
                let msg = match errors.first() {
                    Some(first) => format!("Invalid parameters: {}", first.message),
                    None => "Invalid parameters".to_string(),
                };
                (msg, Some(errors))
            }
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                ("An internal error occurred".to_string(), None)
            }
        };

        Json(ErrorResponse { code, msg, data }).into_response()
    }
}

/// Convert service errors to API errors
impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidCredentials | ServiceError::AccountDisabled => {
                ApiError::Unauthorized(err.to_string())
            }
            ServiceError::WrongPassword | ServiceError::InvalidInput(_) => {
                ApiError::BadRequest(err.to_string())
            }
            ServiceError::NotFound(_) => ApiError::NotFound(err.to_string()),
            ServiceError::Forbidden(_) => ApiError::Forbidden(err.to_string()),
            ServiceError::DuplicateUsername
            | ServiceError::DuplicateEmail
            | ServiceError::DuplicateName(_)
            | ServiceError::InUse => ApiError::Conflict(err.to_string()),
            ServiceError::Token(e) => e.into(),
            ServiceError::Password(e) => {
                ApiError::InternalError(format!("Password operation failed: {}", e))
            }
            ServiceError::Store(e) => ApiError::InternalError(e.to_string()),
        }
    }
}

/// Convert JWT errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::MissingSecret | JwtError::CreateError(_) => {
                ApiError::InternalError(err.to_string())
            }
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            _ => ApiError::Unauthorized("Invalid token".to_string()),
        }
    }
}

/// Convert upload errors to API errors
impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Io(e) => ApiError::InternalError(format!("Upload write failed: {}", e)),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

/// Convert validator errors to API errors
impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut errors: Vec<ValidationErrorDetail> = err
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field)),
                })
            })
            .collect();
        errors.sort_by(|a, b| a.field.cmp(&b.field));

        ApiError::ValidationError(errors)
    }
}
