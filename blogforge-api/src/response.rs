/// Success envelope
///
/// Every successful response is `{"code": 200, "msg": ..., "data": ...}`;
/// `data` is omitted when there is nothing to return. Paginated data is a
/// [`Page`](blogforge_shared::services::Page), serialized as
/// `{list, total, page, size}`.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

pub const SUCCESS_CODE: u16 = 200;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub code: u16,
    pub msg: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self::with_msg("success", data)
    }

    pub fn with_msg(msg: impl Into<String>, data: T) -> Self {
        Self {
            code: SUCCESS_CODE,
            msg: msg.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Success without a payload
    pub fn message(msg: impl Into<String>) -> Self {
        Self {
            code: SUCCESS_CODE,
            msg: msg.into(),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shapes() {
        let with_data = serde_json::to_value(ApiResponse::success(vec![1, 2])).unwrap();
        assert_eq!(with_data, serde_json::json!({"code": 200, "msg": "success", "data": [1, 2]}));

        let bare = serde_json::to_value(ApiResponse::message("Deleted")).unwrap();
        assert_eq!(bare, serde_json::json!({"code": 200, "msg": "Deleted"}));
    }
}
