//! API response envelope.
//!
//! Every endpoint wraps its payload in the same success/failure shape so
//! clients can branch on `success` and inspect `error.code` without
//! caring which operation produced the response.

use crate::error::GatewayError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Standard response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,

    pub timestamp: DateTime<Utc>,
}

/// Error details carried on failure responses.
#[derive(Debug, Serialize)]
pub struct ApiError {
    /// Machine-readable code, e.g. `QUERY_REJECTED`.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    /// Successful response carrying data.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }
}

impl ApiResponse<()> {
    /// Failure response carrying an error code and message.
    pub fn err(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
            }),
            timestamp: Utc::now(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::UnknownServer(_) => StatusCode::NOT_FOUND,
            GatewayError::QueryRejected(_) | GatewayError::MissingParameter(_) => {
                StatusCode::BAD_REQUEST
            }
            GatewayError::BackendUnavailable { .. } => StatusCode::BAD_GATEWAY,
            GatewayError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(ApiResponse::err(self.code(), self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_envelope_shape() {
        let json = serde_json::to_value(ApiResponse::ok(vec!["a", "b"])).unwrap();
        assert_eq!(json["success"], serde_json::json!(true));
        assert_eq!(json["data"], serde_json::json!(["a", "b"]));
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_err_envelope_shape() {
        let json =
            serde_json::to_value(ApiResponse::err("QUERY_REJECTED", "not a select")).unwrap();
        assert_eq!(json["success"], serde_json::json!(false));
        assert_eq!(json["error"]["code"], serde_json::json!("QUERY_REJECTED"));
        assert!(json.get("data").is_none());
    }
}
