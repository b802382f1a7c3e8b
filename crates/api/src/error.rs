//! JSON error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use leavebook_core::leave::LeaveError;

/// Lifecycle error rendered as `{"error": CODE, "message": ...}`.
#[derive(Debug)]
pub struct ApiError(pub LeaveError);

impl From<LeaveError> for ApiError {
    fn from(err: LeaveError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = match &self.0 {
            // Storage details stay in the logs.
            LeaveError::Store(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        let mut body = json!({
            "error": self.0.error_code(),
            "message": message,
        });
        if self.0.is_retryable() {
            body["retryable"] = json!(true);
        }
        if let LeaveError::InsufficientBalance {
            requested,
            available,
        } = &self.0
        {
            body["requested_hours"] = json!(requested);
            body["available_hours"] = json!(available);
        }

        (status, Json(body)).into_response()
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;
