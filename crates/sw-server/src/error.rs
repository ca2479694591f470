//! Error-to-HTTP response conversion.
//!
//! Implements `IntoResponse` for [`sw_core::Error`] so that route handlers
//! can return `Result<T, AppError>` and use `?` on core errors.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct AppError(pub sw_core::Error);

impl From<sw_core::Error> for AppError {
    fn from(e: sw_core::Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(status = %status, error = %self.0, "Server error in API handler");
        } else {
            tracing::warn!(status = %status, error = %self.0, "Request failed");
        }

        let body = json!({
            "success": false,
            "error": self.0.to_string(),
            "code": self.0.code(),
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Result alias for route handlers.
pub type ApiResult<T> = std::result::Result<T, AppError>;
