//! Error-to-HTTP response conversion.
//!
//! Route handlers return `Result<T, AppError>`; any [`vt_core::Error`]
//! converts with `?` and renders as
//! `{"error": <message>, "code": <code>, "request_id": <id|null>}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::middleware::request_id::current_request_id;

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct AppError {
    inner: vt_core::Error,
}

impl AppError {
    pub fn new(inner: vt_core::Error) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &vt_core::Error {
        &self.inner
    }
}

impl From<vt_core::Error> for AppError {
    fn from(e: vt_core::Error) -> Self {
        Self::new(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.inner.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self.inner,
                "Server error in API handler"
            );
        } else {
            tracing::debug!(status = %status, error = %self.inner, "request rejected");
        }

        let body = json!({
            "error": self.inner.to_string(),
            "code": self.inner.code(),
            "request_id": current_request_id(),
        });

        (status, axum::Json(body)).into_response()
    }
}
