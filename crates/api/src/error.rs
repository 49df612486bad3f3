//! API error types
//!
//! Structured error responses for the HTTP control surface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use sift_store::StoreError;
use sift_viewer::ViewerError;

/// API errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request parameters
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Resource not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Store failure behind the request
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Viewer subsystem failure
    #[error(transparent)]
    Viewer(#[from] ViewerError),
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(err) if err.is_transient() => StatusCode::SERVICE_UNAVAILABLE,
            Self::Store(_) => StatusCode::BAD_GATEWAY,
            Self::Viewer(ViewerError::SessionNotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Viewer(ViewerError::SessionExists { .. }) => StatusCode::CONFLICT,
            Self::Viewer(ViewerError::Store(err)) if err.is_transient() => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::Viewer(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Get the error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Store(_) => "STORE_ERROR",
            Self::Viewer(ViewerError::SessionNotFound { .. }) => "SESSION_NOT_FOUND",
            Self::Viewer(ViewerError::SessionExists { .. }) => "SESSION_EXISTS",
            Self::Viewer(_) => "VIEWER_ERROR",
        }
    }

    /// Create a not found error
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{entity} '{id}' not found"))
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code (machine-readable)
    pub error: &'static str,
    /// Error message (human-readable)
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.code(),
            message: self.to_string(),
        };

        tracing::warn!(
            error_code = body.error,
            error_message = %body.message,
            status = %status,
            "API error"
        );

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::BadRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(StoreError::transient("down")).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(ViewerError::SessionNotFound { id: 1 }).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(ViewerError::SessionExists { id: 1 }).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_codes() {
        assert_eq!(ApiError::not_found("session", 9).code(), "NOT_FOUND");
        assert_eq!(
            ApiError::from(ViewerError::SessionExists { id: 1 }).code(),
            "SESSION_EXISTS"
        );
    }
}
