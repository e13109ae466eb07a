//! Gateway error types and JSON error responses

use super::json::ErrorBody;
use crate::storage::StorageError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::{error, warn};

/// Errors surfaced by the gateway routes.
///
/// Client-input failures map to 400. Every backend failure collapses to 500
/// with the route's fixed message; the backend detail only reaches the log.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No file uploaded")]
    NoFileUploaded,

    #[error("File too large")]
    FileTooLarge { max: u64 },

    #[error("Malformed multipart request")]
    MalformedUpload(String),

    #[error("{message}")]
    Backend {
        message: &'static str,
        #[source]
        source: StorageError,
    },
}

impl ApiError {
    /// Wrap a backend failure with the route's fixed client-facing message
    pub fn backend(message: &'static str) -> impl FnOnce(StorageError) -> ApiError {
        move |source| ApiError::Backend { message, source }
    }

    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NoFileUploaded => StatusCode::BAD_REQUEST,
            ApiError::FileTooLarge { .. } => StatusCode::BAD_REQUEST,
            ApiError::MalformedUpload(_) => StatusCode::BAD_REQUEST,
            ApiError::Backend { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Backend { message, source } => error!("{}: {}", message, source),
            ApiError::FileTooLarge { max } => warn!("Upload rejected: file exceeds {} bytes", max),
            ApiError::MalformedUpload(detail) => warn!("Upload rejected: {}", detail),
            ApiError::NoFileUploaded => warn!("Upload rejected: no file field"),
        }

        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
