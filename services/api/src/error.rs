//! services/api/src/error.rs
//!
//! Defines the startup error type for the API service and the translation of
//! service errors into HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bookshelf_core::error::ServiceError;
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

use crate::config::ConfigError;

/// The primary error type for starting the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// The JSON body of every error response.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// A `ServiceError` on its way out of a handler.
#[derive(Debug)]
pub struct HttpError(pub ServiceError);

impl HttpError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            ServiceError::Validation(_)
            | ServiceError::DuplicateEmail
            | ServiceError::InvalidCredentials
            | ServiceError::InvalidFileType
            | ServiceError::MalformedUpload(_) => StatusCode::BAD_REQUEST,
            ServiceError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ServiceError::Storage(_) | ServiceError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<ServiceError> for HttpError {
    fn from(err: ServiceError) -> Self {
        Self(err)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Infrastructure details stay in the logs.
        let message = if status.is_server_error() {
            error!("Request failed: {:?}", self.0);
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
