//! crates/bookshelf_core/src/error.rs
//!
//! The business-level error taxonomy returned by the application services.

use crate::ports::PortError;

/// Every failure a service operation can report to its caller.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// A required field is missing or malformed.
    #[error("{0}")]
    Validation(String),

    #[error("An account with this email already exists")]
    DuplicateEmail,

    /// Unknown email or wrong password. Deliberately the same message for both.
    #[error("Invalid login credentials")]
    InvalidCredentials,

    #[error("Please authenticate.")]
    Unauthenticated,

    /// The resource does not exist or is not owned by the requester.
    #[error("{0} not found")]
    NotFound(String),

    #[error("Only PDF files are allowed")]
    InvalidFileType,

    #[error("Malformed upload: {0}")]
    MalformedUpload(String),

    #[error("Upload exceeds the maximum allowed size")]
    PayloadTooLarge,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// A convenience type alias for `Result<T, ServiceError>`.
pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<PortError> for ServiceError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound(what) => ServiceError::NotFound(what),
            PortError::Conflict(what) => ServiceError::Validation(what),
            PortError::Unauthorized => ServiceError::Unauthenticated,
            PortError::Unexpected(msg) => ServiceError::Internal(msg),
        }
    }
}
