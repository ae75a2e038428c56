//! crates/bookshelf_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific implementations like databases, disks or HTTP APIs.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Book, CatalogEntry, NewBook, NewUser, User, UserCredentials};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// A uniqueness constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- User Management ---

    /// Inserts a user. A duplicate email must fail with `PortError::Conflict`
    /// and must never overwrite the existing row.
    async fn create_user(&self, new_user: NewUser) -> PortResult<User>;

    /// Case-insensitive lookup by email.
    async fn find_user_by_email(&self, email: &str) -> PortResult<Option<UserCredentials>>;

    // --- Book Management ---

    async fn create_book(&self, new_book: NewBook) -> PortResult<Book>;

    /// All books owned by `user_id`, oldest first.
    async fn list_books_by_owner(&self, user_id: Uuid) -> PortResult<Vec<Book>>;

    /// Fails with `PortError::NotFound` both when the book is missing and when
    /// it belongs to someone else.
    async fn get_book_for_owner(&self, book_id: Uuid, user_id: Uuid) -> PortResult<Book>;
}

/// One-way salted password hashing.
pub trait PasswordHashingService: Send + Sync {
    fn hash_password(&self, password: &str) -> PortResult<String>;
    /// Returns `Ok(false)` on mismatch; errors only for a corrupt stored hash.
    fn verify_password(&self, password: &str, password_hash: &str) -> PortResult<bool>;
}

/// Mints and verifies signed, stateless bearer tokens.
pub trait TokenService: Send + Sync {
    fn issue_token(&self, user_id: Uuid) -> PortResult<String>;
    /// Any verification failure is reported as `PortError::Unauthorized`.
    fn verify_token(&self, token: &str) -> PortResult<Uuid>;
}

#[async_trait]
pub trait FileStorageService: Send + Sync {
    /// Writes `data` under `file_name` without overwriting anything and returns
    /// the public relative path the file will be served from.
    async fn store_file(&self, file_name: &str, data: &[u8]) -> PortResult<String>;

    /// Removes a file previously returned by `store_file`.
    async fn remove_file(&self, public_path: &str) -> PortResult<()>;
}

#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Searches the external catalog for free text.
    async fn search(&self, query: &str) -> PortResult<Vec<CatalogEntry>>;
}
