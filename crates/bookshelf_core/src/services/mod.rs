//! Application services. Each operation takes an already-resolved identity plus
//! validated input and returns a `ServiceResult`; transport concerns live in the
//! `api` crate.

pub mod auth;
pub mod catalog;
pub mod library;

#[cfg(test)]
pub(crate) mod fakes;

pub use auth::{bearer_token, AuthService, AuthSession};
pub use catalog::CatalogSearch;
pub use library::{LibraryService, UploadRequest};
