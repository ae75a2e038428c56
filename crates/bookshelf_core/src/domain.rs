//! crates/bookshelf_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::ServiceError;

/// The only MIME type the upload path accepts.
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Represents a registered user - safe to hand to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

// Only used internally for login - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

/// A user ready to be persisted. The password has already been hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Validated registration input, before the password is hashed.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Registration {
    pub fn parse(name: &str, email: &str, password: &str) -> Result<Self, ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::Validation("Name is required".to_string()));
        }
        let email = normalize_email(email)?;
        if password.is_empty() {
            return Err(ServiceError::Validation("Password is required".to_string()));
        }

        Ok(Self {
            name: name.to_string(),
            email,
            password: password.to_string(),
        })
    }
}

/// Trims and lower-cases an email, rejecting anything without a local part and a domain.
pub fn normalize_email(email: &str) -> Result<String, ServiceError> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(ServiceError::Validation(format!(
            "'{}' is not a valid email address",
            email
        )));
    }
    Ok(email)
}

/// Represents a PDF book uploaded by a user. Always owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub file_url: String,
    /// Identifier of the catalog entry this book came from, if any.
    pub catalog_id: Option<String>,
    pub user_id: Uuid,
    pub is_uploaded: bool,
    pub created_at: DateTime<Utc>,
}

/// A book record ready to be persisted.
#[derive(Debug, Clone)]
pub struct NewBook {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub file_url: String,
    pub user_id: Uuid,
}

/// Validated book metadata from an upload form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDetails {
    pub title: String,
    pub author: String,
    pub description: Option<String>,
}

impl BookDetails {
    pub fn parse(
        title: Option<&str>,
        author: Option<&str>,
        description: Option<&str>,
    ) -> Result<Self, ServiceError> {
        let title = required_field("title", title)?;
        let author = required_field("author", author)?;
        let description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        Ok(Self {
            title,
            author,
            description,
        })
    }
}

fn required_field(field: &str, value: Option<&str>) -> Result<String, ServiceError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ServiceError::Validation(format!("The '{}' field is required", field)))
}

/// A file part received from a client, not yet written anywhere.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn is_pdf(&self) -> bool {
        is_pdf_mime(&self.content_type)
    }
}

pub fn is_pdf_mime(content_type: &str) -> bool {
    content_type.trim().eq_ignore_ascii_case(PDF_MIME_TYPE)
}

/// A read-only search result from the external book catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub description: String,
    pub thumbnail: String,
    pub read_link: String,
}
