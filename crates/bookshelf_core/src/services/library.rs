//! crates/bookshelf_core/src/services/library.rs
//!
//! The per-user bookshelf: PDF ingestion plus owner-scoped reads.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{Book, BookDetails, NewBook, UploadedFile};
use crate::error::{ServiceError, ServiceResult};
use crate::ports::{DatabaseService, FileStorageService, PortError};

const FALLBACK_FILE_NAME: &str = "book.pdf";

/// Raw upload form contents, as received from the client.
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub file: Option<UploadedFile>,
}

pub struct LibraryService {
    db: Arc<dyn DatabaseService>,
    files: Arc<dyn FileStorageService>,
}

impl LibraryService {
    pub fn new(db: Arc<dyn DatabaseService>, files: Arc<dyn FileStorageService>) -> Self {
        Self { db, files }
    }

    /// Stores an uploaded PDF and records it as a book owned by `user_id`.
    ///
    /// The file is written before the record is created. If the record cannot be
    /// created the file is removed again, so a failure never leaves a book
    /// pointing at nothing.
    pub async fn upload(&self, user_id: Uuid, request: UploadRequest) -> ServiceResult<Book> {
        let file = request
            .file
            .ok_or_else(|| ServiceError::Validation("A PDF file is required".to_string()))?;
        if !file.is_pdf() {
            return Err(ServiceError::InvalidFileType);
        }

        let details = BookDetails::parse(
            request.title.as_deref(),
            request.author.as_deref(),
            request.description.as_deref(),
        )?;

        let stored_name = stored_file_name(&file.file_name, Utc::now());
        let file_url = self
            .files
            .store_file(&stored_name, &file.data)
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let new_book = NewBook {
            id: Uuid::new_v4(),
            title: details.title,
            author: details.author,
            description: details.description,
            file_url: file_url.clone(),
            user_id,
        };

        match self.db.create_book(new_book).await {
            Ok(book) => {
                info!(
                    "User {} uploaded book {} ({} bytes)",
                    user_id,
                    book.id,
                    file.data.len()
                );
                Ok(book)
            }
            Err(e) => {
                if let Err(cleanup) = self.files.remove_file(&file_url).await {
                    error!("Failed to remove orphaned upload {}: {:?}", file_url, cleanup);
                }
                match e {
                    // The token is validly signed but names an account the store
                    // does not have, e.g. after the in-memory store restarted.
                    PortError::NotFound(_) => {
                        warn!("Upload rejected: user {} no longer exists", user_id);
                        Err(ServiceError::Unauthenticated)
                    }
                    other => Err(other.into()),
                }
            }
        }
    }

    pub async fn list_books(&self, user_id: Uuid) -> ServiceResult<Vec<Book>> {
        Ok(self.db.list_books_by_owner(user_id).await?)
    }

    /// A book owned by someone else is reported exactly like a missing one.
    pub async fn get_book(&self, user_id: Uuid, book_id: Uuid) -> ServiceResult<Book> {
        Ok(self.db.get_book_for_owner(book_id, user_id).await?)
    }
}

/// Builds a collision-resistant on-disk name: a millisecond timestamp, a random
/// component and the sanitized original file name.
pub fn stored_file_name(original: &str, now: DateTime<Utc>) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}-{}",
        now.timestamp_millis(),
        &random[..8],
        sanitize_file_name(original)
    )
}

/// Keeps only the basename and replaces anything outside `[A-Za-z0-9._-]`.
pub fn sanitize_file_name(original: &str) -> String {
    let base = original
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        FALLBACK_FILE_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PDF_MIME_TYPE;
    use crate::services::fakes::{MemoryDb, MemoryFiles};
    use bytes::Bytes;

    fn pdf(name: &str) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            content_type: PDF_MIME_TYPE.to_string(),
            data: Bytes::from_static(b"%PDF-1.4 test"),
        }
    }

    fn request(file: UploadedFile) -> UploadRequest {
        UploadRequest {
            title: Some("Foo".to_string()),
            author: Some("Bar".to_string()),
            description: None,
            file: Some(file),
        }
    }

    fn service() -> (LibraryService, Arc<MemoryDb>, Arc<MemoryFiles>) {
        let db = Arc::new(MemoryDb::default());
        let files = Arc::new(MemoryFiles::default());
        (LibraryService::new(db.clone(), files.clone()), db, files)
    }

    #[tokio::test]
    async fn upload_creates_owned_book() {
        let (library, _, files) = service();
        let owner = Uuid::new_v4();

        let book = library.upload(owner, request(pdf("foo.pdf"))).await.unwrap();

        assert_eq!(book.title, "Foo");
        assert_eq!(book.author, "Bar");
        assert_eq!(book.user_id, owner);
        assert!(book.is_uploaded);
        assert!(book.file_url.starts_with("uploads/"));
        assert!(book.file_url.ends_with("-foo.pdf"));
        assert_eq!(files.stored_paths(), vec![book.file_url.clone()]);
    }

    #[tokio::test]
    async fn non_pdf_upload_is_rejected_without_side_effects() {
        let (library, _, files) = service();
        let owner = Uuid::new_v4();
        let mut file = pdf("notes.txt");
        file.content_type = "text/plain".to_string();

        let before = library.list_books(owner).await.unwrap().len();
        let err = library.upload(owner, request(file)).await.unwrap_err();
        let after = library.list_books(owner).await.unwrap().len();

        assert!(matches!(err, ServiceError::InvalidFileType));
        assert_eq!(before, after);
        assert!(files.stored_paths().is_empty());
    }

    #[tokio::test]
    async fn missing_fields_are_validation_errors() {
        let (library, _, files) = service();
        let owner = Uuid::new_v4();

        let mut no_title = request(pdf("a.pdf"));
        no_title.title = None;
        let no_file = UploadRequest {
            file: None,
            ..request(pdf("a.pdf"))
        };

        assert!(matches!(
            library.upload(owner, no_title).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            library.upload(owner, no_file).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(files.stored_paths().is_empty());
    }

    #[tokio::test]
    async fn storage_failure_creates_no_record() {
        let (library, _, files) = service();
        let owner = Uuid::new_v4();
        files.fail_writes();

        let err = library.upload(owner, request(pdf("a.pdf"))).await.unwrap_err();

        assert!(matches!(err, ServiceError::Storage(_)));
        assert!(library.list_books(owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_insert_removes_the_stored_file() {
        let (library, db, files) = service();
        db.fail_book_inserts();

        let err = library
            .upload(Uuid::new_v4(), request(pdf("a.pdf")))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Internal(_)));
        assert!(files.stored_paths().is_empty());
    }

    #[tokio::test]
    async fn upload_for_unknown_owner_is_unauthenticated() {
        let (library, db, files) = service();
        db.reject_unknown_owners();

        let err = library
            .upload(Uuid::new_v4(), request(pdf("a.pdf")))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Unauthenticated));
        assert!(files.stored_paths().is_empty());
    }

    #[tokio::test]
    async fn books_are_scoped_to_their_owner() {
        let (library, _, _) = service();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let first = library.upload(alice, request(pdf("one.pdf"))).await.unwrap();
        let second = library.upload(alice, request(pdf("two.pdf"))).await.unwrap();

        let listed = library.list_books(alice).await.unwrap();
        assert_eq!(listed, vec![first.clone(), second]);
        assert!(library.list_books(bob).await.unwrap().is_empty());

        assert_eq!(library.get_book(alice, first.id).await.unwrap(), first);
        assert!(matches!(
            library.get_book(bob, first.id).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            library.get_book(alice, Uuid::new_v4()).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn stored_names_differ_for_identical_uploads() {
        let now = Utc::now();
        let a = stored_file_name("book.pdf", now);
        let b = stored_file_name("book.pdf", now);

        assert_ne!(a, b);
        assert!(a.starts_with(&format!("{}-", now.timestamp_millis())));
    }

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\books\\My Book.pdf"), "My_Book.pdf");
        assert_eq!(sanitize_file_name("..."), FALLBACK_FILE_NAME);
        assert_eq!(sanitize_file_name(""), FALLBACK_FILE_NAME);
    }
}
