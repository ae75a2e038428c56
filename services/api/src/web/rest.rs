//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the book endpoints and the master
//! definition for the OpenAPI specification.

use crate::error::{ErrorBody, HttpError};
use crate::web::auth::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};
use crate::web::catalog::CatalogEntryResponse;
use crate::web::state::AppState;
use axum::{
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        Multipart, Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use bookshelf_core::domain::{is_pdf_mime, Book, UploadedFile};
use bookshelf_core::error::ServiceError;
use bookshelf_core::services::UploadRequest;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::auth::register_handler,
        crate::web::auth::login_handler,
        upload_book_handler,
        list_books_handler,
        get_book_handler,
        crate::web::catalog::search_catalog_handler,
        crate::web::catalog::featured_catalog_handler,
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            UserResponse,
            AuthResponse,
            BookResponse,
            CatalogEntryResponse,
            ErrorBody
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Bookshelf API", description = "Accounts, personal PDF uploads and public catalog search.")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl utoipa::Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

//=========================================================================================
// API Response Structs
//=========================================================================================

/// A book as returned to its owner.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookResponse {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    /// Relative path under the static `uploads/` route.
    pub file_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_book_id: Option<String>,
    pub user_id: Uuid,
    pub is_uploaded: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            author: book.author,
            description: book.description,
            cover_image: book.cover_image,
            file_url: book.file_url,
            google_book_id: book.catalog_id,
            user_id: book.user_id,
            is_uploaded: book.is_uploaded,
            created_at: book.created_at,
        }
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Upload a PDF book.
///
/// Accepts a multipart/form-data request with a `file` part (must be
/// `application/pdf`) and `title`, `author` and optional `description` text parts.
#[utoipa::path(
    post,
    path = "/api/books/upload",
    request_body(content_type = "multipart/form-data", description = "The PDF and its metadata."),
    responses(
        (status = 201, description = "Book uploaded", body = BookResponse),
        (status = 400, description = "Not a PDF, missing field or malformed form", body = ErrorBody),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorBody),
        (status = 413, description = "Upload too large", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
pub async fn upload_book_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let mut multipart =
        multipart.map_err(|e| ServiceError::MalformedUpload(e.body_text()))?;

    let mut request = UploadRequest::default();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => request.file = Some(read_pdf_field(user_id, field).await?),
            "title" => request.title = Some(field.text().await.map_err(multipart_error)?),
            "author" => request.author = Some(field.text().await.map_err(multipart_error)?),
            "description" => {
                request.description = Some(field.text().await.map_err(multipart_error)?)
            }
            _ => {}
        }
    }

    let book = app_state.library.upload(user_id, request).await?;
    Ok((StatusCode::CREATED, Json(BookResponse::from(book))))
}

/// Rejects non-PDF parts from their declared type, before reading any bytes.
async fn read_pdf_field(user_id: Uuid, field: Field<'_>) -> Result<UploadedFile, HttpError> {
    let content_type = field.content_type().unwrap_or_default().to_string();
    if !is_pdf_mime(&content_type) {
        warn!(
            "User {} tried to upload a file of type {:?}",
            user_id, content_type
        );
        return Err(ServiceError::InvalidFileType.into());
    }

    let file_name = field.file_name().unwrap_or_default().to_string();
    let data = field.bytes().await.map_err(multipart_error)?;

    Ok(UploadedFile {
        file_name,
        content_type,
        data,
    })
}

fn multipart_error(e: MultipartError) -> HttpError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServiceError::PayloadTooLarge.into()
    } else {
        ServiceError::MalformedUpload(e.body_text()).into()
    }
}

/// List the caller's books, oldest first.
#[utoipa::path(
    get,
    path = "/api/books",
    responses(
        (status = 200, description = "The caller's books", body = [BookResponse]),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
pub async fn list_books_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let books = app_state.library.list_books(user_id).await?;
    let response: Vec<BookResponse> = books.into_iter().map(BookResponse::from).collect();
    Ok(Json(response))
}

/// Fetch one of the caller's books. Books owned by others are reported as missing.
#[utoipa::path(
    get,
    path = "/api/books/{id}",
    params(
        ("id" = String, Path, description = "The book id.")
    ),
    responses(
        (status = 200, description = "The book", body = BookResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorBody),
        (status = 404, description = "No such book for this user", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
pub async fn get_book_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(book_id): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    // An id that is not a UUID cannot name anybody's book.
    let book_id =
        Uuid::parse_str(&book_id).map_err(|_| ServiceError::NotFound("Book".to_string()))?;

    let book = app_state.library.get_book(user_id, book_id).await?;
    Ok(Json(BookResponse::from(book)))
}
