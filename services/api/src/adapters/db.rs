//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use bookshelf_core::domain::{Book, NewBook, NewUser, User, UserCredentials};
use bookshelf_core::ports::{DatabaseService, PortError, PortResult};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}
impl UserRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user: User {
                id: self.id,
                name: self.name,
                email: self.email,
                created_at: self.created_at,
            },
            password_hash: self.password_hash,
        }
    }
}

#[derive(FromRow)]
struct BookRecord {
    id: Uuid,
    title: String,
    author: String,
    description: Option<String>,
    cover_image: Option<String>,
    file_url: String,
    catalog_id: Option<String>,
    user_id: Uuid,
    is_uploaded: bool,
    created_at: DateTime<Utc>,
}
impl BookRecord {
    fn to_domain(self) -> Book {
        Book {
            id: self.id,
            title: self.title,
            author: self.author,
            description: self.description,
            cover_image: self.cover_image,
            file_url: self.file_url,
            catalog_id: self.catalog_id,
            user_id: self.user_id,
            is_uploaded: self.is_uploaded,
            created_at: self.created_at,
        }
    }
}

const BOOK_COLUMNS: &str =
    "id, title, author, description, cover_image, file_url, catalog_id, user_id, is_uploaded, created_at";

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user(&self, new_user: NewUser) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (id, name, email, password_hash) VALUES ($1, $2, $3, $4) \
             RETURNING id, name, email, password_hash, created_at",
        )
        .bind(new_user.id)
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                PortError::Conflict(format!("Email {} is already registered", new_user.email))
            }
            other => unexpected(other),
        })?;

        Ok(record.to_domain().user)
    }

    async fn find_user_by_email(&self, email: &str) -> PortResult<Option<UserCredentials>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, name, email, password_hash, created_at FROM users WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(record.map(UserRecord::to_domain))
    }

    async fn create_book(&self, new_book: NewBook) -> PortResult<Book> {
        let sql = format!(
            "INSERT INTO books (id, title, author, description, file_url, user_id, is_uploaded) \
             VALUES ($1, $2, $3, $4, $5, $6, TRUE) RETURNING {}",
            BOOK_COLUMNS
        );
        let record = sqlx::query_as::<_, BookRecord>(&sql)
            .bind(new_book.id)
            .bind(&new_book.title)
            .bind(&new_book.author)
            .bind(&new_book.description)
            .bind(&new_book.file_url)
            .bind(new_book.user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                    PortError::NotFound("User".to_string())
                }
                other => unexpected(other),
            })?;

        Ok(record.to_domain())
    }

    async fn list_books_by_owner(&self, user_id: Uuid) -> PortResult<Vec<Book>> {
        let sql = format!(
            "SELECT {} FROM books WHERE user_id = $1 ORDER BY seq ASC",
            BOOK_COLUMNS
        );
        let records = sqlx::query_as::<_, BookRecord>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;

        let books = records.into_iter().map(|r| r.to_domain()).collect();
        Ok(books)
    }

    async fn get_book_for_owner(&self, book_id: Uuid, user_id: Uuid) -> PortResult<Book> {
        let sql = format!(
            "SELECT {} FROM books WHERE id = $1 AND user_id = $2",
            BOOK_COLUMNS
        );
        let record = sqlx::query_as::<_, BookRecord>(&sql)
            .bind(book_id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => PortError::NotFound("Book".to_string()),
                _ => unexpected(e),
            })?;

        Ok(record.to_domain())
    }
}
