//! services/api/src/adapters/memory.rs
//!
//! An in-process implementation of the `DatabaseService` port. Used when no
//! `DATABASE_URL` is configured and by the HTTP tests. Nothing survives a restart.

use async_trait::async_trait;
use bookshelf_core::domain::{Book, NewBook, NewUser, User, UserCredentials};
use bookshelf_core::ports::{DatabaseService, PortError, PortResult};
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct MemoryState {
    users: Vec<UserCredentials>,
    books: Vec<Book>,
}

#[derive(Default)]
pub struct MemoryDbAdapter {
    state: RwLock<MemoryState>,
}

impl MemoryDbAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DatabaseService for MemoryDbAdapter {
    async fn create_user(&self, new_user: NewUser) -> PortResult<User> {
        // Check and insert under one write lock so racing registrations cannot both win.
        let mut state = self.state.write().await;
        if state
            .users
            .iter()
            .any(|c| c.user.email.eq_ignore_ascii_case(&new_user.email))
        {
            return Err(PortError::Conflict(format!(
                "Email {} is already registered",
                new_user.email
            )));
        }

        let user = User {
            id: new_user.id,
            name: new_user.name,
            email: new_user.email,
            created_at: Utc::now(),
        };
        state.users.push(UserCredentials {
            user: user.clone(),
            password_hash: new_user.password_hash,
        });
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> PortResult<Option<UserCredentials>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .find(|c| c.user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create_book(&self, new_book: NewBook) -> PortResult<Book> {
        let mut state = self.state.write().await;
        if !state.users.iter().any(|c| c.user.id == new_book.user_id) {
            return Err(PortError::NotFound("User".to_string()));
        }

        let book = Book {
            id: new_book.id,
            title: new_book.title,
            author: new_book.author,
            description: new_book.description,
            cover_image: None,
            file_url: new_book.file_url,
            catalog_id: None,
            user_id: new_book.user_id,
            is_uploaded: true,
            created_at: Utc::now(),
        };
        state.books.push(book.clone());
        Ok(book)
    }

    async fn list_books_by_owner(&self, user_id: Uuid) -> PortResult<Vec<Book>> {
        let state = self.state.read().await;
        Ok(state
            .books
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_book_for_owner(&self, book_id: Uuid, user_id: Uuid) -> PortResult<Book> {
        let state = self.state.read().await;
        state
            .books
            .iter()
            .find(|b| b.id == book_id && b.user_id == user_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound("Book".to_string()))
    }
}
