//! In-process stand-ins for the ports, used by the service tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::{Book, CatalogEntry, NewBook, NewUser, User, UserCredentials};
use crate::ports::{
    CatalogService, DatabaseService, FileStorageService, PasswordHashingService, PortError,
    PortResult, TokenService,
};

#[derive(Default)]
pub struct MemoryDb {
    users: Mutex<Vec<UserCredentials>>,
    books: Mutex<Vec<Book>>,
    fail_book_inserts: AtomicBool,
    reject_unknown_owners: AtomicBool,
}

impl MemoryDb {
    pub fn fail_book_inserts(&self) {
        self.fail_book_inserts.store(true, Ordering::SeqCst);
    }

    pub fn reject_unknown_owners(&self) {
        self.reject_unknown_owners.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl DatabaseService for MemoryDb {
    async fn create_user(&self, new_user: NewUser) -> PortResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|c| c.user.email == new_user.email) {
            return Err(PortError::Conflict(new_user.email));
        }
        let user = User {
            id: new_user.id,
            name: new_user.name,
            email: new_user.email,
            created_at: Utc::now(),
        };
        users.push(UserCredentials {
            user: user.clone(),
            password_hash: new_user.password_hash,
        });
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> PortResult<Option<UserCredentials>> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|c| c.user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create_book(&self, new_book: NewBook) -> PortResult<Book> {
        if self.fail_book_inserts.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("insert failed".to_string()));
        }
        if self.reject_unknown_owners.load(Ordering::SeqCst) {
            let users = self.users.lock().unwrap();
            if !users.iter().any(|c| c.user.id == new_book.user_id) {
                return Err(PortError::NotFound("User".to_string()));
            }
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
        self.books.lock().unwrap().push(book.clone());
        Ok(book)
    }

    async fn list_books_by_owner(&self, user_id: Uuid) -> PortResult<Vec<Book>> {
        let books = self.books.lock().unwrap();
        Ok(books.iter().filter(|b| b.user_id == user_id).cloned().collect())
    }

    async fn get_book_for_owner(&self, book_id: Uuid, user_id: Uuid) -> PortResult<Book> {
        let books = self.books.lock().unwrap();
        books
            .iter()
            .find(|b| b.id == book_id && b.user_id == user_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound("Book".to_string()))
    }
}

pub struct FakeHasher;

impl PasswordHashingService for FakeHasher {
    fn hash_password(&self, password: &str) -> PortResult<String> {
        Ok(format!("hashed:{}", password.chars().rev().collect::<String>()))
    }

    fn verify_password(&self, password: &str, password_hash: &str) -> PortResult<bool> {
        Ok(self.hash_password(password)? == password_hash)
    }
}

pub struct FakeTokens;

impl TokenService for FakeTokens {
    fn issue_token(&self, user_id: Uuid) -> PortResult<String> {
        Ok(format!("token.{}", user_id))
    }

    fn verify_token(&self, token: &str) -> PortResult<Uuid> {
        token
            .strip_prefix("token.")
            .and_then(|id| Uuid::parse_str(id).ok())
            .ok_or(PortError::Unauthorized)
    }
}

#[derive(Default)]
pub struct MemoryFiles {
    paths: Mutex<Vec<String>>,
    fail_writes: AtomicBool,
}

impl MemoryFiles {
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn stored_paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}

#[async_trait]
impl FileStorageService for MemoryFiles {
    async fn store_file(&self, file_name: &str, _data: &[u8]) -> PortResult<String> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("disk full".to_string()));
        }
        let path = format!("uploads/{}", file_name);
        self.paths.lock().unwrap().push(path.clone());
        Ok(path)
    }

    async fn remove_file(&self, public_path: &str) -> PortResult<()> {
        self.paths.lock().unwrap().retain(|p| p != public_path);
        Ok(())
    }
}

pub struct StubCatalog {
    entries: Option<Vec<CatalogEntry>>,
    calls: AtomicUsize,
    last_query: Mutex<Option<String>>,
}

impl StubCatalog {
    pub fn with_entries(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries: Some(entries),
            calls: AtomicUsize::new(0),
            last_query: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            entries: None,
            calls: AtomicUsize::new(0),
            last_query: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<String> {
        self.last_query.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogService for StubCatalog {
    async fn search(&self, query: &str) -> PortResult<Vec<CatalogEntry>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some(query.to_string());
        self.entries
            .clone()
            .ok_or_else(|| PortError::Unexpected("upstream unavailable".to_string()))
    }
}
