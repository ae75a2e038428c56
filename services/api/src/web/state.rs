//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::adapters::{Argon2PasswordAdapter, JwtTokenAdapter};
use crate::config::Config;
use bookshelf_core::ports::{CatalogService, DatabaseService, FileStorageService};
use bookshelf_core::services::{AuthService, CatalogSearch, LibraryService};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth: Arc<AuthService>,
    pub library: Arc<LibraryService>,
    pub catalog: Arc<CatalogSearch>,
}

impl AppState {
    /// Wires the application services around the given storage and catalog adapters.
    /// Password hashing and token signing are built from `config`.
    pub fn new(
        config: Arc<Config>,
        db: Arc<dyn DatabaseService>,
        files: Arc<dyn FileStorageService>,
        catalog: Arc<dyn CatalogService>,
    ) -> Self {
        let tokens = Arc::new(JwtTokenAdapter::new(&config.jwt_secret, config.token_ttl));
        let hasher = Arc::new(Argon2PasswordAdapter::new());

        Self {
            auth: Arc::new(AuthService::new(db.clone(), hasher, tokens)),
            library: Arc::new(LibraryService::new(db, files)),
            catalog: Arc::new(CatalogSearch::new(catalog)),
            config,
        }
    }
}
