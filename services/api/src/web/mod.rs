pub mod auth;
pub mod catalog;
pub mod middleware;
pub mod rest;
pub mod router;
pub mod state;

// Re-export what the binaries need to build the web server.
pub use middleware::require_auth;
pub use router::build_router;
pub use state::AppState;
