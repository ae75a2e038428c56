pub mod catalog;
pub mod db;
pub mod files;
pub mod memory;
pub mod password;
pub mod token;

pub use catalog::GutendexCatalogAdapter;
pub use db::DbAdapter;
pub use files::LocalFileStore;
pub use memory::MemoryDbAdapter;
pub use password::Argon2PasswordAdapter;
pub use token::JwtTokenAdapter;
