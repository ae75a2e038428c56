pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use domain::{Book, CatalogEntry, NewBook, NewUser, UploadedFile, User, UserCredentials};
pub use error::{ServiceError, ServiceResult};
pub use ports::{
    CatalogService, DatabaseService, FileStorageService, PasswordHashingService, PortError,
    PortResult, TokenService,
};
