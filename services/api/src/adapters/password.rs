//! services/api/src/adapters/password.rs
//!
//! Argon2 implementation of the `PasswordHashingService` port.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use bookshelf_core::ports::{PasswordHashingService, PortError, PortResult};

/// Hashes with Argon2id (default parameters) and a fresh random salt per password.
#[derive(Default)]
pub struct Argon2PasswordAdapter {
    argon2: Argon2<'static>,
}

impl Argon2PasswordAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PasswordHashingService for Argon2PasswordAdapter {
    fn hash_password(&self, password: &str) -> PortResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PortError::Unexpected(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    fn verify_password(&self, password: &str, password_hash: &str) -> PortResult<bool> {
        let parsed_hash = PasswordHash::new(password_hash)
            .map_err(|e| PortError::Unexpected(format!("Failed to parse password hash: {}", e)))?;

        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_are_salted_and_verifiable() {
        let hasher = Argon2PasswordAdapter::new();

        let first = hasher.hash_password("pw123").unwrap();
        let second = hasher.hash_password("pw123").unwrap();

        assert_ne!(first, second);
        assert!(!first.contains("pw123"));
        assert!(hasher.verify_password("pw123", &first).unwrap());
        assert!(!hasher.verify_password("pw124", &first).unwrap());
    }

    #[test]
    fn corrupt_hash_is_an_error() {
        let hasher = Argon2PasswordAdapter::new();
        assert!(hasher.verify_password("pw123", "not-a-phc-string").is_err());
    }
}
