//! crates/bookshelf_core/src/services/auth.rs
//!
//! Session issuing (register, login) and stateless session verification.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{normalize_email, NewUser, Registration, User};
use crate::error::{ServiceError, ServiceResult};
use crate::ports::{DatabaseService, PasswordHashingService, PortError, TokenService};

/// A user together with a freshly minted bearer token.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
}

pub struct AuthService {
    db: Arc<dyn DatabaseService>,
    hasher: Arc<dyn PasswordHashingService>,
    tokens: Arc<dyn TokenService>,
}

impl AuthService {
    pub fn new(
        db: Arc<dyn DatabaseService>,
        hasher: Arc<dyn PasswordHashingService>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self { db, hasher, tokens }
    }

    /// Creates the account and logs it in.
    ///
    /// Duplicate emails are detected by the store's uniqueness constraint, so two
    /// racing registrations can never both succeed.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> ServiceResult<AuthSession> {
        let registration = Registration::parse(name, email, password)?;

        let password_hash = self
            .hasher
            .hash_password(&registration.password)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        let new_user = NewUser {
            id: Uuid::new_v4(),
            name: registration.name,
            email: registration.email,
            password_hash,
        };

        let user = self.db.create_user(new_user).await.map_err(|e| match e {
            PortError::Conflict(_) => ServiceError::DuplicateEmail,
            other => ServiceError::from(other),
        })?;

        let token = self.issue(user.id)?;
        info!("Registered user {}", user.id);
        Ok(AuthSession { user, token })
    }

    /// Unknown email and wrong password both yield `InvalidCredentials`.
    pub async fn login(&self, email: &str, password: &str) -> ServiceResult<AuthSession> {
        let email = normalize_email(email).map_err(|_| ServiceError::InvalidCredentials)?;

        let Some(credentials) = self.db.find_user_by_email(&email).await? else {
            warn!("Login attempt for unknown account");
            return Err(ServiceError::InvalidCredentials);
        };

        let valid = self
            .hasher
            .verify_password(password, &credentials.password_hash)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        if !valid {
            warn!("Wrong password for user {}", credentials.user.id);
            return Err(ServiceError::InvalidCredentials);
        }

        let token = self.issue(credentials.user.id)?;
        info!("User {} logged in", credentials.user.id);
        Ok(AuthSession {
            user: credentials.user,
            token,
        })
    }

    /// Resolves an `Authorization` header value to the user id it was issued for.
    ///
    /// Purely a function of the header and the signing secret; no stored session
    /// state is consulted.
    pub fn authenticate(&self, authorization: Option<&str>) -> ServiceResult<Uuid> {
        let token = authorization
            .and_then(bearer_token)
            .ok_or(ServiceError::Unauthenticated)?;

        self.tokens
            .verify_token(token)
            .map_err(|_| ServiceError::Unauthenticated)
    }

    fn issue(&self, user_id: Uuid) -> ServiceResult<String> {
        self.tokens
            .issue_token(user_id)
            .map_err(|e| ServiceError::Internal(e.to_string()))
    }
}

/// Extracts the token from a `Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
