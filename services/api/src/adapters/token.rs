//! services/api/src/adapters/token.rs
//!
//! HS256 JWT implementation of the `TokenService` port.
//!
//! Tokens carry the user id as `sub` and the issue time as `iat`. An `exp` claim
//! is only added (and then required) when a token lifetime is configured.

use std::time::Duration;

use bookshelf_core::ports::{PortError, PortResult, TokenService};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exp: Option<i64>,
}

pub struct JwtTokenAdapter {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Option<Duration>,
}

impl JwtTokenAdapter {
    pub fn new(secret: &str, ttl: Option<Duration>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = ttl.is_some();
        if ttl.is_some() {
            validation.set_required_spec_claims(&["sub", "exp"]);
        } else {
            validation.set_required_spec_claims(&["sub"]);
        }
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }
}

impl TokenService for JwtTokenAdapter {
    fn issue_token(&self, user_id: Uuid) -> PortResult<String> {
        let now = Utc::now().timestamp();
        let exp = match self.ttl {
            Some(ttl) => Some(
                i64::try_from(ttl.as_secs())
                    .ok()
                    .and_then(|secs| now.checked_add(secs))
                    .ok_or_else(|| {
                        PortError::Unexpected("Token lifetime is out of range".to_string())
                    })?,
            ),
            None => None,
        };
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now,
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| PortError::Unexpected(format!("Failed to sign token: {}", e)))
    }

    fn verify_token(&self, token: &str) -> PortResult<Uuid> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            debug!("Rejected bearer token: {}", e);
            PortError::Unauthorized
        })?;

        Uuid::parse_str(&data.claims.sub).map_err(|_| PortError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_resolves_to_its_subject() {
        let tokens = JwtTokenAdapter::new("secret", None);
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let token = tokens.issue_token(alice).unwrap();

        assert_eq!(tokens.verify_token(&token).unwrap(), alice);
        assert_ne!(tokens.verify_token(&token).unwrap(), bob);
    }

    #[test]
    fn any_altered_byte_is_rejected() {
        let tokens = JwtTokenAdapter::new("secret", None);
        let token = tokens.issue_token(Uuid::new_v4()).unwrap();

        for i in 0..token.len() {
            let mut bytes = token.clone().into_bytes();
            bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(bytes).unwrap();
            if tampered == token {
                continue;
            }
            assert!(
                tokens.verify_token(&tampered).is_err(),
                "tampering at byte {} was accepted",
                i
            );
        }
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let ours = JwtTokenAdapter::new("secret", None);
        let theirs = JwtTokenAdapter::new("other-secret", None);

        let forged = theirs.issue_token(Uuid::new_v4()).unwrap();

        assert!(matches!(ours.verify_token(&forged), Err(PortError::Unauthorized)));
    }

    #[test]
    fn non_uuid_subject_is_rejected() {
        let tokens = JwtTokenAdapter::new("secret", None);
        let claims = Claims {
            sub: "not-a-user".to_string(),
            iat: Utc::now().timestamp(),
            exp: None,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();

        assert!(tokens.verify_token(&token).is_err());
    }

    #[test]
    fn out_of_range_lifetime_fails_instead_of_wrapping() {
        let tokens = JwtTokenAdapter::new("secret", Some(Duration::from_secs(u64::MAX)));

        assert!(matches!(
            tokens.issue_token(Uuid::new_v4()),
            Err(PortError::Unexpected(_))
        ));
    }

    #[test]
    fn expiry_is_enforced_only_when_configured() {
        let expiring = JwtTokenAdapter::new("secret", Some(Duration::from_secs(3600)));
        let stale = Claims {
            sub: Uuid::new_v4().to_string(),
            iat: Utc::now().timestamp() - 7200,
            exp: Some(Utc::now().timestamp() - 3600),
        };
        let stale_token = encode(
            &Header::new(Algorithm::HS256),
            &stale,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();
        assert!(expiring.verify_token(&stale_token).is_err());

        let fresh = expiring.issue_token(Uuid::new_v4()).unwrap();
        assert!(expiring.verify_token(&fresh).is_ok());

        // A token minted without expiry is not accepted once a lifetime is required.
        let unbounded = JwtTokenAdapter::new("secret", None)
            .issue_token(Uuid::new_v4())
            .unwrap();
        assert!(expiring.verify_token(&unbounded).is_err());
    }
}
