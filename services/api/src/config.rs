//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// `None` runs the service against the in-memory store.
    pub database_url: Option<String>,
    pub log_level: Level,
    pub jwt_secret: String,
    /// `None` issues tokens without an expiry.
    pub token_ttl: Option<Duration>,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub catalog_url: String,
    pub catalog_timeout: Duration,
    pub cors_origin: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:5000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Auth Settings ---
        let jwt_secret = std::env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingVar("JWT_SECRET".to_string()))?;

        let token_ttl = match std::env::var("TOKEN_TTL_HOURS") {
            Ok(hours) => Some(parse_ttl_hours(&hours)?),
            Err(_) => None,
        };

        // --- Load Upload Settings ---
        let upload_dir = std::env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./uploads"));

        let max_upload_bytes = match std::env::var("MAX_UPLOAD_BYTES") {
            Ok(bytes) => parse_number::<usize>("MAX_UPLOAD_BYTES", &bytes)?,
            Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
        };

        // --- Load Catalog Settings ---
        let catalog_url = std::env::var("CATALOG_URL")
            .unwrap_or_else(|_| "https://gutendex.com/books".to_string());
        let catalog_timeout = match std::env::var("CATALOG_TIMEOUT_SECS") {
            Ok(secs) => Duration::from_secs(parse_number::<u64>("CATALOG_TIMEOUT_SECS", &secs)?),
            Err(_) => Duration::from_secs(10),
        };

        let cors_origin =
            std::env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string());

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            jwt_secret,
            token_ttl,
            upload_dir,
            max_upload_bytes,
            catalog_url,
            catalog_timeout,
            cors_origin,
        })
    }
}

fn parse_number<T: std::str::FromStr>(var: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| {
        ConfigError::InvalidValue(var.to_string(), format!("'{}' is not a valid number", value))
    })
}

fn parse_ttl_hours(value: &str) -> Result<Duration, ConfigError> {
    let hours = parse_number::<u64>("TOKEN_TTL_HOURS", value)?;
    // Lifetimes must stay representable as a JWT `exp` timestamp.
    hours
        .checked_mul(3600)
        .filter(|secs| i64::try_from(*secs).is_ok())
        .map(Duration::from_secs)
        .ok_or_else(|| {
            ConfigError::InvalidValue(
                "TOKEN_TTL_HOURS".to_string(),
                format!("'{}' hours is too long", value),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_are_parsed_with_context() {
        assert_eq!(parse_number::<u64>("X", " 24 ").unwrap(), 24);

        let err = parse_number::<u64>("TOKEN_TTL_HOURS", "soon").unwrap_err();
        assert!(err.to_string().contains("TOKEN_TTL_HOURS"));
    }

    #[test]
    fn token_lifetime_is_bounded() {
        assert_eq!(parse_ttl_hours("24").unwrap(), Duration::from_secs(24 * 3600));

        let err = parse_ttl_hours("18446744073709551615").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref var, _) if var == "TOKEN_TTL_HOURS"));
        assert!(parse_ttl_hours("5000000000000000").is_err());
    }
}
