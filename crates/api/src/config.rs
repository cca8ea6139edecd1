//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `GEM_SHOP_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`); only needed for the `postgres` store
//!
//! ## Optional
//! - `GEM_SHOP_STORE` - Record store backend, `postgres` or `memory` (default: postgres)
//! - `GEM_SHOP_HOST` - Bind address (default: 127.0.0.1)
//! - `GEM_SHOP_PORT` - Listen port, overridden by `PORT` when set (default: 5000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Where records are kept.
#[derive(Clone)]
pub enum StoreBackend {
    /// `PostgreSQL` at the given URL (contains password).
    Postgres(SecretString),
    /// Process memory; lost on restart.
    Memory,
}

impl std::fmt::Debug for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Postgres(_) => f.write_str("Postgres([REDACTED])"),
            Self::Memory => f.write_str("Memory"),
        }
    }
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Record store backend
    pub store: StoreBackend,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let store = match lookup("GEM_SHOP_STORE").as_deref() {
            None | Some("postgres") => {
                StoreBackend::Postgres(get_database_url(&lookup, "GEM_SHOP_DATABASE_URL")?)
            }
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(ConfigError::InvalidEnvVar(
                    "GEM_SHOP_STORE".to_string(),
                    format!("unknown store '{other}', expected 'postgres' or 'memory'"),
                ));
            }
        };

        let host = get_or_default(&lookup, "GEM_SHOP_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("GEM_SHOP_HOST".to_string(), e.to_string()))?;

        let (port_key, port) = match lookup("PORT") {
            Some(port) => ("PORT", port),
            None => (
                "GEM_SHOP_PORT",
                get_or_default(&lookup, "GEM_SHOP_PORT", "5000"),
            ),
        };
        let port = port
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar(port_key.to_string(), e.to_string()))?;

        Ok(Self {
            store,
            host,
            port,
            sentry_dsn: lookup("SENTRY_DSN").filter(|v| !v.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT").filter(|v| !v.is_empty()),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(
    lookup: &impl Fn(&str) -> Option<String>,
    primary_key: &str,
) -> Result<SecretString, ConfigError> {
    lookup(primary_key)
        .or_else(|| lookup("DATABASE_URL"))
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get a variable with a default value.
fn get_or_default(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key).unwrap_or_else(|| default.to_string())
}

/// Get the database URL on its own, for tools that only need the database.
///
/// # Errors
///
/// Returns `ConfigError::MissingEnvVar` if neither variable is set.
pub fn database_url_from_env() -> Result<SecretString, ConfigError> {
    let _ = dotenvy::dotenv();
    get_database_url(&|key: &str| std::env::var(key).ok(), "GEM_SHOP_DATABASE_URL")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ApiConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_with_database_url() {
        let config = load(&[("GEM_SHOP_DATABASE_URL", "postgres://localhost/gems")]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:5000");
        assert!(config.sentry_dsn.is_none());
        let StoreBackend::Postgres(url) = config.store else {
            panic!("expected postgres backend");
        };
        assert_eq!(url.expose_secret(), "postgres://localhost/gems");
    }

    #[test]
    fn test_database_url_fallback() {
        let config = load(&[("DATABASE_URL", "postgres://fallback/db")]).unwrap();
        let StoreBackend::Postgres(url) = config.store else {
            panic!("expected postgres backend");
        };
        assert_eq!(url.expose_secret(), "postgres://fallback/db");
    }

    #[test]
    fn test_postgres_requires_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "GEM_SHOP_DATABASE_URL"));
    }

    #[test]
    fn test_memory_store_needs_no_url() {
        let config = load(&[("GEM_SHOP_STORE", "memory")]).unwrap();
        assert!(matches!(config.store, StoreBackend::Memory));
    }

    #[test]
    fn test_unknown_store_rejected() {
        let err = load(&[("GEM_SHOP_STORE", "mongo")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_port_prefers_generic_port() {
        let config = load(&[
            ("GEM_SHOP_STORE", "memory"),
            ("GEM_SHOP_PORT", "6000"),
            ("PORT", "8080"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);

        let err = load(&[("GEM_SHOP_STORE", "memory"), ("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "PORT"));
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let config = load(&[("GEM_SHOP_DATABASE_URL", "postgres://user:hunter2@db/gems")]).unwrap();
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("hunter2"));
    }
}
