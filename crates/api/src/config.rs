//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPLIST_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`; only required for the `postgres` storage backend)
//!
//! ## Optional
//! - `SHOPLIST_STORAGE` - `postgres` (default) or `memory`
//! - `SHOPLIST_HOST` - Bind address (default: 127.0.0.1)
//! - `SHOPLIST_PORT` - Listen port (default: 3001)
//! - `SHOPLIST_REQUEST_TIMEOUT_SECS` - Deadline for one storage round trip (default: 10)
//! - `SHOPLIST_DEFAULT_PAGE_SIZE` - Page size when a request names none (default: 20)
//! - `SHOPLIST_MAX_PAGE_SIZE` - Largest accepted page size (default: 100)
//! - `SHOPLIST_CORS_ORIGINS` - Comma-separated origins allowed to call the API
//! - `SHOPLIST_SEED_DEMO` - Seed demo lists into the memory backend (default: false)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

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

/// Where shopping lists are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// `PostgreSQL` document table.
    Postgres,
    /// Process-local memory; contents are lost on restart.
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown storage backend '{other}'")),
        }
    }
}

/// Paging limits for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Storage backend for shopping lists
    pub storage: StorageBackend,
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: Option<SecretString>,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Deadline for each storage round trip
    pub request_timeout: Duration,
    /// Paging limits
    pub paging: PagingConfig,
    /// Origins allowed by CORS
    pub cors_origins: Vec<String>,
    /// Seed demo data into the memory backend on startup
    pub seed_demo: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry transaction sample rate
    pub sentry_traces_sample_rate: f32,
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

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let storage = env.parse_or("SHOPLIST_STORAGE", StorageBackend::Postgres)?;
        let database_url = env
            .optional("SHOPLIST_DATABASE_URL")
            .or_else(|| env.optional("DATABASE_URL"))
            .map(SecretString::from);
        if storage == StorageBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::MissingEnvVar(
                "SHOPLIST_DATABASE_URL".to_string(),
            ));
        }

        let host = env.parse_or("SHOPLIST_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = env.parse_or("SHOPLIST_PORT", 3001_u16)?;

        let timeout_secs = env.parse_or("SHOPLIST_REQUEST_TIMEOUT_SECS", 10_u64)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "SHOPLIST_REQUEST_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let defaults = PagingConfig::default();
        let paging = PagingConfig {
            default_page_size: env
                .parse_or("SHOPLIST_DEFAULT_PAGE_SIZE", defaults.default_page_size)?,
            max_page_size: env.parse_or("SHOPLIST_MAX_PAGE_SIZE", defaults.max_page_size)?,
        };
        if paging.default_page_size == 0 || paging.default_page_size > paging.max_page_size {
            return Err(ConfigError::InvalidEnvVar(
                "SHOPLIST_DEFAULT_PAGE_SIZE".to_string(),
                format!("must be between 1 and {}", paging.max_page_size),
            ));
        }

        let cors_origins = env
            .optional("SHOPLIST_CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            storage,
            database_url,
            host,
            port,
            request_timeout: Duration::from_secs(timeout_secs),
            paging,
            cors_origins,
            seed_demo: env.parse_or("SHOPLIST_SEED_DEMO", false)?,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: env.parse_or("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: env.parse_or("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Configuration for tests and local runs: memory storage, no Sentry.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            storage: StorageBackend::Memory,
            database_url: None,
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3001,
            request_timeout: Duration::from_secs(10),
            paging: PagingConfig::default(),
            cors_origins: Vec::new(),
            seed_demo: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    /// Get an optional variable, treating blank values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Parse a variable, falling back to a default when unset.
    fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key).map_or(Ok(default), |raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ApiConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_postgres_requires_database_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "SHOPLIST_DATABASE_URL"));
    }

    #[test]
    fn test_database_url_fallback() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/shoplist")]).unwrap();
        assert_eq!(
            config.database_url.unwrap().expose_secret(),
            "postgres://localhost/shoplist"
        );
    }

    #[test]
    fn test_memory_backend_needs_no_database() {
        let config = load(&[("SHOPLIST_STORAGE", "memory")]).unwrap();
        assert_eq!(config.storage, StorageBackend::Memory);
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("SHOPLIST_STORAGE", "memory")]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3001");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.paging, PagingConfig::default());
        assert!(config.cors_origins.is_empty());
        assert!(!config.seed_demo);
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[("SHOPLIST_STORAGE", "memory"), ("SHOPLIST_PORT", "http")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "SHOPLIST_PORT"));
    }

    #[test]
    fn test_unknown_storage_backend() {
        assert!(load(&[("SHOPLIST_STORAGE", "mongo")]).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(
            load(&[
                ("SHOPLIST_STORAGE", "memory"),
                ("SHOPLIST_REQUEST_TIMEOUT_SECS", "0")
            ])
            .is_err()
        );
    }

    #[test]
    fn test_default_page_size_above_max_rejected() {
        assert!(
            load(&[
                ("SHOPLIST_STORAGE", "memory"),
                ("SHOPLIST_DEFAULT_PAGE_SIZE", "500")
            ])
            .is_err()
        );
    }

    #[test]
    fn test_cors_origins_split() {
        let config = load(&[
            ("SHOPLIST_STORAGE", "memory"),
            (
                "SHOPLIST_CORS_ORIGINS",
                "http://localhost:3000, https://lists.example.com,",
            ),
        ])
        .unwrap();
        assert_eq!(
            config.cors_origins,
            vec!["http://localhost:3000", "https://lists.example.com"]
        );
    }

    #[test]
    fn test_database_url_not_in_debug_output() {
        let config = load(&[("SHOPLIST_DATABASE_URL", "postgres://user:hunter2@db/lists")]).unwrap();
        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("hunter2"));
    }
}
