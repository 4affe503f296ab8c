//! Environment-driven configuration for the backing store.

use std::env;
use thiserror::Error;

/// Environment variable naming the `PostgreSQL` connection string.
pub const DATABASE_URL_VAR: &str = "STATELINE_DATABASE_URL";

/// Environment variable overriding the connection pool size.
pub const POOL_SIZE_VAR: &str = "STATELINE_POOL_SIZE";

/// Default connection pool size.
pub const DEFAULT_POOL_SIZE: u32 = 10;

/// Settings for the `PostgreSQL` task store.
///
/// Built once at process start and handed to
/// [`PostgresTaskStore::connect`](crate::tracking::adapters::postgres::PostgresTaskStore::connect);
/// nothing reads the environment lazily after startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    database_url: String,
    pool_size: u32,
}

impl StoreConfig {
    /// Creates a configuration with the default pool size.
    #[must_use]
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            pool_size: DEFAULT_POOL_SIZE,
        }
    }

    /// Overrides the connection pool size.
    #[must_use]
    pub const fn with_pool_size(mut self, pool_size: u32) -> Self {
        self.pool_size = pool_size;
        self
    }

    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingDatabaseUrl`] when
    /// `STATELINE_DATABASE_URL` is unset or empty, and
    /// [`ConfigError::InvalidPoolSize`] when `STATELINE_POOL_SIZE` is
    /// set but not a positive integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var(DATABASE_URL_VAR)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::MissingDatabaseUrl)?;

        let mut config = Self::new(database_url);
        if let Ok(raw) = env::var(POOL_SIZE_VAR) {
            let pool_size = raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|size| *size > 0)
                .ok_or_else(|| ConfigError::InvalidPoolSize(raw.clone()))?;
            config = config.with_pool_size(pool_size);
        }
        Ok(config)
    }

    /// Returns the `PostgreSQL` connection string.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Returns the connection pool size.
    #[must_use]
    pub const fn pool_size(&self) -> u32 {
        self.pool_size
    }
}

/// Errors raised while reading store configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The database URL variable is unset or empty.
    #[error("{DATABASE_URL_VAR} must be set to a PostgreSQL connection string")]
    MissingDatabaseUrl,

    /// The pool size variable is not a positive integer.
    #[error("invalid {POOL_SIZE_VAR} value '{0}', expected a positive integer")]
    InvalidPoolSize(String),
}
