//! Repository factory for runtime backend selection.
//!
//! This module builds the single store client the process shares, choosing
//! between the in-memory, `PostgreSQL` and Redis backends from
//! configuration.
//!
//! # Environment Variables
//!
//! - `STORAGE_MODE`: `in_memory` (default) | `postgres` | `redis`
//! - `DATABASE_URL`: `PostgreSQL` connection URL (required when `STORAGE_MODE=postgres`)
//! - `REDIS_URL`: Redis connection URL (required when `STORAGE_MODE=redis`)
//! - `TODO_DATABASE`: database name (default: `todo_db`)
//! - `TODO_COLLECTION`: collection name (default: `todos`)
//!
//! # Example
//!
//! ```ignore
//! use infrastructure::factory::{RepositoryConfig, RepositoryFactory};
//!
//! let config = RepositoryConfig::from_env()?;
//! let repository = RepositoryFactory::new(config).create().await?;
//! let service = TodoService::new(repository);
//! ```

use std::env;
use std::str::FromStr;
use std::sync::Arc;

use sqlx::PgPool;
use thiserror::Error;

use super::collection::{Collection, CollectionNameError, DEFAULT_COLLECTION, DEFAULT_DATABASE};
use super::{
    InMemoryTodoRepository, PostgresTodoRepository, RedisTodoRepository, RepositoryError,
    TodoRepository,
};

// =============================================================================
// Configuration Types
// =============================================================================

/// Backend holding the todo collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    /// Process-local storage. Suitable for testing and development.
    #[default]
    InMemory,
    /// `PostgreSQL` JSONB documents.
    Postgres,
    /// Redis JSON documents.
    Redis,
}

impl FromStr for StorageMode {
    type Err = ConfigurationError;

    /// Parses a storage mode from a string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidStorageMode` if the string is not recognized.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "redis" => Ok(Self::Redis),
            _ => Err(ConfigurationError::InvalidStorageMode(value.to_string())),
        }
    }
}

/// Configuration for the repository factory.
#[derive(Debug, Clone, Default)]
pub struct RepositoryConfig {
    /// Backend to use.
    pub storage_mode: StorageMode,
    /// `PostgreSQL` connection URL (required when `storage_mode` is `Postgres`).
    pub database_url: Option<String>,
    /// Redis connection URL (required when `storage_mode` is `Redis`).
    pub redis_url: Option<String>,
    /// Database and collection holding the records.
    pub collection: Collection,
}

impl RepositoryConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> RepositoryConfigBuilder {
        RepositoryConfigBuilder::default()
    }

    /// Creates a configuration from environment variables.
    ///
    /// Empty or whitespace-only values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if:
    /// - `STORAGE_MODE` contains an invalid value
    /// - the URL for the selected backend is missing
    /// - `TODO_DATABASE` or `TODO_COLLECTION` is not a plain identifier
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Creates a configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`RepositoryConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let storage_mode = match read("STORAGE_MODE") {
            Some(value) => value.parse()?,
            None => StorageMode::default(),
        };

        let collection = Collection::new(
            read("TODO_DATABASE").unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            read("TODO_COLLECTION").unwrap_or_else(|| DEFAULT_COLLECTION.to_string()),
        )?;

        let config = Self {
            storage_mode,
            database_url: read("DATABASE_URL"),
            redis_url: read("REDIS_URL"),
            collection,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if the URL for the selected backend is missing.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        match self.storage_mode {
            StorageMode::Postgres if self.database_url.is_none() => {
                Err(ConfigurationError::MissingDatabaseUrl)
            }
            StorageMode::Redis if self.redis_url.is_none() => {
                Err(ConfigurationError::MissingRedisUrl)
            }
            _ => Ok(()),
        }
    }
}

/// Builder for `RepositoryConfig`.
///
/// # Example
///
/// ```ignore
/// let config = RepositoryConfig::builder()
///     .storage_mode(StorageMode::Postgres)
///     .database_url("postgres://localhost/mydb")
///     .collection("todo_db", "todos")
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct RepositoryConfigBuilder {
    storage_mode: StorageMode,
    database_url: Option<String>,
    redis_url: Option<String>,
    database_name: Option<String>,
    collection_name: Option<String>,
}

impl RepositoryConfigBuilder {
    /// Sets the storage mode.
    #[must_use]
    pub const fn storage_mode(mut self, mode: StorageMode) -> Self {
        self.storage_mode = mode;
        self
    }

    /// Sets the `PostgreSQL` database URL.
    #[must_use]
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    /// Sets the Redis URL.
    #[must_use]
    pub fn redis_url(mut self, url: impl Into<String>) -> Self {
        self.redis_url = Some(url.into());
        self
    }

    /// Sets the database and collection names.
    #[must_use]
    pub fn collection(mut self, database: impl Into<String>, name: impl Into<String>) -> Self {
        self.database_name = Some(database.into());
        self.collection_name = Some(name.into());
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if the configuration is invalid.
    pub fn build(self) -> Result<RepositoryConfig, ConfigurationError> {
        let collection = Collection::new(
            self.database_name
                .unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            self.collection_name
                .unwrap_or_else(|| DEFAULT_COLLECTION.to_string()),
        )?;

        let config = RepositoryConfig {
            storage_mode: self.storage_mode,
            database_url: self.database_url,
            redis_url: self.redis_url,
            collection,
        };

        config.validate()?;
        Ok(config)
    }
}

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur while reading configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Invalid storage mode value.
    #[error("Invalid storage mode: '{0}'. Expected 'in_memory', 'postgres' or 'redis'")]
    InvalidStorageMode(String),

    /// Missing `DATABASE_URL` when storage mode is Postgres.
    #[error("DATABASE_URL environment variable is required when STORAGE_MODE=postgres")]
    MissingDatabaseUrl,

    /// Missing `REDIS_URL` when storage mode is Redis.
    #[error("REDIS_URL environment variable is required when STORAGE_MODE=redis")]
    MissingRedisUrl,

    /// Unusable database or collection name.
    #[error(transparent)]
    InvalidCollection(#[from] CollectionNameError),
}

/// Errors that can occur during factory initialization.
#[derive(Debug, Error)]
pub enum FactoryError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    DatabaseConnection(String),

    /// Redis connection error.
    #[error("Redis connection error: {0}")]
    RedisConnection(String),

    /// The collection could not be prepared.
    #[error("Collection setup error: {0}")]
    CollectionSetup(#[from] RepositoryError),
}

// =============================================================================
// Repository Factory
// =============================================================================

/// Factory for the process-wide todo repository.
#[derive(Debug, Clone)]
pub struct RepositoryFactory {
    config: RepositoryConfig,
}

impl RepositoryFactory {
    /// Creates a new repository factory with the given configuration.
    #[must_use]
    pub const fn new(config: RepositoryConfig) -> Self {
        Self { config }
    }

    /// Creates the repository for the configured backend.
    ///
    /// For `PostgreSQL` this connects the pool and makes sure the collection
    /// table exists. Redis pools connect lazily.
    ///
    /// # Errors
    ///
    /// Returns `FactoryError` if a connection or the collection setup fails.
    pub async fn create(&self) -> Result<Arc<dyn TodoRepository>, FactoryError> {
        match self.config.storage_mode {
            StorageMode::InMemory => Ok(Arc::new(InMemoryTodoRepository::new())),
            StorageMode::Postgres => {
                let pool = self.create_postgres_pool().await?;
                let repository =
                    PostgresTodoRepository::new(pool, self.config.collection.clone());
                repository.ensure_collection().await?;
                Ok(Arc::new(repository))
            }
            StorageMode::Redis => Ok(Arc::new(self.create_redis_repository()?)),
        }
    }

    /// Creates a `PostgreSQL` connection pool.
    async fn create_postgres_pool(&self) -> Result<PgPool, FactoryError> {
        let database_url = self
            .config
            .database_url
            .as_ref()
            .ok_or(ConfigurationError::MissingDatabaseUrl)?;

        PgPool::connect(database_url)
            .await
            .map_err(|error| FactoryError::DatabaseConnection(error.to_string()))
    }

    /// Creates the Redis-backed repository.
    fn create_redis_repository(&self) -> Result<RedisTodoRepository, FactoryError> {
        let redis_url = self
            .config
            .redis_url
            .as_ref()
            .ok_or(ConfigurationError::MissingRedisUrl)?;

        RedisTodoRepository::from_url(redis_url, &self.config.collection)
            .map_err(|error| FactoryError::RedisConnection(error.to_string()))
    }
}

// =============================================================================
// Tests
// =============================================================================
