//! Infrastructure module for external services.
//!
//! This module contains the store adapters and the factory that picks one
//! at startup.

pub mod collection;
pub mod document;
pub mod factory;
pub mod in_memory;
pub mod postgres;
pub mod redis;
pub mod repository;

pub use collection::{Collection, CollectionNameError};
pub use factory::{
    ConfigurationError, FactoryError, RepositoryConfig, RepositoryConfigBuilder,
    RepositoryFactory, StorageMode,
};
pub use in_memory::InMemoryTodoRepository;
pub use postgres::PostgresTodoRepository;
pub use redis::RedisTodoRepository;
pub use repository::{RepositoryError, RepositoryFuture, TodoRepository};
