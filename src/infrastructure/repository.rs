//! Repository trait for todo records.
//!
//! Every method returns a boxed, `'static` future so that implementations
//! can clone their connection handle into the future and callers can hold
//! the repository behind `Arc<dyn TodoRepository>`.

use futures::future::BoxFuture;
use thiserror::Error;

use crate::domain::{Todo, TodoDraft, TodoId};

// =============================================================================
// Repository Error
// =============================================================================

/// Errors that can occur during repository operations.
///
/// "Not found" is never an error here: lookups return `None` and
/// mutations return `false`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Database driver or query error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// A stored document could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The store could not be reached.
    #[error("Connection error: {0}")]
    ConnectionError(String),
}

/// Future returned by every repository operation.
pub type RepositoryFuture<T> = BoxFuture<'static, Result<T, RepositoryError>>;

// =============================================================================
// Todo Repository
// =============================================================================

/// Store adapter for todo records held in a document collection.
///
/// # Example
///
/// ```ignore
/// let repository: Arc<dyn TodoRepository> = Arc::new(InMemoryTodoRepository::new());
///
/// let todo = repository.insert(&TodoDraft::new("Buy milk", Timestamp::now())).await?;
/// let found = repository.find_by_id(&todo.todo_id).await?;
/// ```
pub trait TodoRepository: Send + Sync {
    /// Returns every record in the collection, in no particular order.
    fn list(&self) -> RepositoryFuture<Vec<Todo>>;

    /// Finds a record by its identifier.
    ///
    /// Returns `Ok(None)` if no record matches.
    fn find_by_id(&self, id: &TodoId) -> RepositoryFuture<Option<Todo>>;

    /// Persists a draft under a freshly assigned identifier.
    fn insert(&self, draft: &TodoDraft) -> RepositoryFuture<Todo>;

    /// Overwrites the mutable fields of the record matching `id`.
    ///
    /// `name`, `description`, `is_complete`, `allocation_time` and
    /// `updated_at` are taken from `todo`; the identifier and `created_at`
    /// of the stored record are left alone. Returns `Ok(false)` if no record
    /// matches.
    fn update(&self, id: &TodoId, todo: &Todo) -> RepositoryFuture<bool>;

    /// Deletes the record matching `id`.
    ///
    /// Returns `Ok(true)` if a record was removed, `Ok(false)` if none existed.
    fn delete(&self, id: &TodoId) -> RepositoryFuture<bool>;
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(RepositoryError::DatabaseError("connection refused".to_string()), "Database error: connection refused")]
    #[case(RepositoryError::SerializationError("missing field `Name`".to_string()), "Serialization error: missing field `Name`")]
    #[case(RepositoryError::ConnectionError("pool timed out".to_string()), "Connection error: pool timed out")]
    fn test_repository_error_display(#[case] error: RepositoryError, #[case] expected: &str) {
        assert_eq!(format!("{error}"), expected);
    }
}
