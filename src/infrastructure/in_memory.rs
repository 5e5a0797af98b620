//! In-memory repository implementation.
//!
//! Suitable for development and testing. Records live in a `HashMap`
//! behind `Arc<RwLock<...>>`, so clones of the repository share one
//! collection.

use std::collections::HashMap;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::RwLock;

use crate::domain::{Todo, TodoDraft, TodoId};
use crate::infrastructure::{RepositoryFuture, TodoRepository};

// =============================================================================
// In-Memory Todo Repository
// =============================================================================

/// In-memory implementation of `TodoRepository`.
///
/// # Example
///
/// ```ignore
/// use infrastructure::in_memory::InMemoryTodoRepository;
///
/// let repository = InMemoryTodoRepository::new();
/// let todo = repository.insert(&TodoDraft::new("Buy milk", Timestamp::now())).await?;
/// let found = repository.find_by_id(&todo.todo_id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryTodoRepository {
    /// Thread-safe storage keyed by identifier.
    todos: Arc<RwLock<HashMap<TodoId, Todo>>>,
}

impl InMemoryTodoRepository {
    /// Creates a new empty in-memory todo repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            todos: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryTodoRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(clippy::significant_drop_tightening)]
impl TodoRepository for InMemoryTodoRepository {
    fn list(&self) -> RepositoryFuture<Vec<Todo>> {
        let todos = Arc::clone(&self.todos);
        async move {
            let guard = todos.read().await;
            Ok(guard.values().cloned().collect())
        }
        .boxed()
    }

    fn find_by_id(&self, id: &TodoId) -> RepositoryFuture<Option<Todo>> {
        let todos = Arc::clone(&self.todos);
        let id = id.clone();
        async move {
            let guard = todos.read().await;
            Ok(guard.get(&id).cloned())
        }
        .boxed()
    }

    fn insert(&self, draft: &TodoDraft) -> RepositoryFuture<Todo> {
        let todos = Arc::clone(&self.todos);
        let draft = draft.clone();
        async move {
            let mut guard = todos.write().await;

            // v7 collisions are practically impossible, but ids must never be reused
            let mut todo_id = TodoId::generate();
            while guard.contains_key(&todo_id) {
                todo_id = TodoId::generate();
            }

            let todo = draft.into_todo(todo_id.clone());
            guard.insert(todo_id, todo.clone());
            Ok(todo)
        }
        .boxed()
    }

    fn update(&self, id: &TodoId, todo: &Todo) -> RepositoryFuture<bool> {
        let todos = Arc::clone(&self.todos);
        let id = id.clone();
        let todo = todo.clone();
        async move {
            let mut guard = todos.write().await;
            let Some(stored) = guard.get_mut(&id) else {
                return Ok(false);
            };

            stored.name = todo.name;
            stored.description = todo.description;
            stored.is_complete = todo.is_complete;
            stored.allocation_time = todo.allocation_time;
            stored.updated_at = todo.updated_at;
            Ok(true)
        }
        .boxed()
    }

    fn delete(&self, id: &TodoId) -> RepositoryFuture<bool> {
        let todos = Arc::clone(&self.todos);
        let id = id.clone();
        async move {
            let mut guard = todos.write().await;
            Ok(guard.remove(&id).is_some())
        }
        .boxed()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Timestamp;
    use rstest::rstest;

    fn draft(name: &str) -> TodoDraft {
        TodoDraft::new(name, Timestamp::now())
    }

    #[rstest]
    #[tokio::test]
    async fn test_find_by_id_not_found() {
        let repository = InMemoryTodoRepository::new();
        let result = repository.find_by_id(&TodoId::generate()).await;
        assert_eq!(result, Ok(None));
    }

    #[rstest]
    #[tokio::test]
    async fn test_insert_assigns_id_and_find_returns_it() {
        let repository = InMemoryTodoRepository::new();
        let draft = draft("Buy milk");

        let todo = repository.insert(&draft).await.unwrap();
        assert_eq!(todo.name, draft.name);
        assert_eq!(todo.created_at, draft.created_at);

        let found = repository.find_by_id(&todo.todo_id).await.unwrap();
        assert_eq!(found, Some(todo));
    }

    #[rstest]
    #[tokio::test]
    async fn test_insert_assigns_distinct_ids() {
        let repository = InMemoryTodoRepository::new();
        let first = repository.insert(&draft("first")).await.unwrap();
        let second = repository.insert(&draft("first")).await.unwrap();

        assert_ne!(first.todo_id, second.todo_id);
        assert_eq!(repository.list().await.unwrap().len(), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_overwrites_mutable_fields_only() {
        let repository = InMemoryTodoRepository::new();
        let stored = repository.insert(&draft("Buy milk")).await.unwrap();

        let mut changed = stored.clone();
        changed.name = "Buy oat milk".to_string();
        changed.is_complete = true;
        changed.created_at = Timestamp::parse_rfc3339("2000-01-01T00:00:00Z").unwrap();
        changed.updated_at = Timestamp::now();

        let modified = repository.update(&stored.todo_id, &changed).await.unwrap();
        assert!(modified);

        let found = repository.find_by_id(&stored.todo_id).await.unwrap().unwrap();
        assert_eq!(found.name, "Buy oat milk");
        assert!(found.is_complete);
        assert_eq!(found.created_at, stored.created_at);
        assert_eq!(found.updated_at, changed.updated_at);
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_missing_returns_false() {
        let repository = InMemoryTodoRepository::new();
        let phantom = draft("ghost").into_todo(TodoId::generate());

        let modified = repository.update(&phantom.todo_id, &phantom).await.unwrap();
        assert!(!modified);
        assert!(repository.list().await.unwrap().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_delete_twice() {
        let repository = InMemoryTodoRepository::new();
        let todo = repository.insert(&draft("Buy milk")).await.unwrap();

        assert_eq!(repository.delete(&todo.todo_id).await, Ok(true));
        assert_eq!(repository.delete(&todo.todo_id).await, Ok(false));
        assert_eq!(repository.find_by_id(&todo.todo_id).await, Ok(None));
    }

    #[rstest]
    #[tokio::test]
    async fn test_clones_share_storage() {
        let repository = InMemoryTodoRepository::new();
        let clone = repository.clone();

        let todo = repository.insert(&draft("shared")).await.unwrap();
        assert!(clone.find_by_id(&todo.todo_id).await.unwrap().is_some());
    }
}
