//! Todo service.
//!
//! Applies defaults on create and the partial-update merge rules, then
//! delegates persistence to the injected repository.

use std::sync::Arc;

use crate::domain::{NewTodo, Timestamp, Todo, TodoDraft, TodoId, TodoPatch};
use crate::infrastructure::{RepositoryError, TodoRepository};

// =============================================================================
// Pure Functions
// =============================================================================

/// Builds the draft stored for a create request.
///
/// The description defaults to empty, the record starts open, and both
/// timestamps are `now`.
#[must_use]
pub fn build_todo(input: NewTodo, now: Timestamp) -> TodoDraft {
    TodoDraft::new(input.name, now)
        .with_description(input.description.unwrap_or_default())
        .with_allocation_time(input.allocation_time)
}

/// Merges a patch into an existing record.
///
/// `updated_at` becomes `now`, clamped so it never precedes `created_at`.
/// Identifier and `created_at` are left alone.
#[must_use]
pub fn apply_patch(mut todo: Todo, patch: TodoPatch, now: Timestamp) -> Todo {
    patch.apply(&mut todo);
    todo.updated_at = now.max(todo.created_at);
    todo
}

// =============================================================================
// Todo Service
// =============================================================================

/// Business operations on todo records.
///
/// Cloning is cheap; every clone shares the same repository.
#[derive(Clone)]
pub struct TodoService {
    repository: Arc<dyn TodoRepository>,
}

impl std::fmt::Debug for TodoService {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.debug_struct("TodoService").finish_non_exhaustive()
    }
}

impl TodoService {
    /// Creates a service over the given repository.
    #[must_use]
    pub fn new(repository: Arc<dyn TodoRepository>) -> Self {
        Self { repository }
    }

    /// Returns every stored record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    pub async fn list_all(&self) -> Result<Vec<Todo>, RepositoryError> {
        self.repository.list().await
    }

    /// Returns the record with the given id, or `None`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    pub async fn get_by_id(&self, id: &TodoId) -> Result<Option<Todo>, RepositoryError> {
        self.repository.find_by_id(id).await
    }

    /// Creates a record and returns it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    pub async fn create(&self, input: NewTodo) -> Result<Todo, RepositoryError> {
        let draft = build_todo(input, Timestamp::now());
        let todo = self.repository.insert(&draft).await?;

        tracing::debug!(todo_id = %todo.todo_id, "todo created");
        Ok(todo)
    }

    /// Applies a partial update.
    ///
    /// Returns `false` if no record has the given id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    pub async fn update(&self, id: &TodoId, patch: TodoPatch) -> Result<bool, RepositoryError> {
        let Some(existing) = self.repository.find_by_id(id).await? else {
            tracing::debug!(todo_id = %id, "update skipped, todo not found");
            return Ok(false);
        };

        let updated = apply_patch(existing, patch, Timestamp::now());
        let modified = self.repository.update(id, &updated).await?;

        tracing::debug!(todo_id = %id, modified, "todo updated");
        Ok(modified)
    }

    /// Deletes a record.
    ///
    /// Returns `false` if no record has the given id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    pub async fn delete(&self, id: &TodoId) -> Result<bool, RepositoryError> {
        let deleted = self.repository.delete(id).await?;

        tracing::debug!(todo_id = %id, deleted, "todo delete");
        Ok(deleted)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Patch;
    use crate::infrastructure::InMemoryTodoRepository;
    use proptest::prelude::*;
    use rstest::{fixture, rstest};

    fn timestamp(value: &str) -> Timestamp {
        Timestamp::parse_rfc3339(value).unwrap()
    }

    #[fixture]
    fn service() -> TodoService {
        TodoService::new(Arc::new(InMemoryTodoRepository::new()))
    }

    // -------------------------------------------------------------------------
    // Pure Function Tests
    // -------------------------------------------------------------------------

    #[rstest]
    fn test_build_todo_applies_defaults() {
        let now = timestamp("2024-06-01T09:00:00Z");
        let draft = build_todo(NewTodo::new("Buy milk"), now);

        assert_eq!(draft.name, "Buy milk");
        assert_eq!(draft.description, "");
        assert!(!draft.is_complete);
        assert_eq!(draft.allocation_time, None);
        assert_eq!(draft.created_at, now);
        assert_eq!(draft.updated_at, now);
    }

    #[rstest]
    fn test_build_todo_keeps_supplied_fields() {
        let now = timestamp("2024-06-01T09:00:00Z");
        let allocation = timestamp("2024-06-01T10:00:00Z");
        let input = NewTodo::new("  padded  ")
            .with_description("2 litres")
            .with_allocation_time(allocation);

        let draft = build_todo(input, now);

        assert_eq!(draft.name, "  padded  ");
        assert_eq!(draft.description, "2 litres");
        assert_eq!(draft.allocation_time, Some(allocation));
    }

    #[rstest]
    fn test_apply_patch_empty_changes_only_updated_at() {
        let created = timestamp("2024-06-01T09:00:00Z");
        let later = timestamp("2024-06-01T12:00:00Z");
        let todo = TodoDraft::new("Buy milk", created).into_todo(TodoId::generate());

        let updated = apply_patch(todo.clone(), TodoPatch::default(), later);

        assert_eq!(updated.updated_at, later);
        assert_eq!(
            Todo {
                updated_at: todo.updated_at,
                ..updated
            },
            todo
        );
    }

    #[rstest]
    fn test_apply_patch_clamps_updated_at_to_created_at() {
        let created = timestamp("2024-06-01T09:00:00Z");
        let skewed = timestamp("2024-06-01T08:59:00Z");
        let todo = TodoDraft::new("Buy milk", created).into_todo(TodoId::generate());

        let updated = apply_patch(todo, TodoPatch::default(), skewed);

        assert_eq!(updated.updated_at, created);
    }

    #[rstest]
    #[case(Patch::Null, None)]
    #[case(Patch::Missing, Some("2024-06-01T10:00:00Z"))]
    #[case(Patch::Value(timestamp("2024-07-01T10:00:00Z")), Some("2024-07-01T10:00:00Z"))]
    fn test_apply_patch_allocation_time(
        #[case] patch: Patch<Timestamp>,
        #[case] expected: Option<&str>,
    ) {
        let now = timestamp("2024-06-01T09:00:00Z");
        let todo = TodoDraft::new("Buy milk", now)
            .with_allocation_time(Some(timestamp("2024-06-01T10:00:00Z")))
            .into_todo(TodoId::generate());

        let updated = apply_patch(
            todo,
            TodoPatch {
                allocation_time: patch,
                ..TodoPatch::default()
            },
            now,
        );

        assert_eq!(updated.allocation_time, expected.map(timestamp));
    }

    // -------------------------------------------------------------------------
    // Service Tests
    // -------------------------------------------------------------------------

    #[rstest]
    #[tokio::test]
    async fn test_create_then_get_returns_equal_record(service: TodoService) {
        let created = service.create(NewTodo::new("Buy milk")).await.unwrap();
        let found = service.get_by_id(&created.todo_id).await.unwrap();

        assert_eq!(found, Some(created));
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_merges_supplied_fields(service: TodoService) {
        let created = service
            .create(NewTodo::new("Buy milk").with_description("semi-skimmed"))
            .await
            .unwrap();

        let patch = TodoPatch {
            is_complete: Patch::Value(true),
            name: Patch::Null,
            ..TodoPatch::default()
        };
        assert!(service.update(&created.todo_id, patch).await.unwrap());

        let found = service.get_by_id(&created.todo_id).await.unwrap().unwrap();
        assert!(found.is_complete);
        assert_eq!(found.name, "Buy milk");
        assert_eq!(found.description, "semi-skimmed");
        assert_eq!(found.created_at, created.created_at);
        assert!(found.updated_at >= created.updated_at);
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_missing_returns_false_and_creates_nothing(service: TodoService) {
        let patch = TodoPatch {
            is_complete: Patch::Value(true),
            ..TodoPatch::default()
        };

        let modified = service.update(&TodoId::generate(), patch).await.unwrap();

        assert!(!modified);
        assert!(service.list_all().await.unwrap().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_delete_twice(service: TodoService) {
        let created = service.create(NewTodo::new("Buy milk")).await.unwrap();

        assert_eq!(service.delete(&created.todo_id).await, Ok(true));
        assert_eq!(service.delete(&created.todo_id).await, Ok(false));
        assert_eq!(service.get_by_id(&created.todo_id).await, Ok(None));
    }

    #[rstest]
    #[tokio::test]
    async fn test_list_all_returns_every_record(service: TodoService) {
        service.create(NewTodo::new("first")).await.unwrap();
        service.create(NewTodo::new("second")).await.unwrap();

        let mut names: Vec<String> = service
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|todo| todo.name)
            .collect();
        names.sort();

        assert_eq!(names, vec!["first", "second"]);
    }

    proptest! {
        #[test]
        fn create_then_get_round_trips(name in "\\PC{1,40}", description in "\\PC{0,80}") {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap();

            let (created, found) = runtime.block_on(async {
                let service = TodoService::new(Arc::new(InMemoryTodoRepository::new()));
                let created = service
                    .create(NewTodo::new(name.clone()).with_description(description.clone()))
                    .await
                    .unwrap();
                let found = service.get_by_id(&created.todo_id).await.unwrap();
                (created, found)
            });

            prop_assert_eq!(&created.name, &name);
            prop_assert_eq!(&created.description, &description);
            prop_assert_eq!(found, Some(created));
        }
    }
}
