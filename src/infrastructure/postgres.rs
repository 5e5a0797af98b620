//! `PostgreSQL` repository implementation.
//!
//! Each collection is a table holding one JSONB document per row, accessed
//! through `sqlx`.
//!
//! # Table Schema
//!
//! ```sql
//! CREATE SCHEMA IF NOT EXISTS "todo_db";
//! CREATE TABLE IF NOT EXISTS "todo_db"."todos" (
//!     id UUID PRIMARY KEY,
//!     data JSONB NOT NULL
//! );
//! ```
//!
//! `data` carries the full document (see [`super::document`]), including
//! its own `_id`, so rows can be read without consulting the `id` column.

use futures::FutureExt;
use sqlx::PgPool;

use crate::domain::{Todo, TodoDraft, TodoId};
use crate::infrastructure::collection::Collection;
use crate::infrastructure::document::{from_document, mutable_fields_document, to_document};
use crate::infrastructure::{RepositoryError, RepositoryFuture, TodoRepository};

// =============================================================================
// PostgreSQL Todo Repository
// =============================================================================

/// `PostgreSQL` implementation of `TodoRepository`.
///
/// # Example
///
/// ```ignore
/// use infrastructure::postgres::PostgresTodoRepository;
///
/// let pool = PgPool::connect("postgres://localhost/mydb").await?;
/// let repository = PostgresTodoRepository::new(pool, Collection::default());
/// repository.ensure_collection().await?;
///
/// let todo = repository.insert(&TodoDraft::new("Buy milk", Timestamp::now())).await?;
/// ```
#[derive(Debug, Clone)]
pub struct PostgresTodoRepository {
    /// Connection pool for `PostgreSQL`.
    pool: PgPool,
    /// Collection backing this repository.
    collection: Collection,
    /// Quoted `"schema"."table"` name of the collection.
    table: String,
}

impl PostgresTodoRepository {
    /// Creates a new repository over the given pool and collection.
    #[must_use]
    pub fn new(pool: PgPool, collection: Collection) -> Self {
        let table = collection.qualified_table();
        Self {
            pool,
            collection,
            table,
        }
    }

    /// Creates the schema and table backing the collection if they are missing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if either statement fails.
    pub async fn ensure_collection(&self) -> Result<(), RepositoryError> {
        sqlx::query(&format!(
            "CREATE SCHEMA IF NOT EXISTS \"{}\"",
            self.collection.database()
        ))
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {} (id UUID PRIMARY KEY, data JSONB NOT NULL)",
            self.table
        ))
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(())
    }
}

/// Maps a driver error, separating connectivity failures from query failures.
fn database_error(error: sqlx::Error) -> RepositoryError {
    match error {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed => RepositoryError::ConnectionError(error.to_string()),
        _ => RepositoryError::DatabaseError(error.to_string()),
    }
}

impl TodoRepository for PostgresTodoRepository {
    fn list(&self) -> RepositoryFuture<Vec<Todo>> {
        let pool = self.pool.clone();
        let sql = format!("SELECT data FROM {}", self.table);

        async move {
            let rows: Vec<(serde_json::Value,)> = sqlx::query_as(&sql)
                .fetch_all(&pool)
                .await
                .map_err(database_error)?;

            rows.iter()
                .map(|(data,)| from_document(data))
                .collect::<Result<Vec<_>, _>>()
        }
        .boxed()
    }

    fn find_by_id(&self, id: &TodoId) -> RepositoryFuture<Option<Todo>> {
        let pool = self.pool.clone();
        let todo_id = id.clone();
        let sql = format!("SELECT data FROM {} WHERE id = $1", self.table);

        async move {
            let row: Option<(serde_json::Value,)> = sqlx::query_as(&sql)
                .bind(todo_id.as_uuid())
                .fetch_optional(&pool)
                .await
                .map_err(database_error)?;

            row.map(|(data,)| from_document(&data)).transpose()
        }
        .boxed()
    }

    fn insert(&self, draft: &TodoDraft) -> RepositoryFuture<Todo> {
        let pool = self.pool.clone();
        let draft = draft.clone();
        let sql = format!(
            "INSERT INTO {} (id, data) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING",
            self.table
        );

        async move {
            loop {
                let todo = draft.clone().into_todo(TodoId::generate());

                let result = sqlx::query(&sql)
                    .bind(todo.todo_id.as_uuid())
                    .bind(to_document(&todo))
                    .execute(&pool)
                    .await
                    .map_err(database_error)?;

                // zero rows means the generated id already exists
                if result.rows_affected() > 0 {
                    return Ok(todo);
                }
            }
        }
        .boxed()
    }

    fn update(&self, id: &TodoId, todo: &Todo) -> RepositoryFuture<bool> {
        let pool = self.pool.clone();
        let todo_id = id.clone();
        let fields = mutable_fields_document(todo);
        let sql = format!("UPDATE {} SET data = data || $1 WHERE id = $2", self.table);

        async move {
            let result = sqlx::query(&sql)
                .bind(fields)
                .bind(todo_id.as_uuid())
                .execute(&pool)
                .await
                .map_err(database_error)?;

            Ok(result.rows_affected() > 0)
        }
        .boxed()
    }

    fn delete(&self, id: &TodoId) -> RepositoryFuture<bool> {
        let pool = self.pool.clone();
        let todo_id = id.clone();
        let sql = format!("DELETE FROM {} WHERE id = $1", self.table);

        async move {
            let result = sqlx::query(&sql)
                .bind(todo_id.as_uuid())
                .execute(&pool)
                .await
                .map_err(database_error)?;

            Ok(result.rows_affected() > 0)
        }
        .boxed()
    }
}

// =============================================================================
// Tests
// =============================================================================
