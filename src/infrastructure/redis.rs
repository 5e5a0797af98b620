//! Redis repository implementation.
//!
//! Uses `deadpool-redis` for connection pooling. Mutations run as Lua
//! scripts so a document and the collection index never disagree.
//!
//! # Key Design
//!
//! - Document: `{database}:{collection}:{todo_id}` -> JSON document
//! - Index: `{database}:{collection}:index` -> SET of todo ids

use deadpool_redis::{Config, Pool, Runtime};
use futures::FutureExt;
use redis::{AsyncCommands, RedisError};

use crate::domain::{Todo, TodoDraft, TodoId};
use crate::infrastructure::collection::Collection;
use crate::infrastructure::document::{from_document, mutable_fields_document, to_document};
use crate::infrastructure::{RepositoryError, RepositoryFuture, TodoRepository};

// =============================================================================
// Lua Scripts
// =============================================================================

/// Stores a new document unless the key is taken.
///
/// Returns 1 on insert, 0 if the id already exists.
const INSERT_SCRIPT: &str = r"
local key = KEYS[1]
local index_key = KEYS[2]
local document = ARGV[1]
local todo_id = ARGV[2]

if redis.call('SET', key, document, 'NX') then
    redis.call('SADD', index_key, todo_id)
    return 1
end
return 0
";

/// Merges the mutable fields into an existing document.
///
/// Returns 1 if the document was rewritten, 0 if it does not exist,
/// -1 if the stored document is not valid JSON.
const UPDATE_SCRIPT: &str = r"
local key = KEYS[1]
local fields = cjson.decode(ARGV[1])

local existing = redis.call('GET', key)
if not existing then
    return 0
end

local ok, document = pcall(cjson.decode, existing)
if not ok then
    return -1
end

for field, value in pairs(fields) do
    document[field] = value
end

redis.call('SET', key, cjson.encode(document))
return 1
";

/// Removes a document and its index entry.
///
/// Returns 1 if deleted, 0 if not found.
const DELETE_SCRIPT: &str = r"
local key = KEYS[1]
local index_key = KEYS[2]
local todo_id = ARGV[1]

local deleted = redis.call('DEL', key)
redis.call('SREM', index_key, todo_id)
return deleted
";

// =============================================================================
// Helper Functions
// =============================================================================

fn redis_error(error: RedisError) -> RepositoryError {
    if error.is_io_error() || error.is_connection_dropped() {
        RepositoryError::ConnectionError(error.to_string())
    } else {
        RepositoryError::DatabaseError(error.to_string())
    }
}

fn decode(json: &str) -> Result<Todo, RepositoryError> {
    let document: serde_json::Value = serde_json::from_str(json)
        .map_err(|error| RepositoryError::SerializationError(error.to_string()))?;
    from_document(&document)
}

// =============================================================================
// Redis Todo Repository
// =============================================================================

/// Redis implementation of `TodoRepository`.
///
/// # Example
///
/// ```ignore
/// use infrastructure::redis::RedisTodoRepository;
///
/// let repository = RedisTodoRepository::from_url("redis://localhost:6379", Collection::default())?;
/// let todo = repository.insert(&TodoDraft::new("Buy milk", Timestamp::now())).await?;
/// ```
#[derive(Debug, Clone)]
pub struct RedisTodoRepository {
    /// Connection pool for Redis.
    pool: Pool,
    /// Prefix shared by every key of the collection.
    key_prefix: String,
}

impl RedisTodoRepository {
    /// Creates a new repository over the given pool and collection.
    #[must_use]
    pub fn new(pool: Pool, collection: &Collection) -> Self {
        Self {
            pool,
            key_prefix: collection.key_prefix(),
        }
    }

    /// Creates a new repository from a Redis URL.
    ///
    /// The pool connects lazily; an unreachable server surfaces on the
    /// first operation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::ConnectionError` if the pool cannot be created.
    pub fn from_url(redis_url: &str, collection: &Collection) -> Result<Self, RepositoryError> {
        let pool = Config::from_url(redis_url)
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|error| RepositoryError::ConnectionError(error.to_string()))?;
        Ok(Self::new(pool, collection))
    }

    fn document_key(&self, todo_id: &TodoId) -> String {
        format!("{}{todo_id}", self.key_prefix)
    }

    fn index_key(&self) -> String {
        format!("{}index", self.key_prefix)
    }

    async fn connection(pool: &Pool) -> Result<deadpool_redis::Connection, RepositoryError> {
        pool.get()
            .await
            .map_err(|error| RepositoryError::ConnectionError(error.to_string()))
    }
}

impl TodoRepository for RedisTodoRepository {
    fn list(&self) -> RepositoryFuture<Vec<Todo>> {
        let pool = self.pool.clone();
        let index_key = self.index_key();
        let key_prefix = self.key_prefix.clone();

        async move {
            let mut connection = Self::connection(&pool).await?;

            let todo_ids: Vec<String> = connection
                .smembers(&index_key)
                .await
                .map_err(redis_error)?;

            if todo_ids.is_empty() {
                return Ok(Vec::new());
            }

            let keys: Vec<String> = todo_ids
                .iter()
                .map(|todo_id| format!("{key_prefix}{todo_id}"))
                .collect();

            let documents: Vec<Option<String>> =
                connection.mget(&keys).await.map_err(redis_error)?;

            // a missing document means the index entry is stale; skip it
            documents
                .iter()
                .flatten()
                .map(|json| decode(json))
                .collect::<Result<Vec<_>, _>>()
        }
        .boxed()
    }

    fn find_by_id(&self, id: &TodoId) -> RepositoryFuture<Option<Todo>> {
        let pool = self.pool.clone();
        let key = self.document_key(id);

        async move {
            let mut connection = Self::connection(&pool).await?;

            let document: Option<String> = connection.get(&key).await.map_err(redis_error)?;

            document.map(|json| decode(&json)).transpose()
        }
        .boxed()
    }

    fn insert(&self, draft: &TodoDraft) -> RepositoryFuture<Todo> {
        let repository = self.clone();
        let draft = draft.clone();

        async move {
            let mut connection = Self::connection(&repository.pool).await?;
            let script = redis::Script::new(INSERT_SCRIPT);

            loop {
                let todo = draft.clone().into_todo(TodoId::generate());
                let document = to_document(&todo).to_string();

                let inserted: i64 = script
                    .key(repository.document_key(&todo.todo_id))
                    .key(repository.index_key())
                    .arg(&document)
                    .arg(todo.todo_id.to_string())
                    .invoke_async(&mut *connection)
                    .await
                    .map_err(redis_error)?;

                if inserted == 1 {
                    return Ok(todo);
                }
            }
        }
        .boxed()
    }

    fn update(&self, id: &TodoId, todo: &Todo) -> RepositoryFuture<bool> {
        let pool = self.pool.clone();
        let key = self.document_key(id);
        let fields = mutable_fields_document(todo).to_string();

        async move {
            let mut connection = Self::connection(&pool).await?;

            let result: i64 = redis::Script::new(UPDATE_SCRIPT)
                .key(&key)
                .arg(&fields)
                .invoke_async(&mut *connection)
                .await
                .map_err(redis_error)?;

            match result {
                1 => Ok(true),
                0 => Ok(false),
                _ => Err(RepositoryError::SerializationError(format!(
                    "Corrupted document at {key}: invalid JSON"
                ))),
            }
        }
        .boxed()
    }

    fn delete(&self, id: &TodoId) -> RepositoryFuture<bool> {
        let pool = self.pool.clone();
        let key = self.document_key(id);
        let index_key = self.index_key();
        let todo_id = id.to_string();

        async move {
            let mut connection = Self::connection(&pool).await?;

            let deleted: i64 = redis::Script::new(DELETE_SCRIPT)
                .key(&key)
                .key(&index_key)
                .arg(&todo_id)
                .invoke_async(&mut *connection)
                .await
                .map_err(redis_error)?;

            Ok(deleted == 1)
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

    fn repository() -> RedisTodoRepository {
        let collection = Collection::new("todo_db_test", "todos").unwrap();
        RedisTodoRepository::from_url("redis://localhost:6379", &collection).unwrap()
    }

    #[rstest]
    fn test_key_layout() {
        let repository = repository();
        let todo_id = TodoId::generate();

        assert_eq!(
            repository.document_key(&todo_id),
            format!("todo_db_test:todos:{todo_id}")
        );
        assert_eq!(repository.index_key(), "todo_db_test:todos:index");
    }

    #[rstest]
    fn test_decode_rejects_invalid_json() {
        assert!(matches!(
            decode("{not json"),
            Err(RepositoryError::SerializationError(_))
        ));
    }

    #[rstest]
    #[tokio::test]
    #[ignore = "Requires Redis instance"]
    async fn test_insert_find_update_delete() {
        let repository = repository();
        let todo = repository
            .insert(&TodoDraft::new("Buy milk", Timestamp::now()))
            .await
            .unwrap();

        let found = repository.find_by_id(&todo.todo_id).await.unwrap();
        assert_eq!(found, Some(todo.clone()));

        let mut changed = todo.clone();
        changed.description = "semi-skimmed".to_string();
        changed.updated_at = Timestamp::now();
        assert!(repository.update(&todo.todo_id, &changed).await.unwrap());

        let found = repository.find_by_id(&todo.todo_id).await.unwrap().unwrap();
        assert_eq!(found.description, "semi-skimmed");
        assert_eq!(found.created_at, todo.created_at);

        let listed = repository.list().await.unwrap();
        assert!(listed.iter().any(|item| item.todo_id == todo.todo_id));

        assert!(repository.delete(&todo.todo_id).await.unwrap());
        assert!(!repository.delete(&todo.todo_id).await.unwrap());
    }

    #[rstest]
    #[tokio::test]
    #[ignore = "Requires Redis instance"]
    async fn test_update_missing_returns_false() {
        let repository = repository();
        let phantom = TodoDraft::new("ghost", Timestamp::now()).into_todo(TodoId::generate());

        assert!(!repository.update(&phantom.todo_id, &phantom).await.unwrap());
        assert_eq!(repository.find_by_id(&phantom.todo_id).await, Ok(None));
    }
}
