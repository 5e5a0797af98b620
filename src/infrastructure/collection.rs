//! Collection addressing.
//!
//! A collection is a named set of documents inside a named database. Each
//! backend maps the pair onto its own namespace: a schema-qualified table
//! in `PostgreSQL`, a key prefix in Redis.

use thiserror::Error;

/// Default database name.
pub const DEFAULT_DATABASE: &str = "todo_db";

/// Default collection name.
pub const DEFAULT_COLLECTION: &str = "todos";

/// Errors raised when a database or collection name is unusable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CollectionNameError {
    #[error("Invalid database name: '{0}'. Expected letters, digits or '_', not starting with a digit")]
    InvalidDatabase(String),

    #[error("Invalid collection name: '{0}'. Expected letters, digits or '_', not starting with a digit")]
    InvalidCollection(String),
}

/// A validated database/collection pair.
///
/// Both names are plain identifiers (`[A-Za-z_][A-Za-z0-9_]*`, at most 63
/// bytes), which keeps them safe to splice into SQL and Redis keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    database: String,
    name: String,
}

impl Collection {
    /// Creates a collection address.
    ///
    /// # Errors
    ///
    /// Returns `CollectionNameError` if either name is not a plain identifier.
    pub fn new(
        database: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, CollectionNameError> {
        let database = database.into();
        let name = name.into();

        if !is_identifier(&database) {
            return Err(CollectionNameError::InvalidDatabase(database));
        }
        if !is_identifier(&name) {
            return Err(CollectionNameError::InvalidCollection(name));
        }

        Ok(Self { database, name })
    }

    #[must_use]
    pub fn database(&self) -> &str {
        &self.database
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the quoted, schema-qualified SQL table name.
    #[must_use]
    pub fn qualified_table(&self) -> String {
        format!("\"{}\".\"{}\"", self.database, self.name)
    }

    /// Returns the Redis key prefix shared by every key of this collection.
    #[must_use]
    pub fn key_prefix(&self) -> String {
        format!("{}:{}:", self.database, self.name)
    }
}

impl Default for Collection {
    fn default() -> Self {
        Self {
            database: DEFAULT_DATABASE.to_string(),
            name: DEFAULT_COLLECTION.to_string(),
        }
    }
}

fn is_identifier(value: &str) -> bool {
    let mut characters = value.chars();
    let Some(first) = characters.next() else {
        return false;
    };

    value.len() <= 63
        && (first.is_ascii_alphabetic() || first == '_')
        && characters.all(|character| character.is_ascii_alphanumeric() || character == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_default_collection() {
        let collection = Collection::default();
        assert_eq!(collection.database(), "todo_db");
        assert_eq!(collection.name(), "todos");
        assert_eq!(collection.qualified_table(), "\"todo_db\".\"todos\"");
        assert_eq!(collection.key_prefix(), "todo_db:todos:");
    }

    #[rstest]
    #[case("TodoDb", "Todos")]
    #[case("_private", "items_2")]
    fn test_valid_names(#[case] database: &str, #[case] name: &str) {
        assert!(Collection::new(database, name).is_ok());
    }

    #[rstest]
    #[case("", "todos")]
    #[case("1db", "todos")]
    #[case("todo-db", "todos")]
    #[case("todo\"db", "todos")]
    fn test_invalid_database(#[case] database: &str, #[case] name: &str) {
        assert_eq!(
            Collection::new(database, name),
            Err(CollectionNameError::InvalidDatabase(database.to_string()))
        );
    }

    #[rstest]
    fn test_invalid_collection() {
        assert_eq!(
            Collection::new("todo_db", "todos; DROP TABLE x"),
            Err(CollectionNameError::InvalidCollection(
                "todos; DROP TABLE x".to_string()
            ))
        );
    }

    #[rstest]
    fn test_name_too_long() {
        let name = "a".repeat(64);
        assert!(Collection::new("todo_db", name).is_err());
    }
}
