//! Mapping between [`Todo`] and its stored document.
//!
//! Documents are JSON objects shaped like this:
//!
//! ```json
//! {
//!   "_id": "0190c5a8-7d1e-7b3a-9c1f-5e2d4a6b8c0d",
//!   "Name": "Buy milk",
//!   "Description": "",
//!   "IsComplete": false,
//!   "AllocationTime": null,
//!   "CreatedAt": "2024-06-01T10:00:00Z",
//!   "UpdatedAt": "2024-06-01T10:00:00Z"
//! }
//! ```
//!
//! The identifier lives under `_id`; every backend reads and writes the
//! same shape.

use serde_json::{Map, Value, json};

use crate::domain::{Timestamp, Todo, TodoId};
use crate::infrastructure::RepositoryError;

// =============================================================================
// Field Names
// =============================================================================

pub const ID_FIELD: &str = "_id";
pub const NAME_FIELD: &str = "Name";
pub const DESCRIPTION_FIELD: &str = "Description";
pub const IS_COMPLETE_FIELD: &str = "IsComplete";
pub const ALLOCATION_TIME_FIELD: &str = "AllocationTime";
pub const CREATED_AT_FIELD: &str = "CreatedAt";
pub const UPDATED_AT_FIELD: &str = "UpdatedAt";

// =============================================================================
// Encoding
// =============================================================================

/// Encodes a full record.
#[must_use]
pub fn to_document(todo: &Todo) -> Value {
    let mut document = mutable_fields_document(todo);
    if let Value::Object(fields) = &mut document {
        fields.insert(ID_FIELD.to_string(), json!(todo.todo_id.to_string()));
        fields.insert(
            CREATED_AT_FIELD.to_string(),
            json!(todo.created_at.to_rfc3339()),
        );
    }
    document
}

/// Encodes only the fields an update may overwrite.
///
/// Merging this object into a stored document leaves `_id` and
/// `CreatedAt` intact.
#[must_use]
pub fn mutable_fields_document(todo: &Todo) -> Value {
    json!({
        NAME_FIELD: todo.name,
        DESCRIPTION_FIELD: todo.description,
        IS_COMPLETE_FIELD: todo.is_complete,
        ALLOCATION_TIME_FIELD: todo.allocation_time.map(|time| time.to_rfc3339()),
        UPDATED_AT_FIELD: todo.updated_at.to_rfc3339(),
    })
}

// =============================================================================
// Decoding
// =============================================================================

/// Decodes a stored document.
///
/// `Description`, `IsComplete` and `AllocationTime` fall back to their
/// defaults when absent; every other field is required.
///
/// # Errors
///
/// Returns `RepositoryError::SerializationError` if the value is not an
/// object, a required field is missing, or a field has the wrong type.
pub fn from_document(document: &Value) -> Result<Todo, RepositoryError> {
    let fields = document
        .as_object()
        .ok_or_else(|| decode_error("document is not an object"))?;

    let raw_id = required_str(fields, ID_FIELD)?;
    let todo_id = TodoId::parse(raw_id)
        .map_err(|error| decode_error(format!("invalid `{ID_FIELD}` {raw_id:?}: {error}")))?;

    let allocation_time = match fields.get(ALLOCATION_TIME_FIELD) {
        None | Some(Value::Null) => None,
        Some(Value::String(value)) => Some(parse_timestamp(ALLOCATION_TIME_FIELD, value)?),
        Some(_) => return Err(wrong_type(ALLOCATION_TIME_FIELD, "a string or null")),
    };

    let description = match fields.get(DESCRIPTION_FIELD) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(value)) => value.clone(),
        Some(_) => return Err(wrong_type(DESCRIPTION_FIELD, "a string")),
    };

    let is_complete = match fields.get(IS_COMPLETE_FIELD) {
        None | Some(Value::Null) => false,
        Some(Value::Bool(value)) => *value,
        Some(_) => return Err(wrong_type(IS_COMPLETE_FIELD, "a boolean")),
    };

    Ok(Todo {
        todo_id,
        name: required_str(fields, NAME_FIELD)?.to_string(),
        description,
        is_complete,
        allocation_time,
        created_at: parse_timestamp(CREATED_AT_FIELD, required_str(fields, CREATED_AT_FIELD)?)?,
        updated_at: parse_timestamp(UPDATED_AT_FIELD, required_str(fields, UPDATED_AT_FIELD)?)?,
    })
}

fn required_str<'a>(fields: &'a Map<String, Value>, field: &str) -> Result<&'a str, RepositoryError> {
    match fields.get(field) {
        Some(Value::String(value)) => Ok(value),
        None | Some(Value::Null) => Err(decode_error(format!("missing field `{field}`"))),
        Some(_) => Err(wrong_type(field, "a string")),
    }
}

fn parse_timestamp(field: &str, value: &str) -> Result<Timestamp, RepositoryError> {
    Timestamp::parse_rfc3339(value)
        .map_err(|error| decode_error(format!("invalid `{field}` {value:?}: {error}")))
}

fn wrong_type(field: &str, expected: &str) -> RepositoryError {
    decode_error(format!("field `{field}` must be {expected}"))
}

fn decode_error(message: impl Into<String>) -> RepositoryError {
    RepositoryError::SerializationError(message.into())
}

// =============================================================================
// Tests
// =============================================================================
