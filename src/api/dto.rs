//! Data Transfer Objects for API requests and responses.
//!
//! This module contains DTOs that are separate from domain models,
//! providing a clean API contract. Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};

use crate::domain::{NewTodo, Patch, Timestamp, Todo, TodoPatch};

// =============================================================================
// Response Envelope
// =============================================================================

/// Envelope wrapping every response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
    /// Payload, `null` on failure.
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Creates a successful envelope carrying `data`.
    #[must_use]
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Creates a failed envelope without data.
    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

// =============================================================================
// Todo DTOs
// =============================================================================

/// Request DTO for creating a todo.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    /// Name of the todo. A missing or `null` name is treated as blank.
    #[serde(default)]
    pub name: Option<String>,
    /// Optional description, empty when omitted.
    #[serde(default)]
    pub description: Option<String>,
    /// Optional planned time.
    #[serde(default)]
    pub allocation_time: Option<Timestamp>,
}

impl CreateTodoRequest {
    /// Converts the request into service input once the name is known to be valid.
    #[must_use]
    pub fn into_new_todo(self, name: String) -> NewTodo {
        NewTodo {
            name,
            description: self.description,
            allocation_time: self.allocation_time,
        }
    }
}

/// Request DTO for a partial update.
///
/// Omitted fields are left unchanged. `null` clears `allocationTime` and is
/// ignored for the other fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoRequest {
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default)]
    pub is_complete: Patch<bool>,
    #[serde(default)]
    pub allocation_time: Patch<Timestamp>,
}

impl From<UpdateTodoRequest> for TodoPatch {
    fn from(request: UpdateTodoRequest) -> Self {
        Self {
            name: request.name,
            description: request.description,
            is_complete: request.is_complete,
            allocation_time: request.allocation_time,
        }
    }
}

/// Response DTO for a todo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoResponse {
    /// Todo ID.
    pub id: String,
    pub name: String,
    pub description: String,
    pub is_complete: bool,
    /// Planned time, `null` when unset.
    pub allocation_time: Option<String>,
    /// Creation timestamp (RFC 3339, UTC).
    pub created_at: String,
    /// Last update timestamp (RFC 3339, UTC).
    pub updated_at: String,
}

impl From<&Todo> for TodoResponse {
    fn from(todo: &Todo) -> Self {
        Self {
            id: todo.todo_id.to_string(),
            name: todo.name.clone(),
            description: todo.description.clone(),
            is_complete: todo.is_complete,
            allocation_time: todo.allocation_time.map(|time| time.to_rfc3339()),
            created_at: todo.created_at.to_rfc3339(),
            updated_at: todo.updated_at.to_rfc3339(),
        }
    }
}

impl From<Todo> for TodoResponse {
    fn from(todo: Todo) -> Self {
        Self::from(&todo)
    }
}

// =============================================================================
// Tests
// =============================================================================
