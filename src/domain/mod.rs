//! Domain module for todo tracking.
//!
//! This module contains the todo record, its value objects and the
//! partial-update model.

pub mod patch;
pub mod todo;

pub use patch::{Patch, TodoPatch};
pub use todo::{NewTodo, Timestamp, TimestampError, Todo, TodoDraft, TodoId};
