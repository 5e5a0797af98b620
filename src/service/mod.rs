//! Service layer.
//!
//! Business rules that sit between the HTTP handlers and the store.

pub mod todo_service;

pub use todo_service::{TodoService, apply_patch, build_todo};
