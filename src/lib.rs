//! Todo API Library
//!
//! Core of the todo tracking service: the domain model, the store adapters,
//! the service rules and the HTTP layer.

pub mod api;
pub mod domain;
pub mod infrastructure;
pub mod service;
