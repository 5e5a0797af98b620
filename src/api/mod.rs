//! API module for HTTP handlers.
//!
//! This module contains route definitions and request/response handlers.

pub mod dto;
pub mod error;
pub mod handlers;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use dto::{ApiResponse, CreateTodoRequest, TodoResponse, UpdateTodoRequest};
pub use error::{ApiErrorResponse, ValidationError};
pub use handlers::{
    AppState, HealthResponse, create_todo, delete_todo, get_todo, health_check, list_todos,
    update_todo,
};

// =============================================================================
// Router Creation
// =============================================================================

/// Creates the application router with all routes and middleware.
///
/// ```ignore
/// let state = AppState::new(repository);
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
/// axum::serve(listener, create_router(state)).await?;
/// ```
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/todo", get(list_todos).post(create_todo))
        .route(
            "/api/todo/{id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .layer(TraceLayer::new_for_http())
        .layer(create_cors_layer())
        .with_state(state)
}

/// Allows any origin; the browser client is served from a different origin.
fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}
