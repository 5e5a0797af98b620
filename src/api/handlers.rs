//! HTTP handlers for the todo API.
//!
//! Each handler delegates to [`TodoService`] and wraps the outcome in the
//! response envelope.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
};
use serde::Serialize;

use super::dto::{ApiResponse, CreateTodoRequest, TodoResponse, UpdateTodoRequest};
use super::error::{ApiErrorResponse, ValidationError, validate_name};
use crate::domain::TodoId;
use crate::infrastructure::TodoRepository;
use crate::service::TodoService;

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiErrorResponse>;

// =============================================================================
// Application State
// =============================================================================

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Business operations over the configured store.
    pub service: TodoService,
}

impl AppState {
    /// Creates state over an initialized repository.
    #[must_use]
    pub fn new(repository: Arc<dyn TodoRepository>) -> Self {
        Self {
            service: TodoService::new(repository),
        }
    }
}

/// Parses a path identifier.
///
/// A malformed identifier cannot name a stored record, so it is reported
/// as not found.
fn parse_todo_id(raw: &str) -> Result<TodoId, ApiErrorResponse> {
    TodoId::parse(raw).map_err(|error| {
        tracing::debug!(todo_id = raw, %error, "malformed todo id");
        ApiErrorResponse::not_found()
    })
}

// =============================================================================
// Todo Handlers
// =============================================================================

/// GET /api/todo - List every todo.
///
/// # Errors
///
/// Returns 500 if the store fails.
pub async fn list_todos(State(state): State<AppState>) -> ApiResult<Vec<TodoResponse>> {
    let todos = state.service.list_all().await?;
    let responses = todos.iter().map(TodoResponse::from).collect();

    Ok(Json(ApiResponse::ok("Todos retrieved successfully", responses)))
}

/// GET /api/todo/{id} - Fetch one todo.
///
/// # Errors
///
/// Returns 404 if no todo has the id, 500 if the store fails.
pub async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<TodoResponse> {
    let todo_id = parse_todo_id(&id)?;
    let todo = state
        .service
        .get_by_id(&todo_id)
        .await?
        .ok_or_else(ApiErrorResponse::not_found)?;

    Ok(Json(ApiResponse::ok(
        "Todo retrieved successfully",
        TodoResponse::from(todo),
    )))
}

/// POST /api/todo - Create a todo.
///
/// # Request Body
///
/// ```json
/// {
///   "name": "Buy milk",
///   "description": "Optional description",
///   "allocationTime": "2024-06-01T10:00:00Z"
/// }
/// ```
///
/// # Response
///
/// - **201 Created**: with `Location: /api/todo/{id}`
/// - **400 Bad Request**: blank name or unreadable body
/// - **500 Internal Server Error**: store failure
///
/// # Errors
///
/// See the response list above.
pub async fn create_todo(
    State(state): State<AppState>,
    payload: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> Result<
    (
        StatusCode,
        [(header::HeaderName, String); 1],
        Json<ApiResponse<TodoResponse>>,
    ),
    ApiErrorResponse,
> {
    let Json(mut request) = payload.map_err(ValidationError::from)?;
    let name = validate_name(request.name.take())?;

    let todo = state.service.create(request.into_new_todo(name)).await?;
    let location = format!("/api/todo/{}", todo.todo_id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(ApiResponse::ok(
            "Todo created successfully",
            TodoResponse::from(todo),
        )),
    ))
}

/// PUT /api/todo/{id} - Partially update a todo.
///
/// Only the supplied fields change. The response carries the record as
/// re-read after the update.
///
/// # Errors
///
/// Returns 404 if no todo has the id (or it vanished before the re-read),
/// 400 for an unreadable body, 500 if the store fails.
pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTodoRequest>, JsonRejection>,
) -> ApiResult<TodoResponse> {
    let todo_id = parse_todo_id(&id)?;
    let Json(request) = payload.map_err(ValidationError::from)?;

    if !state.service.update(&todo_id, request.into()).await? {
        return Err(ApiErrorResponse::not_found());
    }

    let todo = state
        .service
        .get_by_id(&todo_id)
        .await?
        .ok_or_else(ApiErrorResponse::not_found)?;

    Ok(Json(ApiResponse::ok(
        "Todo updated successfully",
        TodoResponse::from(todo),
    )))
}

/// DELETE /api/todo/{id} - Delete a todo.
///
/// # Errors
///
/// Returns 404 if no todo has the id, 500 if the store fails.
pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<bool> {
    let todo_id = parse_todo_id(&id)?;

    if !state.service.delete(&todo_id).await? {
        return Err(ApiErrorResponse::not_found());
    }

    Ok(Json(ApiResponse::ok("Todo deleted successfully", true)))
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
}

/// GET /health - Health check endpoint.
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// =============================================================================
// Tests
// =============================================================================
