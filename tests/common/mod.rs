//! Common test helpers for integration tests.
//!
//! This module builds an in-memory application and drives it through the
//! router with `tower::ServiceExt::oneshot`.
//!
//! # Note
//!
//! Each integration test file is compiled as a separate crate, so helpers
//! used by only one of them would otherwise trigger dead code warnings.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use todo_api::api::{AppState, create_router};
use todo_api::infrastructure::{InMemoryTodoRepository, TodoRepository};

// =============================================================================
// Application Helpers
// =============================================================================

/// Creates a router over a fresh in-memory repository.
pub fn create_test_app() -> Router {
    create_test_app_with(Arc::new(InMemoryTodoRepository::new()))
}

/// Creates a router over the given repository.
pub fn create_test_app_with(repository: Arc<dyn TodoRepository>) -> Router {
    create_router(AppState::new(repository))
}

// =============================================================================
// Request Helpers
// =============================================================================

/// A response with its body decoded as JSON.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// Returns the `data` member of the envelope.
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// Returns the `message` member of the envelope.
    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }

    /// Returns the `success` member of the envelope.
    pub fn success(&self) -> bool {
        self.body["success"].as_bool().unwrap_or_default()
    }
}

/// Sends a request with an optional raw body and decodes the JSON response.
pub async fn send_raw(app: &Router, method: Method, uri: &str, body: Option<&str>) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(text) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(text.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    TestResponse {
        status,
        headers,
        body,
    }
}

/// Sends a request with a JSON body.
pub async fn send_json(app: &Router, method: Method, uri: &str, body: &Value) -> TestResponse {
    send_raw(app, method, uri, Some(&body.to_string())).await
}

pub async fn get(app: &Router, uri: &str) -> TestResponse {
    send_raw(app, Method::GET, uri, None).await
}

pub async fn delete(app: &Router, uri: &str) -> TestResponse {
    send_raw(app, Method::DELETE, uri, None).await
}

/// Creates a todo and returns its id.
pub async fn create_todo(app: &Router, body: &Value) -> String {
    let response = send_json(app, Method::POST, "/api/todo", body).await;
    assert_eq!(response.status, StatusCode::CREATED);

    response.data()["id"].as_str().unwrap().to_string()
}
