//! API error handling.
//!
//! This module turns failures into HTTP statuses wrapped in the response
//! envelope. Lower layers never format responses themselves.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use super::dto::ApiResponse;
use crate::infrastructure::RepositoryError;

/// Message returned when no record matches the requested id.
pub const NOT_FOUND_MESSAGE: &str = "Todo not found";

// =============================================================================
// API Error Response
// =============================================================================

/// API error response containing status code and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiErrorResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Message placed in the envelope.
    pub message: String,
}

impl ApiErrorResponse {
    /// Creates a new API error response.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Creates a 400 Bad Request response.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Creates a 404 Not Found response.
    #[must_use]
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE)
    }

    /// Creates a 500 Internal Server Error response.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::<()>::fail(self.message))).into_response()
    }
}

impl From<RepositoryError> for ApiErrorResponse {
    fn from(error: RepositoryError) -> Self {
        tracing::error!(%error, "repository operation failed");
        Self::internal_error(format!("Internal server error: {error}"))
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Client input that cannot be accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The name is missing or blank.
    #[error("Todo name is required")]
    NameRequired,

    /// The body is not valid JSON or has the wrong shape.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
}

impl From<JsonRejection> for ValidationError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection.body_text())
    }
}

impl From<ValidationError> for ApiErrorResponse {
    fn from(error: ValidationError) -> Self {
        tracing::debug!(%error, "request rejected");
        Self::bad_request(error.to_string())
    }
}

/// Checks that a name is present and not blank.
///
/// The name is returned as supplied, without trimming.
///
/// # Errors
///
/// Returns `ValidationError::NameRequired` if the name is absent or
/// whitespace only.
pub fn validate_name(name: Option<String>) -> Result<String, ValidationError> {
    name.filter(|name| !name.trim().is_empty())
        .ok_or(ValidationError::NameRequired)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use rstest::rstest;

    #[rstest]
    #[case(Some("Buy milk"), Ok("Buy milk"))]
    #[case(Some("  padded  "), Ok("  padded  "))]
    #[case(Some(""), Err(ValidationError::NameRequired))]
    #[case(Some(" \t\n"), Err(ValidationError::NameRequired))]
    #[case(None, Err(ValidationError::NameRequired))]
    fn test_validate_name(
        #[case] input: Option<&str>,
        #[case] expected: Result<&str, ValidationError>,
    ) {
        let result = validate_name(input.map(str::to_string));
        assert_eq!(result, expected.map(str::to_string));
    }

    #[rstest]
    fn test_repository_error_maps_to_internal_error() {
        let response =
            ApiErrorResponse::from(RepositoryError::ConnectionError("refused".to_string()));

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.message,
            "Internal server error: Connection error: refused"
        );
    }

    #[rstest]
    fn test_validation_error_maps_to_bad_request() {
        let response = ApiErrorResponse::from(ValidationError::NameRequired);

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.message, "Todo name is required");
    }

    #[rstest]
    #[tokio::test]
    async fn test_into_response_writes_envelope() {
        let response = ApiErrorResponse::not_found().into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(value["success"], false);
        assert_eq!(value["message"], "Todo not found");
        assert_eq!(value["data"], serde_json::Value::Null);
    }
}
