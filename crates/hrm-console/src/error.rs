//! Console Error Types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use hrm_directory::{DirectoryError, ReconcileError};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Path segment is neither `employee` nor `group`
    #[error("Invalid name")]
    InvalidKind,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ConsoleError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ConsoleError::Validation { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ConsoleError::InvalidKind => (StatusCode::BAD_REQUEST, "INVALID_NAME"),
            ConsoleError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            ConsoleError::Unauthorized { .. } => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ConsoleError::Directory(source) => directory_status(source),
            ConsoleError::Reconcile(ReconcileError::EmptyPrincipal) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            ConsoleError::Reconcile(ReconcileError::Lookup { source, .. }) => {
                directory_status(source)
            }
            ConsoleError::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

/// A directory 404 is the caller's problem; anything else is upstream.
fn directory_status(source: &DirectoryError) -> (StatusCode, &'static str) {
    match source.http_status() {
        Some(404) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        _ => (StatusCode::BAD_GATEWAY, "DIRECTORY_ERROR"),
    }
}

pub type Result<T> = std::result::Result<T, ConsoleError>;

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for ConsoleError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status_and_code();

        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        let body = ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ConsoleError::validation("x"), StatusCode::BAD_REQUEST),
            (ConsoleError::InvalidKind, StatusCode::BAD_REQUEST),
            (ConsoleError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (
                ConsoleError::Directory(DirectoryError::status(500, "boom")),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ConsoleError::Directory(DirectoryError::not_found("User", "u1")),
                StatusCode::NOT_FOUND,
            ),
            (ConsoleError::internal("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_directory_404_status_is_not_found() {
        let lookup = ConsoleError::Reconcile(ReconcileError::Lookup {
            principal: "00u1".to_string(),
            source: DirectoryError::status(404, "Not found: Resource not found: 00u1 (User)"),
        });
        assert_eq!(lookup.into_response().status(), StatusCode::NOT_FOUND);

        let delete = ConsoleError::Directory(DirectoryError::status(404, ""));
        assert_eq!(delete.into_response().status(), StatusCode::NOT_FOUND);

        let outage = ConsoleError::Reconcile(ReconcileError::Lookup {
            principal: "00u1".to_string(),
            source: DirectoryError::status(503, "unavailable"),
        });
        assert_eq!(outage.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_invalid_kind_message() {
        assert_eq!(ConsoleError::InvalidKind.to_string(), "Invalid name");
        assert_eq!(ConsoleError::InvalidCredentials.to_string(), "Invalid credentials");
    }
}
