//! Error types for the todo service.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::warn;

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Request error: {0}")]
    Request(#[from] RequestError),
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("failed to scan data from sql: {0}")]
    Decode(String),
}

impl DatabaseError {
    /// Classify a libSQL error raised by a write, surfacing CHECK / NOT NULL
    /// failures as constraint violations.
    pub fn from_write(context: &str, err: libsql::Error) -> Self {
        let message = format!("{context}: {err}");
        if message.contains("constraint failed") {
            Self::Constraint(message)
        } else {
            Self::Query(message)
        }
    }
}

/// Errors in what the client sent: path, query string, or body.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("invalid item id {raw:?}: {reason}")]
    InvalidId { raw: String, reason: String },

    #[error("{0}")]
    InvalidBody(String),

    #[error("{0}")]
    InvalidQuery(String),
}

impl From<JsonRejection> for RequestError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection.body_text())
    }
}

impl From<QueryRejection> for RequestError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidQuery(rejection.body_text())
    }
}

/// Status label decode failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StatusError {
    #[error("invalid status string: {0:?}")]
    InvalidStatus(String),
}

/// Error returned from HTTP handlers.
///
/// Every failure is answered with `400 Bad Request` and `{"error": <message>}`,
/// whether it came from the request itself or from storage.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        Self(err.into())
    }
}

impl From<RequestError> for ApiError {
    fn from(err: RequestError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self.0 {
            Error::Database(e) => e.to_string(),
            Error::Request(e) => e.to_string(),
        };
        warn!(error = %message, "Request failed");
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": message })),
        )
            .into_response()
    }
}
