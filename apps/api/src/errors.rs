use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    /// The uploaded bytes are not a valid PDF or carry no extractable text
    /// layer. Terminal for that document; never retried.
    #[error("Unreadable document: {0}")]
    UnreadableDocument(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The record store cannot be reached. The caller may retry the whole
    /// operation.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Entity extraction error: {0}")]
    Ner(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::UnreadableDocument(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNREADABLE_DOCUMENT",
                msg.clone(),
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::InvalidFilter(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_FILTER", msg.clone())
            }
            AppError::UnknownField(msg) => (StatusCode::BAD_REQUEST, "UNKNOWN_FIELD", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::StorageUnavailable(msg) => {
                tracing::error!("Storage unavailable: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "STORAGE_UNAVAILABLE",
                    "The record store is unreachable".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Ner(msg) => {
                tracing::error!("Entity extraction error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "NER_ERROR",
                    "An entity extraction error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
