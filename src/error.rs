//! Error types for the equipment server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::response::ApiResponse;

/// Postgres SQLSTATE for unique constraint violations
const UNIQUE_VIOLATION: &str = "23505";

/// Failure category carried by every error envelope.
///
/// The API layer picks the HTTP status from this tag and never inspects
/// message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or out-of-range request
    Validation,
    /// Expected, named rule violation (duplicate serial, dangling reference)
    BusinessRule,
    /// Requested record does not exist
    NotFound,
    /// Store failure or any other unexpected fault
    Internal,
}

impl ErrorKind {
    pub fn status_code(self) -> StatusCode {
        match self {
            ErrorKind::Validation | ErrorKind::BusinessRule => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {message}")]
    Validation { message: String, errors: Vec<String> },

    #[error("Business rule violation: {message}")]
    BusinessRule { message: String, errors: Vec<String> },

    #[error("Not found: {message}")]
    NotFound { message: String, errors: Vec<String> },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>, detail: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
            errors: vec![detail.into()],
        }
    }

    pub fn business_rule(message: impl Into<String>, detail: impl Into<String>) -> Self {
        AppError::BusinessRule {
            message: message.into(),
            errors: vec![detail.into()],
        }
    }

    pub fn not_found(message: impl Into<String>, detail: impl Into<String>) -> Self {
        AppError::NotFound {
            message: message.into(),
            errors: vec![detail.into()],
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation { .. } => ErrorKind::Validation,
            AppError::BusinessRule { .. } => ErrorKind::BusinessRule,
            AppError::NotFound { .. } => ErrorKind::NotFound,
            AppError::Database(_) | AppError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether this is a unique-constraint violation raised by the store
    pub fn is_unique_violation(&self) -> bool {
        match self {
            AppError::Database(sqlx::Error::Database(db)) => {
                db.code().as_deref() == Some(UNIQUE_VIOLATION)
            }
            _ => false,
        }
    }

    /// Split into envelope message and detail list.
    ///
    /// System failures are logged here and replaced by `fallback`, so store
    /// internals never reach the client.
    pub fn into_parts(self, fallback: &str) -> (ErrorKind, String, Vec<String>) {
        let kind = self.kind();
        match self {
            AppError::Validation { message, errors }
            | AppError::BusinessRule { message, errors }
            | AppError::NotFound { message, errors } => (kind, message, errors),
            AppError::Database(e) => {
                tracing::error!("{}: database error: {:?}", fallback, e);
                (kind, fallback.to_string(), vec!["Database error".to_string()])
            }
            AppError::Internal(msg) => {
                tracing::error!("{}: {}", fallback, msg);
                (kind, fallback.to_string(), vec!["Internal server error".to_string()])
            }
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .map(|err| match &err.message {
                Some(message) => message.to_string(),
                None => err.code.to_string(),
            })
            .collect();
        messages.sort();
        AppError::Validation {
            message: "Validation failed".to_string(),
            errors: messages,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let envelope: ApiResponse<()> = ApiResponse::from_error(self, "An unexpected error occurred");
        let status = envelope
            .kind()
            .map(ErrorKind::status_code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(envelope)).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
