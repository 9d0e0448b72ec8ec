//! Uniform response envelope returned by every service operation

use serde::Serialize;

use crate::error::{AppError, AppResult, ErrorKind};

pub const DEFAULT_SUCCESS_MESSAGE: &str = "Operation completed successfully";

/// Response envelope: `success`, `message`, optional `data`, and detail `errors`.
///
/// Failures also carry an [`ErrorKind`] that is not serialized; the API layer
/// uses it to choose the status code.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub errors: Vec<String>,
    #[serde(skip)]
    kind: Option<ErrorKind>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self::success_with_message(data, DEFAULT_SUCCESS_MESSAGE)
    }

    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            errors: Vec::new(),
            kind: None,
        }
    }

    pub fn error(kind: ErrorKind, message: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            errors,
            kind: Some(kind),
        }
    }

    /// Build a failure envelope; system errors get `fallback` as their message.
    pub fn from_error(error: AppError, fallback: &str) -> Self {
        let (kind, message, errors) = error.into_parts(fallback);
        Self::error(kind, message, errors)
    }

    /// Normalize a service outcome into an envelope.
    pub fn from_result(result: AppResult<T>, success_message: &str, failure_message: &str) -> Self {
        match result {
            Ok(data) => Self::success_with_message(data, success_message),
            Err(e) => {
                if e.kind() != ErrorKind::Internal {
                    tracing::warn!("{}", e);
                }
                Self::from_error(e, failure_message)
            }
        }
    }

    /// Failure category, `None` on success
    pub fn kind(&self) -> Option<ErrorKind> {
        self.kind
    }
}
