//! HTTP error type.
//!
//! Maps [`crate::errors::Error`] to status codes and a JSON body of the form
//! `{"error": {"code": "NOT_FOUND", "message": "..."}}`. Internal error details are logged,
//! never returned.

use crate::errors::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// The error
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code, e.g. `NOT_FOUND`
    pub code: String,
    /// Human-readable message
    pub message: String,
}

/// Error returned by every handler.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Business rule violated (422)
    #[error("{0}")]
    Validation(String),

    /// Body could not be parsed (400)
    #[error("{0}")]
    BadRequest(String),

    /// Wrong password (401)
    #[error("{0}")]
    Unauthorized(String),

    /// Conflicts with current state (409)
    #[error("{0}")]
    Conflict(String),

    /// Anything else (500). Logged, not returned.
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    /// 404 for an entity that does not exist.
    pub fn not_found(entity: &str, id: i64) -> Self {
        Self::NotFound(format!("{entity} {id} not found"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = if let Self::Internal(detail) = &self {
            tracing::error!(error = %detail, "internal server error");
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound { .. } => Self::NotFound(err.to_string()),
            Error::Validation { message } => Self::Validation(message),
            Error::InvalidAmount { .. } => Self::Validation(err.to_string()),
            Error::Conflict { message } => Self::Conflict(message),
            Error::Unauthorized => Self::Unauthorized(err.to_string()),
            Error::Config { .. }
            | Error::Report { .. }
            | Error::Database(_)
            | Error::Io(_)
            | Error::EnvVar(_) => Self::Internal(err.to_string()),
        }
    }
}
