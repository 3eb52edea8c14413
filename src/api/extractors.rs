//! Request body extraction.

use crate::api::error::AppError;
use axum::{Json, extract::rejection::JsonRejection};

/// Unwraps a JSON body, turning malformed input into a 400.
///
/// Handlers take `Result<Json<T>, JsonRejection>` and call this first.
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}
