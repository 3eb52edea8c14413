//! `POST /auth` - admin login.

use crate::api::{AppState, error::AppError, extractors::extract_json};
use crate::core::auth;
use axum::{Json, Router, extract::State, extract::rejection::JsonRejection, routing::post};
use serde::{Deserialize, Serialize};

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Submitted password
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Always true
    pub success: bool,
    /// Session token for the UI
    pub token: String,
}

pub(super) fn router() -> Router<AppState> {
    Router::new().route("/auth", post(login))
}

async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let req = extract_json(body)?;
    let token = auth::login(
        &req.password,
        &state.config.admin_password,
        &state.config.session_token,
    )?;
    Ok(Json(LoginResponse {
        success: true,
        token,
    }))
}
