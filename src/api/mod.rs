//! HTTP interface - JSON API under `/api` plus an unauthenticated liveness probe.

pub mod error;
pub mod extractors;
pub mod routes;

use crate::config::AppConfig;
use axum::{Router, routing::get};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: DatabaseConnection,
    /// Resolved configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Builds state from a connection and configuration.
    pub fn new(db: DatabaseConnection, config: AppConfig) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }
}

/// Body returned by mutating endpoints.
#[derive(Debug, Serialize)]
pub struct Ack {
    /// Always true; failures are reported through [`error::AppError`]
    pub success: bool,
    /// Id of the created row, for create endpoints
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Activity-log failures that did not abort the write
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Ack {
    /// Acknowledges a created row.
    pub const fn created(id: i64, warnings: Vec<String>) -> Self {
        Self {
            success: true,
            id: Some(id),
            warnings,
        }
    }

    /// Acknowledges an update or delete.
    pub const fn done(warnings: Vec<String>) -> Self {
        Self {
            success: true,
            id: None,
            warnings,
        }
    }
}

/// Assembles the full application router.
pub fn app(state: AppState) -> Router {
    let api = routes::router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    Router::new()
        .route("/health", get(routes::stats::health))
        .nest("/api", api)
}
