//! Dashboard, activity feed and health routes.

use crate::api::{AppState, error::AppError};
use crate::core::{activity, dashboard};
use crate::entities::ActivityLogModel;
use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;

/// Upper bound on `GET /logs?limit=`.
const MAX_LOG_LIMIT: u64 = 500;

/// Query string of `GET /logs`.
#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    /// Number of entries; defaults to the configured feed size
    pub limit: Option<u64>,
}

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(stats))
        .route("/logs", get(logs))
        .route("/health", get(health))
}

async fn stats(State(state): State<AppState>) -> Result<Json<dashboard::DashboardStats>, AppError> {
    let stats =
        dashboard::get_dashboard_stats(&state.db, state.config.recent_activity_limit).await?;
    Ok(Json(stats))
}

async fn logs(
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> Result<Json<Vec<ActivityLogModel>>, AppError> {
    let limit = query
        .limit
        .unwrap_or(state.config.recent_activity_limit)
        .clamp(1, MAX_LOG_LIMIT);
    Ok(Json(activity::list_recent(&state.db, limit).await?))
}

/// Liveness probe.
pub(crate) async fn health() -> &'static str {
    "ok"
}
