//! Sub-event (phase) routes.

use crate::api::{Ack, AppState, error::AppError, extractors::extract_json};
use crate::core::sub_event::{self, NewSubEvent, PhaseFields};
use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    routing::{post, put},
};

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/sub-events", post(create_sub_event))
        .route(
            "/sub-events/:id",
            put(update_sub_event).delete(delete_sub_event),
        )
}

async fn create_sub_event(
    State(state): State<AppState>,
    body: Result<Json<NewSubEvent>, JsonRejection>,
) -> Result<Json<Ack>, AppError> {
    let req = extract_json(body)?;
    let created = sub_event::create_sub_event(&state.db, req).await?;
    Ok(Json(Ack::created(created.value.sub_event.id, created.warnings)))
}

async fn update_sub_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Result<Json<PhaseFields>, JsonRejection>,
) -> Result<Json<Ack>, AppError> {
    let req = extract_json(body)?;
    let updated = sub_event::update_sub_event(&state.db, id, req).await?;
    Ok(Json(Ack::done(updated.warnings)))
}

async fn delete_sub_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Ack>, AppError> {
    let deleted = sub_event::delete_sub_event(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Sub-event", id))?;
    Ok(Json(Ack::done(deleted.warnings)))
}
