//! Event routes, including the PDF report.

use crate::api::{Ack, AppState, error::AppError, extractors::extract_json};
use crate::core::{
    event::{self, EventChanges, EventDetail, EventSummary, NewEvent},
    report,
};
use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route(
            "/events/:id",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/events/:id/pdf", get(event_pdf))
}

async fn list_events(State(state): State<AppState>) -> Result<Json<Vec<EventSummary>>, AppError> {
    Ok(Json(event::get_all_events(&state.db).await?))
}

async fn create_event(
    State(state): State<AppState>,
    body: Result<Json<NewEvent>, JsonRejection>,
) -> Result<Json<Ack>, AppError> {
    let req = extract_json(body)?;
    let created = event::create_event(&state.db, req).await?;
    Ok(Json(Ack::created(created.value.event.id, created.warnings)))
}

async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<EventDetail>, AppError> {
    Ok(Json(event::get_event_detail(&state.db, id).await?))
}

async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Result<Json<EventChanges>, JsonRejection>,
) -> Result<Json<Ack>, AppError> {
    let req = extract_json(body)?;
    let updated = event::update_event(&state.db, id, req).await?;
    Ok(Json(Ack::done(updated.warnings)))
}

async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Ack>, AppError> {
    let deleted = event::delete_event(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Event", id))?;
    Ok(Json(Ack::done(deleted.warnings)))
}

async fn event_pdf(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let data = report::build_event_report(&state.db, id).await?;
    let company = state.config.company_name.clone();
    let bytes = tokio::task::spawn_blocking(move || report::render_event_pdf(&data, &company))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=event_{id}.pdf"),
            ),
        ],
        bytes,
    )
        .into_response())
}
