//! Client routes.

use crate::api::{Ack, AppState, error::AppError, extractors::extract_json};
use crate::core::{client, event::EventSummary, event::get_event_summaries_for_client};
use crate::entities::client::Model as ClientModel;
use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    routing::get,
};
use serde::{Deserialize, Serialize};

/// A client with their events.
#[derive(Debug, Serialize)]
pub struct ClientDetail {
    /// The client row
    #[serde(flatten)]
    pub client: ClientModel,
    /// Events, newest first
    pub events: Vec<EventSummary>,
}

/// Body of `PUT /clients/:id`.
#[derive(Debug, Deserialize)]
pub struct UpdateClientRequest {
    /// New name
    pub name: String,
    /// New phone
    pub phone: String,
    /// Free-text notes
    #[serde(default)]
    pub notes: Option<String>,
}

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/clients", get(list_clients))
        .route(
            "/clients/:id",
            get(get_client).put(update_client).delete(delete_client),
        )
}

async fn list_clients(State(state): State<AppState>) -> Result<Json<Vec<ClientModel>>, AppError> {
    Ok(Json(client::get_all_clients(&state.db).await?))
}

async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ClientDetail>, AppError> {
    let found = client::get_client_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Client", id))?;
    let events = get_event_summaries_for_client(&state.db, &found).await?;
    Ok(Json(ClientDetail {
        client: found,
        events,
    }))
}

async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Result<Json<UpdateClientRequest>, JsonRejection>,
) -> Result<Json<Ack>, AppError> {
    let req = extract_json(body)?;
    let updated = client::update_client(&state.db, id, &req.name, &req.phone, req.notes).await?;
    Ok(Json(Ack::done(updated.warnings)))
}

async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Ack>, AppError> {
    let deleted = client::delete_client(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Client", id))?;
    Ok(Json(Ack::done(deleted.warnings)))
}
