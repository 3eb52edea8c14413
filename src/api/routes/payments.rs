//! `POST /payments`.

use crate::api::{Ack, AppState, error::AppError, extractors::extract_json};
use crate::core::payment;
use crate::entities::PaymentType;
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Body of `POST /payments`.
#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    /// Event paid against
    pub event_id: i64,
    /// Amount received
    pub amount: f64,
    /// Advance, partial or full; partial when omitted
    #[serde(rename = "type", default)]
    pub payment_type: PaymentType,
    /// When the money was received
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

pub(super) fn router() -> Router<AppState> {
    Router::new().route("/payments", post(create_payment))
}

async fn create_payment(
    State(state): State<AppState>,
    body: Result<Json<PaymentRequest>, JsonRejection>,
) -> Result<Json<Ack>, AppError> {
    let req = extract_json(body)?;
    let created =
        payment::create_payment(&state.db, req.event_id, req.amount, req.payment_type, req.date)
            .await?;
    Ok(Json(Ack::created(created.value.id, created.warnings)))
}
