//! Shared test utilities.
//!
//! Helpers for setting up an in-memory database and creating records with sensible
//! defaults.

use crate::{
    core::{
        event::{self, NewEvent},
        staff::{self, StaffFields},
        staff_log::NewStaffLog,
        sub_event::{NewSubEvent, PhaseFields},
    },
    entities::{StaffLogType, event as event_entity, staff as staff_entity},
    errors::Result,
};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use http_body_util::BodyExt;
use sea_orm::DatabaseConnection;
use tower::ServiceExt;

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Input for an event owned by "Test Client" at `phone`, with no budget.
pub fn new_event(name: &str, phone: &str) -> NewEvent {
    NewEvent {
        client_name: "Test Client".to_string(),
        client_phone: phone.to_string(),
        name: name.to_string(),
        total_budget: None,
        payment_date: None,
        notes: None,
    }
}

/// Creates an event with a zero budget.
pub async fn create_test_event(
    db: &DatabaseConnection,
    name: &str,
    phone: &str,
) -> Result<event_entity::Model> {
    create_test_event_with_budget(db, name, phone, 0.0).await
}

/// Creates an event with a manual budget.
pub async fn create_test_event_with_budget(
    db: &DatabaseConnection,
    name: &str,
    phone: &str,
    budget: f64,
) -> Result<event_entity::Model> {
    let mut input = new_event(name, phone);
    input.total_budget = Some(budget);
    Ok(event::create_event(db, input).await?.value.event)
}

/// Phase input with only a name and budget set.
pub fn phase_input(event_id: i64, name: &str, budget: f64) -> NewSubEvent {
    NewSubEvent {
        event_id,
        fields: PhaseFields {
            name: name.to_string(),
            budget,
            ..Default::default()
        },
    }
}

/// Staff fields with a name and rate, everything else empty.
pub fn staff_fields(name: &str, per_day_rate: f64) -> StaffFields {
    StaffFields {
        name: name.to_string(),
        per_day_rate,
        ..Default::default()
    }
}

/// Creates a staff member with no carry-forward.
pub async fn create_test_staff(
    db: &DatabaseConnection,
    name: &str,
    per_day_rate: f64,
) -> Result<staff_entity::Model> {
    Ok(staff::create_staff(db, staff_fields(name, per_day_rate))
        .await?
        .value)
}

/// Staff log input dated now.
pub fn staff_log_input(staff_id: i64, log_type: StaffLogType, amount: Option<f64>) -> NewStaffLog {
    NewStaffLog {
        staff_id,
        log_type,
        amount,
        description: None,
        date: None,
    }
}

/// Router over a fresh in-memory database with default configuration.
#[allow(clippy::unwrap_used)]
pub async fn test_app() -> (Router, DatabaseConnection) {
    let db = setup_test_db().await.unwrap();
    let config = crate::config::AppConfig::resolve(
        crate::config::settings::FileConfig::default(),
        |_| None,
    )
    .unwrap();
    let app = crate::api::app(crate::api::AppState::new(db.clone(), config));
    (app, db)
}

/// Sends a request and returns the raw response.
#[allow(clippy::unwrap_used)]
pub async fn send_raw(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

/// Sends a request and decodes the JSON response body (`Null` when empty).
#[allow(clippy::unwrap_used)]
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let response = send_raw(app, method, uri, body).await;
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
