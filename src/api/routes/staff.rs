//! Staff and staff log routes.

use crate::api::{Ack, AppState, error::AppError, extractors::extract_json};
use crate::core::{
    staff::{self, StaffFields, StaffSummary},
    staff_log::{self, NewStaffLog},
};
use crate::entities::{StaffLogModel, StaffStatus};
use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};

/// Body of `POST /staff/:id/status`.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    /// New status
    pub status: StaffStatus,
}

/// Response of `POST /staff/:id/reset`.
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    /// Always true
    pub success: bool,
    /// Settlement owed before the reset
    pub settled_amount: f64,
    /// Salary expense created, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expense_id: Option<i64>,
    /// Activity-log failures
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/staff", get(list_staff).post(create_staff))
        .route("/staff/logs", post(add_log))
        .route("/staff/:id", put(update_staff).delete(delete_staff))
        .route("/staff/:id/status", post(set_status))
        .route("/staff/:id/reset", post(reset_staff))
        .route("/staff/:id/logs", get(list_logs))
}

async fn list_staff(State(state): State<AppState>) -> Result<Json<Vec<StaffSummary>>, AppError> {
    Ok(Json(staff::get_all_staff(&state.db).await?))
}

async fn create_staff(
    State(state): State<AppState>,
    body: Result<Json<StaffFields>, JsonRejection>,
) -> Result<Json<Ack>, AppError> {
    let req = extract_json(body)?;
    let created = staff::create_staff(&state.db, req).await?;
    Ok(Json(Ack::created(created.value.id, created.warnings)))
}

async fn update_staff(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Result<Json<StaffFields>, JsonRejection>,
) -> Result<Json<Ack>, AppError> {
    let req = extract_json(body)?;
    staff::update_staff(&state.db, id, req).await?;
    Ok(Json(Ack::done(Vec::new())))
}

async fn delete_staff(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Ack>, AppError> {
    let deleted = staff::delete_staff(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Staff", id))?;
    Ok(Json(Ack::done(deleted.warnings)))
}

async fn set_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Result<Json<StatusRequest>, JsonRejection>,
) -> Result<Json<Ack>, AppError> {
    let req = extract_json(body)?;
    staff::set_staff_status(&state.db, id, req.status).await?;
    Ok(Json(Ack::done(Vec::new())))
}

async fn reset_staff(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ResetResponse>, AppError> {
    let outcome = staff::reset_staff(&state.db, id).await?;
    Ok(Json(ResetResponse {
        success: true,
        settled_amount: outcome.value.settled_amount,
        expense_id: outcome.value.expense.map(|e| e.id),
        warnings: outcome.warnings,
    }))
}

async fn list_logs(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<StaffLogModel>>, AppError> {
    Ok(Json(staff_log::get_logs_for_staff(&state.db, id).await?))
}

async fn add_log(
    State(state): State<AppState>,
    body: Result<Json<NewStaffLog>, JsonRejection>,
) -> Result<Json<Ack>, AppError> {
    let req = extract_json(body)?;
    let written = staff_log::add_adjustment(&state.db, req).await?;
    Ok(Json(Ack::created(written.value.log.id, written.warnings)))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use crate::test_utils::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_ravi_payroll_over_http() {
        let (app, _db) = test_app().await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/staff",
            Some(json!({"name": "Ravi", "phone": "9000000001", "per_day_rate": 1000.0})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let id = body["id"].as_i64().unwrap();

        for _ in 0..3 {
            let (status, _) = send(
                &app,
                "POST",
                "/api/staff/logs",
                Some(json!({"staff_id": id, "type": "attendance"})),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }
        send(
            &app,
            "POST",
            "/api/staff/logs",
            Some(json!({"staff_id": id, "type": "advance", "amount": 1000.0})),
        )
        .await;

        let (_, body) = send(&app, "GET", "/api/staff", None).await;
        assert_eq!(body[0]["pending_settlement"], 2000.0);
        assert_eq!(body[0]["active_days"], 3);
        assert_eq!(body[0]["total_advance"], 1000.0);

        let (_, logs) = send(&app, "GET", &format!("/api/staff/{id}/logs"), None).await;
        assert_eq!(logs.as_array().unwrap().len(), 4);

        let (status, body) = send(&app, "POST", &format!("/api/staff/{id}/reset"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["settled_amount"], 2000.0);
        assert!(body["expense_id"].as_i64().is_some());

        let (_, expenses) = send(&app, "GET", "/api/expenses", None).await;
        assert_eq!(expenses[0]["amount"], 2000.0);
        assert_eq!(expenses[0]["category_name"], "Salary");
    }

    #[tokio::test]
    async fn test_staff_status_update_and_delete() {
        let (app, db) = test_app().await;
        let ravi = create_test_staff(&db, "Ravi", 800.0).await.unwrap();

        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/staff/{}/status", ravi.id),
            Some(json!({"status": "inactive"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &app,
            "PUT",
            &format!("/api/staff/{}", ravi.id),
            Some(json!({"name": "Ravi K", "per_day_rate": 900.0})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(&app, "GET", "/api/staff", None).await;
        assert_eq!(body[0]["status"], "inactive");
        assert_eq!(body[0]["name"], "Ravi K");

        let (status, _) = send(&app, "DELETE", &format!("/api/staff/{}", ravi.id), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, "POST", &format!("/api/staff/{}/reset", ravi.id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
