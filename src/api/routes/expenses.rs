//! Account book routes.

use crate::api::{Ack, AppState, error::AppError, extractors::extract_json};
use crate::core::expense::{self, ExpenseEntry, NewExpense};
use crate::entities::ExpenseCategoryModel;
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::get,
};

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_expenses).post(create_expense))
        .route("/expense-categories", get(list_categories))
}

async fn list_expenses(State(state): State<AppState>) -> Result<Json<Vec<ExpenseEntry>>, AppError> {
    Ok(Json(expense::get_all_expenses(&state.db).await?))
}

async fn create_expense(
    State(state): State<AppState>,
    body: Result<Json<NewExpense>, JsonRejection>,
) -> Result<Json<Ack>, AppError> {
    let req = extract_json(body)?;
    let created = expense::create_expense(&state.db, req).await?;
    Ok(Json(Ack::created(created.value.id, created.warnings)))
}

async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<ExpenseCategoryModel>>, AppError> {
    Ok(Json(expense::get_all_categories(&state.db).await?))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use crate::test_utils::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_expense_routes() {
        let (app, _db) = test_app().await;

        let (status, _) = send(
            &app,
            "POST",
            "/api/expenses",
            Some(json!({"title": "Diesel", "amount": 800.0, "category": "Petrol"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &app,
            "POST",
            "/api/expenses",
            Some(json!({"title": "", "amount": 10.0})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (_, body) = send(&app, "GET", "/api/expenses", None).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["category_name"], "Petrol");

        let (_, body) = send(&app, "GET", "/api/expense-categories", None).await;
        assert_eq!(body[0]["name"], "Petrol");
    }
}
