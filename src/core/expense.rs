//! Expense business logic - the account book.
//!
//! Expenses are append-only. Categories are looked up by name without regard to case and
//! created the first time a name is used.

use crate::{
    core::{
        activity::{self, Audited},
        event::require_event,
    },
    entities::{ActivityCategory, Expense, ExpenseCategory, expense, expense_category},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ConnectionTrait, QueryOrder, Set, TransactionTrait,
    prelude::*,
    sea_query::{Expr, Func},
};
use serde::{Deserialize, Serialize};

/// Category used for staff settlements.
pub const SALARY_CATEGORY: &str = "Salary";

/// Input for [`create_expense`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewExpense {
    /// Event the money was spent for, if any
    #[serde(default)]
    pub event_id: Option<i64>,
    /// What the money was spent on
    pub title: String,
    /// Amount spent
    pub amount: f64,
    /// Category name, created if new
    #[serde(default)]
    pub category: Option<String>,
    /// When the money was spent; defaults to now
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

/// An expense with its category name resolved.
#[derive(Debug, Clone, Serialize)]
pub struct ExpenseEntry {
    /// The expense row
    #[serde(flatten)]
    pub expense: expense::Model,
    /// Category name, if categorised
    pub category_name: Option<String>,
}

/// Returns the category called `name` (any case), creating it if it does not exist.
pub async fn ensure_category<C>(db: &C, name: &str) -> Result<expense_category::Model>
where
    C: ConnectionTrait,
{
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation("Category name cannot be empty"));
    }

    let existing = ExpenseCategory::find()
        .filter(
            Expr::expr(Func::lower(Expr::col(expense_category::Column::Name)))
                .eq(name.to_lowercase()),
        )
        .one(db)
        .await?;
    if let Some(category) = existing {
        return Ok(category);
    }

    let category = expense_category::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    tracing::info!(category_id = category.id, name = %category.name, "created expense category");
    Ok(category)
}

/// Inserts an expense row without validation or activity logging.
///
/// Used inside larger transactions such as a staff reset.
pub async fn insert_expense<C>(
    db: &C,
    event_id: Option<i64>,
    title: String,
    amount: f64,
    category_id: Option<i64>,
    date: DateTime<Utc>,
) -> Result<expense::Model>
where
    C: ConnectionTrait,
{
    expense::ActiveModel {
        event_id: Set(event_id),
        title: Set(title),
        amount: Set(amount),
        category_id: Set(category_id),
        date: Set(date),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Records an expense, optionally against an event and under a category.
pub async fn create_expense(
    db: &DatabaseConnection,
    input: NewExpense,
) -> Result<Audited<expense::Model>> {
    let title = input.title.trim().to_string();
    if title.is_empty() {
        return Err(Error::validation("Expense title cannot be empty"));
    }
    if !input.amount.is_finite() || input.amount <= 0.0 {
        return Err(Error::InvalidAmount {
            amount: input.amount,
        });
    }

    let txn = db.begin().await?;
    if let Some(event_id) = input.event_id {
        require_event(&txn, event_id).await?;
    }
    let category = match input.category.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => Some(ensure_category(&txn, name).await?),
        _ => None,
    };

    let created = insert_expense(
        &txn,
        input.event_id,
        title,
        input.amount,
        category.as_ref().map(|c| c.id),
        input.date.unwrap_or_else(Utc::now),
    )
    .await?;
    txn.commit().await?;
    tracing::info!(expense_id = created.id, amount = created.amount, "recorded expense");

    let label = category.map_or_else(|| "General".to_string(), |c| c.name);
    let warning = activity::record(
        db,
        ActivityCategory::AccountEntryAdd,
        format!("{label} expense of Rs. {:.2}: {}", created.amount, created.title),
        Some(created.id),
    )
    .await;
    Ok(Audited::new(created).with_warning(warning))
}

/// All expenses with their category names, newest first.
pub async fn get_all_expenses(db: &DatabaseConnection) -> Result<Vec<ExpenseEntry>> {
    let rows = Expense::find()
        .find_also_related(ExpenseCategory)
        .order_by_desc(expense::Column::Date)
        .order_by_desc(expense::Column::Id)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(expense, category)| ExpenseEntry {
            expense,
            category_name: category.map(|c| c.name),
        })
        .collect())
}

/// Expenses recorded against one event, oldest first.
pub async fn get_expenses_for_event(
    db: &DatabaseConnection,
    event_id: i64,
) -> Result<Vec<expense::Model>> {
    Expense::find()
        .filter(expense::Column::EventId.eq(event_id))
        .order_by_asc(expense::Column::Date)
        .order_by_asc(expense::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// All categories ordered by name.
pub async fn get_all_categories(db: &DatabaseConnection) -> Result<Vec<expense_category::Model>> {
    ExpenseCategory::find()
        .order_by_asc(expense_category::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Sum of every expense on file.
pub async fn get_total_expenses(db: &DatabaseConnection) -> Result<f64> {
    let expenses = Expense::find().all(db).await?;
    Ok(expenses.iter().map(|e| e.amount).sum())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    fn expense_input(title: &str, amount: f64, category: Option<&str>) -> NewExpense {
        NewExpense {
            event_id: None,
            title: title.to_string(),
            amount,
            category: category.map(str::to_string),
            date: None,
        }
    }

    #[tokio::test]
    async fn test_create_expense_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_expense(&db, expense_input(" ", 10.0, None)).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        for amount in [0.0, -5.0, f64::NAN] {
            let result = create_expense(&db, expense_input("Tape", amount, None)).await;
            assert!(matches!(result.unwrap_err(), Error::InvalidAmount { .. }));
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_categories_are_case_insensitive() -> Result<()> {
        let db = setup_test_db().await?;

        let first = create_expense(&db, expense_input("Diesel", 800.0, Some("Petrol")))
            .await?
            .value;
        let second = create_expense(&db, expense_input("Bike fuel", 200.0, Some(" petrol ")))
            .await?
            .value;
        assert_eq!(first.category_id, second.category_id);

        let categories = get_all_categories(&db).await?;
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "Petrol");

        let general = create_expense(&db, expense_input("Tea", 50.0, Some(""))).await?.value;
        assert_eq!(general.category_id, None);

        assert_eq!(get_total_expenses(&db).await?, 1_050.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_expense_for_missing_event() -> Result<()> {
        let db = setup_test_db().await?;
        let mut input = expense_input("Flowers", 100.0, Some("Flower"));
        input.event_id = Some(77);

        let result = create_expense(&db, input).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound { entity: "Event", id: 77 }
        ));
        // The category insert rolled back with the transaction
        assert!(get_all_categories(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_list_expenses_with_category_names() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_test_event(&db, "Asha Wedding", "9999900000").await?;

        let mut input = expense_input("Marigolds", 3_000.0, Some("Flower"));
        input.event_id = Some(event.id);
        create_expense(&db, input).await?;
        create_expense(&db, expense_input("Rent", 9_000.0, None)).await?;

        let entries = get_all_expenses(&db).await?;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].expense.title, "Rent");
        assert_eq!(entries[0].category_name, None);
        assert_eq!(entries[1].category_name.as_deref(), Some("Flower"));

        let for_event = get_expenses_for_event(&db, event.id).await?;
        assert_eq!(for_event.len(), 1);
        assert_eq!(for_event[0].title, "Marigolds");
        Ok(())
    }
}
