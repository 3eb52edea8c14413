//! Staff business logic - crew records, balances and settlement.
//!
//! The staff log ledger is the source of truth for what a crew member is owed. The `balance`
//! column is a cache kept in step by [`update_staff_balance_atomic`] and rebuilt by
//! [`rebuild_balance`] whenever the inputs to the derivation change.

use crate::{
    core::{
        activity::{self, Audited},
        derive::{self, StaffTotals},
        expense::{SALARY_CATEGORY, ensure_category, insert_expense},
        staff_log::load_ledger,
    },
    entities::{ActivityCategory, Staff, StaffLog, StaffStatus, expense, staff, staff_log},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{ConnectionTrait, QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Editable fields of a staff member.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaffFields {
    /// Full name
    pub name: String,
    /// Phone number
    #[serde(default)]
    pub phone: String,
    /// Pay for one day of attendance
    pub per_day_rate: f64,
    /// Carry-forward owed from before the ledger
    #[serde(default)]
    pub old_balance: f64,
    /// Link to a photo
    #[serde(default)]
    pub photo_url: Option<String>,
    /// Link to identity documents
    #[serde(default)]
    pub documents_url: Option<String>,
    /// Free-text notes
    #[serde(default)]
    pub notes: Option<String>,
}

impl StaffFields {
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("Staff name cannot be empty"));
        }
        if !self.per_day_rate.is_finite() || self.per_day_rate < 0.0 {
            return Err(Error::InvalidAmount {
                amount: self.per_day_rate,
            });
        }
        if !self.old_balance.is_finite() {
            return Err(Error::InvalidAmount {
                amount: self.old_balance,
            });
        }
        Ok(())
    }
}

/// A staff member with ledger totals, as shown in the staff list.
#[derive(Debug, Clone, Serialize)]
pub struct StaffSummary {
    /// The staff row
    #[serde(flatten)]
    pub staff: staff::Model,
    /// Attendance days and adjustment sums
    #[serde(flatten)]
    pub totals: StaffTotals,
    /// What the business owes, derived from the ledger
    pub pending_settlement: f64,
}

/// Result of [`reset_staff`].
#[derive(Debug, Clone, Serialize)]
pub struct ResetOutcome {
    /// Staff row after the reset
    pub staff: staff::Model,
    /// Settlement that was owed before the reset
    pub settled_amount: f64,
    /// Salary expense recorded for a positive settlement
    pub expense: Option<expense::Model>,
}

/// Finds a staff member by id.
pub async fn get_staff_by_id<C>(db: &C, staff_id: i64) -> Result<Option<staff::Model>>
where
    C: ConnectionTrait,
{
    Staff::find_by_id(staff_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Like [`get_staff_by_id`] but a missing staff member is an error.
pub async fn require_staff<C>(db: &C, staff_id: i64) -> Result<staff::Model>
where
    C: ConnectionTrait,
{
    get_staff_by_id(db, staff_id).await?.ok_or(Error::NotFound {
        entity: "Staff",
        id: staff_id,
    })
}

/// Adds a new staff member. The balance starts at the carry-forward.
pub async fn create_staff(
    db: &DatabaseConnection,
    fields: StaffFields,
) -> Result<Audited<staff::Model>> {
    fields.validate()?;

    let created = staff::ActiveModel {
        name: Set(fields.name.trim().to_string()),
        phone: Set(fields.phone.trim().to_string()),
        per_day_rate: Set(fields.per_day_rate),
        old_balance: Set(fields.old_balance),
        balance: Set(fields.old_balance),
        status: Set(StaffStatus::Active),
        photo_url: Set(fields.photo_url),
        documents_url: Set(fields.documents_url),
        notes: Set(fields.notes.unwrap_or_default()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    tracing::info!(staff_id = created.id, "created staff member");

    let warning = activity::record(
        db,
        ActivityCategory::StaffAdd,
        format!("Staff {} added at Rs. {:.2}/day", created.name, created.per_day_rate),
        Some(created.id),
    )
    .await;
    Ok(Audited::new(created).with_warning(warning))
}

/// All staff with their ledger totals, ordered by name.
pub async fn get_all_staff(db: &DatabaseConnection) -> Result<Vec<StaffSummary>> {
    let members = Staff::find()
        .order_by_asc(staff::Column::Name)
        .all(db)
        .await?;

    let mut ledgers: HashMap<i64, Vec<staff_log::Model>> = HashMap::new();
    for log in StaffLog::find().all(db).await? {
        ledgers.entry(log.staff_id).or_default().push(log);
    }

    Ok(members
        .into_iter()
        .map(|member| {
            let logs = ledgers.remove(&member.id).unwrap_or_default();
            StaffSummary {
                totals: StaffTotals::from_logs(&logs),
                pending_settlement: derive::staff_pending_settlement(&member, &logs),
                staff: member,
            }
        })
        .collect())
}

/// Replaces a staff member's details.
///
/// Changing the rate or the carry-forward reprices the whole ledger, so the balance cache
/// is rebuilt in the same transaction.
pub async fn update_staff(
    db: &DatabaseConnection,
    staff_id: i64,
    fields: StaffFields,
) -> Result<staff::Model> {
    fields.validate()?;

    let txn = db.begin().await?;
    let existing = require_staff(&txn, staff_id).await?;
    let reprice = (existing.per_day_rate - fields.per_day_rate).abs() > f64::EPSILON
        || (existing.old_balance - fields.old_balance).abs() > f64::EPSILON;

    let mut model: staff::ActiveModel = existing.into();
    model.name = Set(fields.name.trim().to_string());
    model.phone = Set(fields.phone.trim().to_string());
    model.per_day_rate = Set(fields.per_day_rate);
    model.old_balance = Set(fields.old_balance);
    model.photo_url = Set(fields.photo_url);
    model.documents_url = Set(fields.documents_url);
    model.notes = Set(fields.notes.unwrap_or_default());
    let mut updated = model.update(&txn).await?;

    if reprice {
        updated = rebuild_balance(&txn, staff_id).await?;
        tracing::info!(staff_id, balance = updated.balance, "repriced staff balance");
    }
    txn.commit().await?;
    Ok(updated)
}

/// Marks a staff member active or inactive.
pub async fn set_staff_status(
    db: &DatabaseConnection,
    staff_id: i64,
    status: StaffStatus,
) -> Result<staff::Model> {
    let existing = require_staff(db, staff_id).await?;
    let mut model: staff::ActiveModel = existing.into();
    model.status = Set(status);
    let updated = model.update(db).await?;
    tracing::info!(staff_id, ?status, "changed staff status");
    Ok(updated)
}

/// Deletes a staff member and their ledger. Returns `None` when they do not exist.
pub async fn delete_staff(
    db: &DatabaseConnection,
    staff_id: i64,
) -> Result<Option<Audited<String>>> {
    let txn = db.begin().await?;
    let Some(existing) = get_staff_by_id(&txn, staff_id).await? else {
        return Ok(None);
    };

    StaffLog::delete_many()
        .filter(staff_log::Column::StaffId.eq(staff_id))
        .exec(&txn)
        .await?;
    Staff::delete_by_id(staff_id).exec(&txn).await?;
    txn.commit().await?;
    tracing::info!(staff_id, "deleted staff member");

    let warning = activity::record(
        db,
        ActivityCategory::StaffDelete,
        format!("Staff {} deleted", existing.name),
        Some(staff_id),
    )
    .await;
    Ok(Some(Audited::new(existing.name).with_warning(warning)))
}

/// Pays out a staff member and starts a fresh ledger.
///
/// The settlement owed is derived from the ledger. A positive settlement is booked as a
/// "Salary" expense; the logs are then cleared and both balances zeroed, all in one
/// transaction.
pub async fn reset_staff(db: &DatabaseConnection, staff_id: i64) -> Result<Audited<ResetOutcome>> {
    let txn = db.begin().await?;
    let member = require_staff(&txn, staff_id).await?;
    let logs = load_ledger(&txn, staff_id).await?;
    let settled_amount = derive::staff_pending_settlement(&member, &logs);

    let expense = if settled_amount > 0.0 {
        let category = ensure_category(&txn, SALARY_CATEGORY).await?;
        Some(
            insert_expense(
                &txn,
                None,
                format!("Salary settlement: {}", member.name),
                settled_amount,
                Some(category.id),
                Utc::now(),
            )
            .await?,
        )
    } else {
        None
    };

    StaffLog::delete_many()
        .filter(staff_log::Column::StaffId.eq(staff_id))
        .exec(&txn)
        .await?;
    let mut model: staff::ActiveModel = member.into();
    model.old_balance = Set(0.0);
    model.balance = Set(0.0);
    let staff = model.update(&txn).await?;
    txn.commit().await?;
    tracing::info!(staff_id, settled_amount, cleared_logs = logs.len(), "reset staff ledger");

    let mut outcome = Audited::new(ResetOutcome {
        staff,
        settled_amount,
        expense,
    });
    if settled_amount > 0.0 {
        let warning = activity::record(
            db,
            ActivityCategory::EmployeePayment,
            format!(
                "Settled Rs. {settled_amount:.2} with {}",
                outcome.value.staff.name
            ),
            Some(staff_id),
        )
        .await;
        outcome = outcome.with_warning(warning);
    }
    Ok(outcome)
}

/// Adds `amount_delta` to a staff member's balance cache in a single SQL statement.
pub async fn update_staff_balance_atomic<C>(
    db: &C,
    staff_id: i64,
    amount_delta: f64,
) -> Result<staff::Model>
where
    C: ConnectionTrait,
{
    let result = Staff::update_many()
        .col_expr(
            staff::Column::Balance,
            Expr::col(staff::Column::Balance).add(amount_delta),
        )
        .filter(staff::Column::Id.eq(staff_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::NotFound {
            entity: "Staff",
            id: staff_id,
        });
    }

    require_staff(db, staff_id).await
}

/// Recomputes a staff member's balance cache from the ledger and stores it.
pub async fn rebuild_balance<C>(db: &C, staff_id: i64) -> Result<staff::Model>
where
    C: ConnectionTrait,
{
    let member = require_staff(db, staff_id).await?;
    let logs = load_ledger(db, staff_id).await?;
    let balance = derive::staff_pending_settlement(&member, &logs);

    Staff::update_many()
        .col_expr(staff::Column::Balance, Expr::value(balance))
        .filter(staff::Column::Id.eq(staff_id))
        .exec(db)
        .await?;

    require_staff(db, staff_id).await
}
