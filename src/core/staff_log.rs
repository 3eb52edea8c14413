//! Staff log business logic - attendance and balance adjustments.

use crate::{
    core::{
        activity::{self, Audited},
        derive,
        staff::{require_staff, update_staff_balance_atomic},
    },
    entities::{ActivityCategory, StaffLog, StaffLogType, staff_log},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};

/// Input for [`add_adjustment`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewStaffLog {
    /// Staff member the entry belongs to
    pub staff_id: i64,
    /// Attendance, advance, bonus or allowance
    #[serde(rename = "type")]
    pub log_type: StaffLogType,
    /// Amount; ignored for attendance
    #[serde(default)]
    pub amount: Option<f64>,
    /// Free-text description
    #[serde(default)]
    pub description: Option<String>,
    /// When the entry applies; defaults to now
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

/// A written log entry and the balance cache it produced.
#[derive(Debug, Clone, Serialize)]
pub struct StaffLogWrite {
    /// The ledger row
    pub log: staff_log::Model,
    /// Staff balance after the adjustment
    pub balance: f64,
}

/// Amount stored on the ledger row. Attendance carries none.
fn ledger_amount(log_type: StaffLogType, amount: Option<f64>) -> Result<f64> {
    if log_type == StaffLogType::Attendance {
        return Ok(0.0);
    }
    let amount = amount.ok_or_else(|| Error::validation("Amount is required"))?;
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(amount)
}

/// Appends a ledger entry and applies its signed delta to the staff balance.
///
/// The insert and the balance change happen in one transaction. Advances are logged as
/// employee payments, everything else as staff adjustments.
pub async fn add_adjustment(
    db: &DatabaseConnection,
    input: NewStaffLog,
) -> Result<Audited<StaffLogWrite>> {
    let amount = ledger_amount(input.log_type, input.amount)?;

    let txn = db.begin().await?;
    let member = require_staff(&txn, input.staff_id).await?;

    let log = staff_log::ActiveModel {
        staff_id: Set(member.id),
        log_type: Set(input.log_type),
        amount: Set(amount),
        description: Set(input.description.unwrap_or_default()),
        date: Set(input.date.unwrap_or_else(Utc::now)),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let delta = derive::staff_log_delta(input.log_type, amount, member.per_day_rate);
    let updated = update_staff_balance_atomic(&txn, member.id, delta).await?;
    txn.commit().await?;
    tracing::info!(
        staff_id = member.id,
        log_id = log.id,
        log_type = ?input.log_type,
        delta,
        balance = updated.balance,
        "recorded staff adjustment"
    );

    let (category, message) = match input.log_type {
        StaffLogType::Advance => (
            ActivityCategory::EmployeePayment,
            format!("Paid Rs. {amount:.2} advance to {}", member.name),
        ),
        StaffLogType::Attendance => (
            ActivityCategory::StaffAdjustment,
            format!("Attendance marked for {}", member.name),
        ),
        other => (
            ActivityCategory::StaffAdjustment,
            format!("Added Rs. {amount:.2} {} for {}", other.label(), member.name),
        ),
    };
    let warning = activity::record(db, category, message, Some(member.id)).await;

    Ok(Audited::new(StaffLogWrite {
        log,
        balance: updated.balance,
    })
    .with_warning(warning))
}

/// Loads a staff member's whole ledger in insertion order.
pub async fn load_ledger<C>(db: &C, staff_id: i64) -> Result<Vec<staff_log::Model>>
where
    C: ConnectionTrait,
{
    StaffLog::find()
        .filter(staff_log::Column::StaffId.eq(staff_id))
        .order_by_asc(staff_log::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// A staff member's log entries, newest first.
pub async fn get_logs_for_staff(
    db: &DatabaseConnection,
    staff_id: i64,
) -> Result<Vec<staff_log::Model>> {
    require_staff(db, staff_id).await?;
    StaffLog::find()
        .filter(staff_log::Column::StaffId.eq(staff_id))
        .order_by_desc(staff_log::Column::Date)
        .order_by_desc(staff_log::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::staff::get_staff_by_id;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_adjustment_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let result = add_adjustment(&db, staff_log_input(1, StaffLogType::Bonus, None)).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let result =
            add_adjustment(&db, staff_log_input(1, StaffLogType::Advance, Some(-10.0))).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_adjustment_for_missing_staff() -> Result<()> {
        let db = setup_test_db().await?;
        let result =
            add_adjustment(&db, staff_log_input(9, StaffLogType::Attendance, None)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound { entity: "Staff", id: 9 }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_balance_cache_tracks_ledger() -> Result<()> {
        let db = setup_test_db().await?;
        let ravi = create_test_staff(&db, "Ravi", 1_000.0).await?;

        let entries = [
            (StaffLogType::Attendance, Some(5_000.0)),
            (StaffLogType::FullNight, Some(400.0)),
            (StaffLogType::HalfNight, Some(200.0)),
            (StaffLogType::Petrol, Some(150.0)),
            (StaffLogType::Other, Some(50.0)),
            (StaffLogType::Bonus, Some(500.0)),
            (StaffLogType::Advance, Some(1_300.0)),
        ];
        let mut last = 0.0;
        for (log_type, amount) in entries {
            last = add_adjustment(&db, staff_log_input(ravi.id, log_type, amount))
                .await?
                .value
                .balance;
        }
        assert_eq!(last, 1_000.0 + 400.0 + 200.0 + 150.0 + 50.0 + 500.0 - 1_300.0);

        let stored = get_staff_by_id(&db, ravi.id).await?.unwrap();
        let ledger = load_ledger(&db, ravi.id).await?;
        assert_eq!(ledger[0].amount, 0.0);
        assert_eq!(derive::staff_pending_settlement(&stored, &ledger), stored.balance);
        Ok(())
    }

    #[tokio::test]
    async fn test_adjustment_activity_categories() -> Result<()> {
        let db = setup_test_db().await?;
        let ravi = create_test_staff(&db, "Ravi", 1_000.0).await?;

        add_adjustment(&db, staff_log_input(ravi.id, StaffLogType::Advance, Some(100.0))).await?;
        let feed = activity::list_recent(&db, 1).await?;
        assert_eq!(feed[0].category, ActivityCategory::EmployeePayment);

        add_adjustment(&db, staff_log_input(ravi.id, StaffLogType::Petrol, Some(80.0))).await?;
        let feed = activity::list_recent(&db, 1).await?;
        assert_eq!(feed[0].category, ActivityCategory::StaffAdjustment);
        assert!(feed[0].description.contains("petrol allowance"));
        Ok(())
    }

    #[tokio::test]
    async fn test_logs_listed_newest_first() -> Result<()> {
        let db = setup_test_db().await?;
        let ravi = create_test_staff(&db, "Ravi", 1_000.0).await?;
        let mut early = staff_log_input(ravi.id, StaffLogType::Attendance, None);
        early.date = Some(Utc::now() - chrono::Duration::days(2));
        add_adjustment(&db, early).await?;
        add_adjustment(&db, staff_log_input(ravi.id, StaffLogType::Bonus, Some(10.0))).await?;

        let logs = get_logs_for_staff(&db, ravi.id).await?;
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].log_type, StaffLogType::Bonus);

        let missing = get_logs_for_staff(&db, 404).await;
        assert!(matches!(missing.unwrap_err(), Error::NotFound { .. }));
        Ok(())
    }
}
