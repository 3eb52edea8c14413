//! Startup reconciliation of cached counters against their ledgers.
//!
//! `events.received_amount` and `staff.balance` are caches. This pass recomputes both from
//! the payment and staff log ledgers and corrects any drift it finds.

use crate::{
    core::{derive, staff::rebuild_balance},
    entities::{Event, Payment, Staff, event, payment},
    errors::Result,
};
use sea_orm::{TransactionTrait, prelude::*, sea_query::Expr};
use serde::Serialize;
use std::collections::HashMap;

/// Tolerance below which a cache is considered correct.
const DRIFT_TOLERANCE: f64 = 0.005;

/// What a reconciliation pass found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Events examined
    pub events_checked: usize,
    /// Events whose received amount was corrected
    pub events_corrected: usize,
    /// Staff members examined
    pub staff_checked: usize,
    /// Staff members whose balance was corrected
    pub staff_corrected: usize,
}

/// Rebuilds every event and staff cache from the ledgers in one transaction.
pub async fn rebuild_all(db: &DatabaseConnection) -> Result<ReconcileReport> {
    let txn = db.begin().await?;
    let mut report = ReconcileReport::default();

    let mut ledgers: HashMap<i64, Vec<payment::Model>> = HashMap::new();
    for p in Payment::find().all(&txn).await? {
        ledgers.entry(p.event_id).or_default().push(p);
    }

    for e in Event::find().all(&txn).await? {
        report.events_checked += 1;
        let received = ledgers
            .get(&e.id)
            .map_or(0.0, |ledger| derive::event_received_amount(ledger));
        if (received - e.received_amount).abs() > DRIFT_TOLERANCE {
            tracing::warn!(
                event_id = e.id,
                cached = e.received_amount,
                ledger = received,
                "correcting event received amount"
            );
            Event::update_many()
                .col_expr(event::Column::ReceivedAmount, Expr::value(received))
                .filter(event::Column::Id.eq(e.id))
                .exec(&txn)
                .await?;
            report.events_corrected += 1;
        }
    }

    for member in Staff::find().all(&txn).await? {
        report.staff_checked += 1;
        let rebuilt = rebuild_balance(&txn, member.id).await?;
        if (rebuilt.balance - member.balance).abs() > DRIFT_TOLERANCE {
            tracing::warn!(
                staff_id = member.id,
                cached = member.balance,
                ledger = rebuilt.balance,
                "corrected staff balance"
            );
            report.staff_corrected += 1;
        }
    }

    txn.commit().await?;
    tracing::info!(
        events = report.events_checked,
        events_corrected = report.events_corrected,
        staff = report.staff_checked,
        staff_corrected = report.staff_corrected,
        "reconciled cached balances"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::{
        event::{get_event_by_id, update_received_amount_atomic},
        payment::create_payment,
        staff::{get_staff_by_id, update_staff_balance_atomic},
        staff_log::add_adjustment,
    };
    use crate::entities::{PaymentType, StaffLogType};
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_rebuild_all_clean_database() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_test_event(&db, "Puja", "7777700000").await?;
        create_payment(&db, event.id, 500.0, PaymentType::Partial, None).await?;
        create_test_staff(&db, "Ravi", 1_000.0).await?;

        let report = rebuild_all(&db).await?;
        assert_eq!(report.events_checked, 1);
        assert_eq!(report.staff_checked, 1);
        assert_eq!(report.events_corrected, 0);
        assert_eq!(report.staff_corrected, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_rebuild_all_corrects_drift() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_test_event(&db, "Puja", "7777700000").await?;
        create_payment(&db, event.id, 500.0, PaymentType::Partial, None).await?;
        let ravi = create_test_staff(&db, "Ravi", 1_000.0).await?;
        add_adjustment(&db, staff_log_input(ravi.id, StaffLogType::Attendance, None)).await?;

        update_received_amount_atomic(&db, event.id, 99.0).await?;
        update_staff_balance_atomic(&db, ravi.id, -250.0).await?;

        let report = rebuild_all(&db).await?;
        assert_eq!(report.events_corrected, 1);
        assert_eq!(report.staff_corrected, 1);

        assert_eq!(get_event_by_id(&db, event.id).await?.unwrap().received_amount, 500.0);
        assert_eq!(get_staff_by_id(&db, ravi.id).await?.unwrap().balance, 1_000.0);
        Ok(())
    }
}
