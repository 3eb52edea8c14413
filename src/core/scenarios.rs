//! End-to-end business flows across several core modules.

#![allow(clippy::unwrap_used)]
#![allow(clippy::float_cmp)]

use crate::{
    core::{
        client, dashboard, derive,
        derive::Settlement,
        event::{self, get_event_detail},
        expense, payment,
        staff::{self, reset_staff},
        staff_log::{add_adjustment, load_ledger},
        sub_event::create_sub_event,
    },
    entities::{PaymentType, StaffLogType},
    errors::Result,
    test_utils::*,
};

#[tokio::test]
async fn test_asha_wedding() -> Result<()> {
    let db = setup_test_db().await?;

    let created = event::create_event(&db, new_event("Asha Wedding", "9999900000"))
        .await?
        .value;
    assert!(created.client_created);
    let event_id = created.event.id;

    create_sub_event(&db, phase_input(event_id, "Mehendi", 40_000.0)).await?;
    create_sub_event(&db, phase_input(event_id, "Reception", 60_000.0)).await?;
    let detail = get_event_detail(&db, event_id).await?;
    assert_eq!(detail.event.total_budget, 100_000.0);

    payment::create_payment(&db, event_id, 50_000.0, PaymentType::Advance, None).await?;
    let detail = get_event_detail(&db, event_id).await?;
    assert_eq!(detail.pending_balance, 50_000.0);
    assert_eq!(detail.settlement, Settlement::Pending);

    payment::create_payment(&db, event_id, 50_000.0, PaymentType::Full, None).await?;
    let detail = get_event_detail(&db, event_id).await?;
    assert_eq!(detail.pending_balance, 0.0);
    assert_eq!(detail.settlement, Settlement::Settled);
    assert_eq!(detail.event.received_amount, detail.received_total);

    // A second event for the same phone reuses the client
    let second = event::create_event(&db, new_event("Asha Griha Pravesh", "9999900000"))
        .await?
        .value;
    assert!(!second.client_created);
    assert_eq!(client::get_all_clients(&db).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_ravi_payroll() -> Result<()> {
    let db = setup_test_db().await?;
    let ravi = create_test_staff(&db, "Ravi", 1_000.0).await?;

    for _ in 0..3 {
        add_adjustment(&db, staff_log_input(ravi.id, StaffLogType::Attendance, None)).await?;
    }
    let member = staff::require_staff(&db, ravi.id).await?;
    let ledger = load_ledger(&db, ravi.id).await?;
    assert_eq!(derive::staff_pending_settlement(&member, &ledger), 3_000.0);
    assert_eq!(member.balance, 3_000.0);

    add_adjustment(&db, staff_log_input(ravi.id, StaffLogType::Advance, Some(1_000.0))).await?;
    let listed = staff::get_all_staff(&db).await?;
    assert_eq!(listed[0].pending_settlement, 2_000.0);
    assert_eq!(listed[0].staff.balance, 2_000.0);
    assert_eq!(listed[0].totals.active_days, 3);
    assert_eq!(listed[0].totals.total_advance, 1_000.0);

    let outcome = reset_staff(&db, ravi.id).await?.value;
    assert_eq!(outcome.staff.balance, 0.0);
    let expenses = expense::get_all_expenses(&db).await?;
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].expense.amount, 2_000.0);
    assert_eq!(expenses[0].category_name.as_deref(), Some("Salary"));
    Ok(())
}

#[tokio::test]
async fn test_total_pending_matches_event_sum() -> Result<()> {
    let db = setup_test_db().await?;
    let budgets = [(25_000.0, 5_000.0), (10_000.0, 12_000.0), (40_000.0, 0.0)];

    for (i, (budget, paid)) in budgets.into_iter().enumerate() {
        let ev = create_test_event_with_budget(&db, "Event", &format!("90000000{i:02}"), budget)
            .await?;
        if paid > 0.0 {
            payment::create_payment(&db, ev.id, paid, PaymentType::Partial, None).await?;
        }
    }

    let summaries = event::get_all_events(&db).await?;
    let expected: f64 = summaries.iter().map(|s| s.pending_balance).sum();
    let stats = dashboard::get_dashboard_stats(&db, 10).await?;
    assert_eq!(stats.total_pending, expected);
    assert_eq!(stats.total_pending, 20_000.0 - 2_000.0 + 40_000.0);
    Ok(())
}
