//! Financial derivations over loaded rows.
//!
//! Nothing here touches the database. Write paths load the rows they need and call these
//! functions, so every aggregate the service reports is computed the same way whether it is
//! shown in a list, a detail view, the dashboard or a PDF.

use crate::entities::{PaymentModel, StaffLogModel, StaffLogType, StaffModel, SubEventModel};
use serde::Serialize;

/// Display classification of an event's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Settlement {
    /// Nothing (or less than nothing) left to collect
    Settled,
    /// Money still owed by the client
    Pending,
}

/// Sum of all payments received for an event. Zero when there are none.
#[must_use]
pub fn event_received_amount(payments: &[PaymentModel]) -> f64 {
    payments.iter().map(|p| p.amount).sum()
}

/// What the client still owes. Negative when the event is overpaid.
#[must_use]
pub fn event_pending_balance(total_budget: f64, received_amount: f64) -> f64 {
    total_budget - received_amount
}

/// Classifies a pending balance for display.
#[must_use]
pub fn classify_settlement(pending_balance: f64) -> Settlement {
    if pending_balance <= 0.0 {
        Settlement::Settled
    } else {
        Settlement::Pending
    }
}

/// Sum of phase budgets, or `None` when the event has no phases.
///
/// `None` tells the caller to leave the manually entered event budget alone.
#[must_use]
pub fn sub_event_aggregate_budget(phases: &[SubEventModel]) -> Option<f64> {
    if phases.is_empty() {
        return None;
    }
    Some(phases.iter().map(|p| p.budget).sum())
}

/// Signed change a staff log entry makes to what the business owes.
///
/// Attendance is worth one day at `per_day_rate`; advances are paid out and subtract;
/// bonuses and allowances add their amount.
#[must_use]
pub fn staff_log_delta(log_type: StaffLogType, amount: f64, per_day_rate: f64) -> f64 {
    match log_type {
        StaffLogType::Attendance => per_day_rate,
        StaffLogType::Advance => -amount,
        StaffLogType::Bonus
        | StaffLogType::FullNight
        | StaffLogType::HalfNight
        | StaffLogType::Petrol
        | StaffLogType::Other => amount,
    }
}

/// Per-type totals of a staff member's ledger, used by list views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StaffTotals {
    /// Number of attendance entries
    pub active_days: u64,
    /// Sum of advances paid out
    pub total_advance: f64,
    /// Sum of bonuses
    pub total_bonus: f64,
    /// Sum of night, petrol and other allowances
    pub total_allowances: f64,
}

impl StaffTotals {
    /// Tallies a staff member's log entries.
    #[must_use]
    pub fn from_logs(logs: &[StaffLogModel]) -> Self {
        logs.iter().fold(Self::default(), |mut totals, log| {
            match log.log_type {
                StaffLogType::Attendance => totals.active_days += 1,
                StaffLogType::Advance => totals.total_advance += log.amount,
                StaffLogType::Bonus => totals.total_bonus += log.amount,
                StaffLogType::FullNight
                | StaffLogType::HalfNight
                | StaffLogType::Petrol
                | StaffLogType::Other => totals.total_allowances += log.amount,
            }
            totals
        })
    }
}

/// Amount currently owed to a staff member, derived from the ledger.
///
/// `old_balance + rate × attendance days + bonuses + allowances − advances`
#[must_use]
pub fn staff_pending_settlement(staff: &StaffModel, logs: &[StaffLogModel]) -> f64 {
    staff.old_balance
        + logs
            .iter()
            .map(|log| staff_log_delta(log.log_type, log.amount, staff.per_day_rate))
            .sum::<f64>()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::entities::{PaymentType, PhaseStatus, StaffStatus};
    use chrono::Utc;

    fn payment(amount: f64) -> PaymentModel {
        PaymentModel {
            id: 1,
            event_id: 1,
            amount,
            payment_type: PaymentType::Partial,
            date: Utc::now(),
        }
    }

    fn phase(budget: f64) -> SubEventModel {
        SubEventModel {
            id: 1,
            event_id: 1,
            name: "Phase".to_string(),
            address: String::new(),
            start_date: None,
            windup_date: None,
            payment_date: None,
            budget,
            description: String::new(),
            worker_notes: String::new(),
            status: PhaseStatus::Pending,
        }
    }

    fn staff(per_day_rate: f64, old_balance: f64) -> StaffModel {
        StaffModel {
            id: 1,
            name: "Ravi".to_string(),
            phone: String::new(),
            per_day_rate,
            old_balance,
            balance: 0.0,
            status: StaffStatus::Active,
            photo_url: None,
            documents_url: None,
            notes: String::new(),
            created_at: Utc::now(),
        }
    }

    fn log(log_type: StaffLogType, amount: f64) -> StaffLogModel {
        StaffLogModel {
            id: 1,
            staff_id: 1,
            log_type,
            amount,
            description: String::new(),
            date: Utc::now(),
        }
    }

    #[test]
    fn test_received_amount_is_zero_without_payments() {
        assert_eq!(event_received_amount(&[]), 0.0);
    }

    #[test]
    fn test_received_and_pending() {
        let payments = vec![payment(50_000.0), payment(20_000.0)];
        let received = event_received_amount(&payments);
        assert_eq!(received, 70_000.0);
        assert_eq!(event_pending_balance(100_000.0, received), 30_000.0);
    }

    #[test]
    fn test_classify_settlement_boundaries() {
        assert_eq!(classify_settlement(0.0), Settlement::Settled);
        assert_eq!(classify_settlement(-500.0), Settlement::Settled);
        assert_eq!(classify_settlement(0.01), Settlement::Pending);
    }

    #[test]
    fn test_aggregate_budget_skips_events_without_phases() {
        assert_eq!(sub_event_aggregate_budget(&[]), None);
        assert_eq!(
            sub_event_aggregate_budget(&[phase(40_000.0), phase(60_000.0)]),
            Some(100_000.0)
        );
    }

    #[test]
    fn test_staff_log_delta_signs() {
        assert_eq!(staff_log_delta(StaffLogType::Attendance, 0.0, 1000.0), 1000.0);
        assert_eq!(staff_log_delta(StaffLogType::Advance, 300.0, 1000.0), -300.0);
        assert_eq!(staff_log_delta(StaffLogType::Bonus, 200.0, 1000.0), 200.0);
        assert_eq!(staff_log_delta(StaffLogType::FullNight, 150.0, 1000.0), 150.0);
        assert_eq!(staff_log_delta(StaffLogType::HalfNight, 75.0, 1000.0), 75.0);
        assert_eq!(staff_log_delta(StaffLogType::Petrol, 100.0, 1000.0), 100.0);
        assert_eq!(staff_log_delta(StaffLogType::Other, 50.0, 1000.0), 50.0);
    }

    #[test]
    fn test_staff_pending_settlement_matches_formula() {
        let member = staff(1000.0, 500.0);
        let logs = vec![
            log(StaffLogType::Attendance, 0.0),
            log(StaffLogType::Attendance, 0.0),
            log(StaffLogType::Attendance, 0.0),
            log(StaffLogType::Bonus, 250.0),
            log(StaffLogType::Petrol, 100.0),
            log(StaffLogType::Advance, 1000.0),
        ];

        // 500 + 3 × 1000 + 250 + 100 − 1000
        assert_eq!(staff_pending_settlement(&member, &logs), 2850.0);

        let totals = StaffTotals::from_logs(&logs);
        assert_eq!(totals.active_days, 3);
        assert_eq!(totals.total_advance, 1000.0);
        assert_eq!(totals.total_bonus, 250.0);
        assert_eq!(totals.total_allowances, 100.0);
    }

    #[test]
    fn test_staff_pending_settlement_without_logs_is_old_balance() {
        assert_eq!(staff_pending_settlement(&staff(800.0, 1200.0), &[]), 1200.0);
    }
}
