//! Payment business logic - append-only receipts against events.
//!
//! Recording a payment inserts the ledger row and bumps the event's received amount cache in
//! one database transaction. Payments never change an event's budget.

use crate::{
    core::{
        activity::{self, Audited},
        event::{require_event, update_received_amount_atomic},
    },
    entities::{ActivityCategory, Payment, PaymentType, payment},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};

/// Activity tag for a payment of the given type.
const fn activity_category(payment_type: PaymentType) -> ActivityCategory {
    match payment_type {
        PaymentType::Advance => ActivityCategory::AdvancePayment,
        PaymentType::Partial => ActivityCategory::PartialPayment,
        PaymentType::Full => ActivityCategory::FullPayment,
    }
}

/// Records a payment and increments the event's received amount.
///
/// # Arguments
/// * `event_id` - Event the money was paid against
/// * `amount` - Amount received, must be positive and finite
/// * `payment_type` - Advance, partial or full
/// * `date` - When the money was received; defaults to now
pub async fn create_payment(
    db: &DatabaseConnection,
    event_id: i64,
    amount: f64,
    payment_type: PaymentType,
    date: Option<DateTime<Utc>>,
) -> Result<Audited<payment::Model>> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount { amount });
    }

    let txn = db.begin().await?;
    let event = require_event(&txn, event_id).await?;

    let created = payment::ActiveModel {
        event_id: Set(event.id),
        amount: Set(amount),
        payment_type: Set(payment_type),
        date: Set(date.unwrap_or_else(Utc::now)),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let updated = update_received_amount_atomic(&txn, event.id, amount).await?;
    txn.commit().await?;
    tracing::info!(
        payment_id = created.id,
        event_id,
        amount,
        received_amount = updated.received_amount,
        "recorded payment"
    );

    let warning = activity::record(
        db,
        activity_category(payment_type),
        format!("Received Rs. {amount:.2} ({payment_type:?}) for {}", event.name),
        Some(event.id),
    )
    .await;
    Ok(Audited::new(created).with_warning(warning))
}

/// Payments recorded for one event, oldest first.
pub async fn get_payments_for_event(
    db: &DatabaseConnection,
    event_id: i64,
) -> Result<Vec<payment::Model>> {
    Payment::find()
        .filter(payment::Column::EventId.eq(event_id))
        .order_by_asc(payment::Column::Date)
        .order_by_asc(payment::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
