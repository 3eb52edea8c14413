//! Event business logic - Handles event creation, lookup, updates and deletion.
//!
//! Creating an event resolves its client by phone number first. An event's `total_budget`
//! follows its phases whenever it has any (see [`recompute_total_budget`]), and its
//! `received_amount` cache is only ever moved by [`update_received_amount_atomic`].

use crate::{
    core::{
        activity::{self, Audited},
        client::find_or_create_client,
        derive::{self, Settlement},
    },
    entities::{
        ActivityCategory, Client, Event, Expense, Payment, SubEvent, client, event, expense,
        payment, sub_event,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::{Deserialize, Serialize};

/// Input for [`create_event`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewEvent {
    /// Client name, used only when the phone is not on file
    pub client_name: String,
    /// Client phone, the identity key
    pub client_phone: String,
    /// Event name
    #[serde(rename = "event_name")]
    pub name: String,
    /// Manual budget for events without phases
    #[serde(default)]
    pub total_budget: Option<f64>,
    /// Date the final payment is due
    #[serde(default)]
    pub payment_date: Option<NaiveDate>,
    /// Free-text notes
    #[serde(default)]
    pub notes: Option<String>,
}

/// Input for [`update_event`].
#[derive(Debug, Clone, Deserialize)]
pub struct EventChanges {
    /// New event name
    pub name: String,
    /// New manual budget; overwritten by the next phase write if the event has phases
    pub total_budget: f64,
    /// Date the final payment is due
    #[serde(default)]
    pub payment_date: Option<NaiveDate>,
    /// Free-text notes
    #[serde(default)]
    pub notes: Option<String>,
}

/// Result of [`create_event`].
#[derive(Debug, Clone, Serialize)]
pub struct CreatedEvent {
    /// The new event
    pub event: event::Model,
    /// Whether the client was created by this call
    pub client_created: bool,
}

/// An event with its client and balance, as shown in lists.
#[derive(Debug, Clone, Serialize)]
pub struct EventSummary {
    /// The event row
    #[serde(flatten)]
    pub event: event::Model,
    /// Owning client's name
    pub client_name: String,
    /// Owning client's phone
    pub client_phone: String,
    /// Budget minus received
    pub pending_balance: f64,
    /// Settled or pending
    pub settlement: Settlement,
}

impl EventSummary {
    fn new(event: event::Model, client: Option<client::Model>) -> Self {
        let pending_balance = derive::event_pending_balance(event.total_budget, event.received_amount);
        let (client_name, client_phone) = client.map(|c| (c.name, c.phone)).unwrap_or_default();
        Self {
            event,
            client_name,
            client_phone,
            pending_balance,
            settlement: derive::classify_settlement(pending_balance),
        }
    }
}

/// An event with everything it owns, with balances derived from the payment ledger.
#[derive(Debug, Clone, Serialize)]
pub struct EventDetail {
    /// The event row
    #[serde(flatten)]
    pub event: event::Model,
    /// Owning client
    pub client: Option<client::Model>,
    /// Phases in start order
    #[serde(rename = "subEvents")]
    pub sub_events: Vec<sub_event::Model>,
    /// Payments, oldest first
    pub payments: Vec<payment::Model>,
    /// Sum of payments
    pub received_total: f64,
    /// Budget minus received
    pub pending_balance: f64,
    /// Settled or pending
    pub settlement: Settlement,
}

fn validate_budget(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(())
}

/// Creates an event, attaching it to the client with the given phone (created if new).
pub async fn create_event(db: &DatabaseConnection, input: NewEvent) -> Result<Audited<CreatedEvent>> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(Error::validation("Event name cannot be empty"));
    }
    let total_budget = input.total_budget.unwrap_or(0.0);
    validate_budget(total_budget)?;

    let txn = db.begin().await?;

    let resolution = find_or_create_client(&txn, &input.client_name, &input.client_phone).await?;

    let event = event::ActiveModel {
        client_id: Set(resolution.client.id),
        name: Set(name),
        total_budget: Set(total_budget),
        received_amount: Set(0.0),
        payment_date: Set(input.payment_date),
        notes: Set(input.notes.unwrap_or_default()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    tracing::info!(event_id = event.id, client_id = event.client_id, "created event");

    let warning = activity::record(
        db,
        ActivityCategory::EventAdd,
        format!("Event {} added for {}", event.name, resolution.client.name),
        Some(event.id),
    )
    .await;

    Ok(Audited::new(CreatedEvent {
        event,
        client_created: resolution.created,
    })
    .with_warning(warning))
}

/// Finds an event by its id.
pub async fn get_event_by_id<C>(db: &C, event_id: i64) -> Result<Option<event::Model>>
where
    C: ConnectionTrait,
{
    Event::find_by_id(event_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Like [`get_event_by_id`] but a missing event is an error.
pub async fn require_event<C>(db: &C, event_id: i64) -> Result<event::Model>
where
    C: ConnectionTrait,
{
    get_event_by_id(db, event_id).await?.ok_or(Error::NotFound {
        entity: "Event",
        id: event_id,
    })
}

/// All events with their clients, newest first.
pub async fn get_all_events(db: &DatabaseConnection) -> Result<Vec<EventSummary>> {
    let rows = Event::find()
        .find_also_related(Client)
        .order_by_desc(event::Column::CreatedAt)
        .order_by_desc(event::Column::Id)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(event, client)| EventSummary::new(event, client))
        .collect())
}

/// Summaries of one client's events, newest first.
pub async fn get_event_summaries_for_client(
    db: &DatabaseConnection,
    client: &client::Model,
) -> Result<Vec<EventSummary>> {
    let events = crate::core::client::get_events_for_client(db, client.id).await?;
    Ok(events
        .into_iter()
        .map(|event| EventSummary::new(event, Some(client.clone())))
        .collect())
}

/// Loads an event with its client, phases and payments.
pub async fn get_event_detail(db: &DatabaseConnection, event_id: i64) -> Result<EventDetail> {
    let event = require_event(db, event_id).await?;
    let client = crate::core::client::get_client_by_id(db, event.client_id).await?;

    let sub_events = SubEvent::find()
        .filter(sub_event::Column::EventId.eq(event_id))
        .order_by_asc(sub_event::Column::StartDate)
        .order_by_asc(sub_event::Column::Id)
        .all(db)
        .await?;
    let payments = crate::core::payment::get_payments_for_event(db, event_id).await?;

    let received_total = derive::event_received_amount(&payments);
    let pending_balance = derive::event_pending_balance(event.total_budget, received_total);

    Ok(EventDetail {
        event,
        client,
        sub_events,
        payments,
        received_total,
        pending_balance,
        settlement: derive::classify_settlement(pending_balance),
    })
}

/// Updates an event's name, budget, due date and notes.
pub async fn update_event(
    db: &DatabaseConnection,
    event_id: i64,
    changes: EventChanges,
) -> Result<Audited<event::Model>> {
    let name = changes.name.trim().to_string();
    if name.is_empty() {
        return Err(Error::validation("Event name cannot be empty"));
    }
    validate_budget(changes.total_budget)?;

    let existing = require_event(db, event_id).await?;

    let mut model: event::ActiveModel = existing.into();
    model.name = Set(name);
    model.total_budget = Set(changes.total_budget);
    model.payment_date = Set(changes.payment_date);
    model.notes = Set(changes.notes.unwrap_or_default());
    let updated = model.update(db).await?;

    let warning = activity::record(
        db,
        ActivityCategory::EventUpdate,
        format!("Event {} updated", updated.name),
        Some(updated.id),
    )
    .await;
    Ok(Audited::new(updated).with_warning(warning))
}

/// Deletes an event together with its phases and payments.
///
/// Expenses recorded against the event are kept as general expenses. Returns `None` when
/// the event does not exist.
pub async fn delete_event(
    db: &DatabaseConnection,
    event_id: i64,
) -> Result<Option<Audited<String>>> {
    let txn = db.begin().await?;

    let Some(existing) = get_event_by_id(&txn, event_id).await? else {
        return Ok(None);
    };

    SubEvent::delete_many()
        .filter(sub_event::Column::EventId.eq(event_id))
        .exec(&txn)
        .await?;
    Payment::delete_many()
        .filter(payment::Column::EventId.eq(event_id))
        .exec(&txn)
        .await?;
    Expense::update_many()
        .col_expr(expense::Column::EventId, Expr::value(Option::<i64>::None))
        .filter(expense::Column::EventId.eq(event_id))
        .exec(&txn)
        .await?;
    Event::delete_by_id(event_id).exec(&txn).await?;

    txn.commit().await?;
    tracing::info!(event_id, "deleted event");

    let warning = activity::record(
        db,
        ActivityCategory::EventDelete,
        format!("Event {} deleted", existing.name),
        Some(event_id),
    )
    .await;
    Ok(Some(Audited::new(existing.name).with_warning(warning)))
}

/// Overwrites an event's `total_budget` with the sum of its phase budgets.
///
/// Leaves the budget untouched and returns `None` when the event has no phases.
pub async fn recompute_total_budget<C>(db: &C, event_id: i64) -> Result<Option<f64>>
where
    C: ConnectionTrait,
{
    let phases = SubEvent::find()
        .filter(sub_event::Column::EventId.eq(event_id))
        .all(db)
        .await?;

    let Some(total) = derive::sub_event_aggregate_budget(&phases) else {
        tracing::debug!(event_id, "event has no phases, keeping manual budget");
        return Ok(None);
    };

    Event::update_many()
        .col_expr(event::Column::TotalBudget, Expr::value(total))
        .filter(event::Column::Id.eq(event_id))
        .exec(db)
        .await?;

    Ok(Some(total))
}

/// Adds `amount_delta` to an event's received amount cache in a single SQL statement.
///
/// `UPDATE events SET received_amount = received_amount + ? WHERE id = ?` cannot lose a
/// concurrent increment the way read-modify-write can.
pub async fn update_received_amount_atomic<C>(
    db: &C,
    event_id: i64,
    amount_delta: f64,
) -> Result<event::Model>
where
    C: ConnectionTrait,
{
    let result = Event::update_many()
        .col_expr(
            event::Column::ReceivedAmount,
            Expr::col(event::Column::ReceivedAmount).add(amount_delta),
        )
        .filter(event::Column::Id.eq(event_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::NotFound {
            entity: "Event",
            id: event_id,
        });
    }

    require_event(db, event_id).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::{expense, payment as payment_core, sub_event as phase_core};
    use crate::entities::PaymentType;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_event_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_event(&db, new_event("   ", "9999900000")).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let mut input = new_event("Asha Wedding", "9999900000");
        input.total_budget = Some(-1.0);
        let result = create_event(&db, input).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_event_reuses_client_by_phone() -> Result<()> {
        let db = setup_test_db().await?;

        let first = create_event(&db, new_event("Asha Wedding", "9999900000")).await?;
        assert!(first.value.client_created);

        let second = create_event(&db, new_event("Asha Housewarming", "9999900000")).await?;
        assert!(!second.value.client_created);
        assert_eq!(second.value.event.client_id, first.value.event.client_id);

        let third = create_event(&db, new_event("Meera Birthday", "8888800000")).await?;
        assert!(third.value.client_created);
        assert_ne!(third.value.event.client_id, first.value.event.client_id);

        assert_eq!(Client::find().count(&db).await?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_event_without_phases_keeps_manual_budget() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_test_event_with_budget(&db, "Puja", "7777700000", 25_000.0).await?;

        assert_eq!(recompute_total_budget(&db, event.id).await?, None);
        payment_core::create_payment(&db, event.id, 5_000.0, PaymentType::Advance, None).await?;

        let detail = get_event_detail(&db, event.id).await?;
        assert_eq!(detail.event.total_budget, 25_000.0);
        assert_eq!(detail.received_total, 5_000.0);
        assert_eq!(detail.pending_balance, 20_000.0);
        assert_eq!(detail.settlement, Settlement::Pending);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_event_and_summaries() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_test_event(&db, "Asha Wedding", "9999900000").await?;

        let updated = update_event(
            &db,
            event.id,
            EventChanges {
                name: "Asha & Rohan Wedding".to_string(),
                total_budget: 80_000.0,
                payment_date: NaiveDate::from_ymd_opt(2026, 12, 1),
                notes: Some("Marigold theme".to_string()),
            },
        )
        .await?
        .value;
        assert_eq!(updated.total_budget, 80_000.0);
        assert_eq!(updated.notes, "Marigold theme");

        let summaries = get_all_events(&db).await?;
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].client_name, "Test Client");
        assert_eq!(summaries[0].client_phone, "9999900000");
        assert_eq!(summaries[0].pending_balance, 80_000.0);

        let missing = update_event(
            &db,
            404,
            EventChanges {
                name: "Nope".to_string(),
                total_budget: 0.0,
                payment_date: None,
                notes: None,
            },
        )
        .await;
        assert!(matches!(
            missing.unwrap_err(),
            Error::NotFound { entity: "Event", .. }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_event_removes_owned_rows_and_detaches_expenses() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_test_event(&db, "Asha Wedding", "9999900000").await?;
        phase_core::create_sub_event(&db, phase_input(event.id, "Mehendi", 40_000.0)).await?;
        payment_core::create_payment(&db, event.id, 10_000.0, PaymentType::Advance, None).await?;
        let spent = expense::create_expense(
            &db,
            expense::NewExpense {
                event_id: Some(event.id),
                title: "Flowers".to_string(),
                amount: 3_000.0,
                category: Some("Flower".to_string()),
                date: None,
            },
        )
        .await?
        .value;

        let deleted = delete_event(&db, event.id).await?.unwrap();
        assert_eq!(deleted.value, "Asha Wedding");

        assert!(get_event_by_id(&db, event.id).await?.is_none());
        assert_eq!(SubEvent::find().count(&db).await?, 0);
        assert_eq!(Payment::find().count(&db).await?, 0);
        let kept = Expense::find_by_id(spent.id).one(&db).await?.unwrap();
        assert_eq!(kept.event_id, None);

        assert!(delete_event(&db, event.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_update_received_amount_atomic_missing_event() -> Result<()> {
        let db = setup_test_db().await?;
        let result = update_received_amount_atomic(&db, 12, 100.0).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound { entity: "Event", id: 12 }
        ));
        Ok(())
    }
}
