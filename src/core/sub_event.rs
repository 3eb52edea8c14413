//! Sub-event (phase) business logic.
//!
//! Every phase write recomputes the parent event's total budget inside the same database
//! transaction, so the event budget always equals the sum of its phase budgets once the
//! event has at least one phase.

use crate::{
    core::{
        activity::{self, Audited},
        event::{recompute_total_budget, require_event},
    },
    entities::{ActivityCategory, PhaseStatus, SubEvent, sub_event},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};

/// Editable fields of a phase.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhaseFields {
    /// Phase name
    pub name: String,
    /// Venue address
    #[serde(default)]
    pub address: String,
    /// First working day
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Wind-up day
    #[serde(default)]
    pub windup_date: Option<NaiveDate>,
    /// Payment due date
    #[serde(default)]
    pub payment_date: Option<NaiveDate>,
    /// Budget slice
    #[serde(default)]
    pub budget: f64,
    /// Client-facing description
    #[serde(default)]
    pub description: String,
    /// Crew instructions
    #[serde(default)]
    pub worker_notes: String,
    /// Status; new phases default to pending
    #[serde(default)]
    pub status: Option<PhaseStatus>,
}

impl PhaseFields {
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("Phase name cannot be empty"));
        }
        if !self.budget.is_finite() || self.budget < 0.0 {
            return Err(Error::InvalidAmount {
                amount: self.budget,
            });
        }
        if let (Some(start), Some(windup)) = (self.start_date, self.windup_date) {
            if windup < start {
                return Err(Error::validation("Windup date cannot be before start date"));
            }
        }
        Ok(())
    }
}

/// Input for [`create_sub_event`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewSubEvent {
    /// Parent event
    pub event_id: i64,
    /// Phase fields
    #[serde(flatten)]
    pub fields: PhaseFields,
}

/// A written phase and the parent budget it produced.
#[derive(Debug, Clone, Serialize)]
pub struct PhaseWrite {
    /// The phase row after the write
    pub sub_event: sub_event::Model,
    /// Parent event budget after recompute
    pub event_total_budget: f64,
}

/// Finds a phase by id.
pub async fn get_sub_event_by_id<C>(db: &C, sub_event_id: i64) -> Result<Option<sub_event::Model>>
where
    C: ConnectionTrait,
{
    SubEvent::find_by_id(sub_event_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a phase under an event and recomputes the event budget.
pub async fn create_sub_event(
    db: &DatabaseConnection,
    input: NewSubEvent,
) -> Result<Audited<PhaseWrite>> {
    input.fields.validate()?;
    let fields = input.fields;

    let txn = db.begin().await?;
    let event = require_event(&txn, input.event_id).await?;

    let created = sub_event::ActiveModel {
        event_id: Set(event.id),
        name: Set(fields.name.trim().to_string()),
        address: Set(fields.address),
        start_date: Set(fields.start_date),
        windup_date: Set(fields.windup_date),
        payment_date: Set(fields.payment_date),
        budget: Set(fields.budget),
        description: Set(fields.description),
        worker_notes: Set(fields.worker_notes),
        status: Set(fields.status.unwrap_or_default()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let event_total_budget = recompute_total_budget(&txn, event.id)
        .await?
        .unwrap_or(event.total_budget);
    txn.commit().await?;
    tracing::info!(
        sub_event_id = created.id,
        event_id = event.id,
        event_total_budget,
        "created phase"
    );

    let warning = activity::record(
        db,
        ActivityCategory::PhaseAdd,
        format!("Phase {} added to {}", created.name, event.name),
        Some(created.id),
    )
    .await;
    Ok(Audited::new(PhaseWrite {
        sub_event: created,
        event_total_budget,
    })
    .with_warning(warning))
}

/// Replaces a phase's fields and recomputes the parent event budget.
pub async fn update_sub_event(
    db: &DatabaseConnection,
    sub_event_id: i64,
    fields: PhaseFields,
) -> Result<Audited<PhaseWrite>> {
    fields.validate()?;

    let txn = db.begin().await?;
    let existing = get_sub_event_by_id(&txn, sub_event_id)
        .await?
        .ok_or(Error::NotFound {
            entity: "Sub-event",
            id: sub_event_id,
        })?;
    let event_id = existing.event_id;
    let status = fields.status.unwrap_or(existing.status);

    let mut model: sub_event::ActiveModel = existing.into();
    model.name = Set(fields.name.trim().to_string());
    model.address = Set(fields.address);
    model.start_date = Set(fields.start_date);
    model.windup_date = Set(fields.windup_date);
    model.payment_date = Set(fields.payment_date);
    model.budget = Set(fields.budget);
    model.description = Set(fields.description);
    model.worker_notes = Set(fields.worker_notes);
    model.status = Set(status);
    let updated = model.update(&txn).await?;

    let event_total_budget = match recompute_total_budget(&txn, event_id).await? {
        Some(total) => total,
        None => require_event(&txn, event_id).await?.total_budget,
    };
    txn.commit().await?;

    let warning = activity::record(
        db,
        ActivityCategory::PhaseUpdate,
        format!("Phase {} updated", updated.name),
        Some(updated.id),
    )
    .await;
    Ok(Audited::new(PhaseWrite {
        sub_event: updated,
        event_total_budget,
    })
    .with_warning(warning))
}

/// Deletes a phase and recomputes the parent event budget from the phases that remain.
///
/// When the last phase is removed the event keeps its current budget. Returns `None`
/// when the phase does not exist.
pub async fn delete_sub_event(
    db: &DatabaseConnection,
    sub_event_id: i64,
) -> Result<Option<Audited<String>>> {
    let txn = db.begin().await?;
    let Some(existing) = get_sub_event_by_id(&txn, sub_event_id).await? else {
        return Ok(None);
    };

    SubEvent::delete_by_id(sub_event_id).exec(&txn).await?;
    recompute_total_budget(&txn, existing.event_id).await?;
    txn.commit().await?;
    tracing::info!(sub_event_id, event_id = existing.event_id, "deleted phase");

    let warning = activity::record(
        db,
        ActivityCategory::PhaseDelete,
        format!("Phase {} deleted", existing.name),
        Some(sub_event_id),
    )
    .await;
    Ok(Some(Audited::new(existing.name).with_warning(warning)))
}
