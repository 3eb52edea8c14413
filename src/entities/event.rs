//! Event entity - A client's decoration project.
//!
//! `total_budget` is derived from the event's phases whenever at least one phase exists.
//! `received_amount` caches the sum of the event's payments and is only ever changed
//! through atomic increments or a rebuild from the payment ledger.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Event database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "events")]
pub struct Model {
    /// Unique identifier for the event
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning client
    pub client_id: i64,
    /// Event name (e.g., "Asha Wedding")
    pub name: String,
    /// Total budget in rupees
    pub total_budget: f64,
    /// Cached sum of payments received
    pub received_amount: f64,
    /// Date the final payment is due
    pub payment_date: Option<Date>,
    /// Free-text notes
    pub notes: String,
    /// When the event was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Event and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each event belongs to one client
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::ClientId",
        to = "super::client::Column::Id"
    )]
    Client,
    /// One event has many phases
    #[sea_orm(has_many = "super::sub_event::Entity")]
    SubEvents,
    /// One event has many payments
    #[sea_orm(has_many = "super::payment::Entity")]
    Payments,
    /// One event has many expenses
    #[sea_orm(has_many = "super::expense::Entity")]
    Expenses,
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::sub_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SubEvents.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl Related<super::expense::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
