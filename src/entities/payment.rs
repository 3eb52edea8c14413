//! Payment entity - An immutable receipt of money against an event.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of payment received
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    /// Paid before work starts
    #[sea_orm(string_value = "advance")]
    Advance,
    /// Part of the outstanding balance
    #[default]
    #[sea_orm(string_value = "partial")]
    Partial,
    /// Final settlement
    #[sea_orm(string_value = "full")]
    Full,
}

/// Payment database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    /// Unique identifier for the payment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Event the payment was made against
    pub event_id: i64,
    /// Amount received in rupees, always positive
    pub amount: f64,
    /// Advance, partial or full
    #[serde(rename = "type")]
    pub payment_type: PaymentType,
    /// When the money was received
    pub date: DateTimeUtc,
}

/// Defines relationships between Payment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each payment belongs to one event
    #[sea_orm(
        belongs_to = "super::event::Entity",
        from = "Column::EventId",
        to = "super::event::Column::Id",
        on_delete = "Cascade"
    )]
    Event,
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
