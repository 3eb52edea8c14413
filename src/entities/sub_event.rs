//! Sub-event entity - A scheduled phase of an event (e.g., a ceremony day)
//! with its own venue, dates and budget slice.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a phase
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    /// Not started yet
    #[default]
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Work in progress
    #[sea_orm(string_value = "active")]
    Active,
    /// Wound up
    #[sea_orm(string_value = "completed")]
    Completed,
}

/// Sub-event database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sub_events")]
pub struct Model {
    /// Unique identifier for the phase
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning event
    pub event_id: i64,
    /// Phase name (e.g., "Mehendi")
    pub name: String,
    /// Venue address
    pub address: String,
    /// First working day
    pub start_date: Option<Date>,
    /// Wind-up day
    pub windup_date: Option<Date>,
    /// Payment due date for this phase
    pub payment_date: Option<Date>,
    /// Budget slice in rupees
    pub budget: f64,
    /// Client-facing description
    pub description: String,
    /// Instructions for the crew
    pub worker_notes: String,
    /// Current status
    pub status: PhaseStatus,
}

/// Defines relationships between Sub-event and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each phase belongs to one event
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
