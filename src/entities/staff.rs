//! Staff entity - A crew member paid per working day.
//!
//! `old_balance` is the carry-forward from before the ledger started. `balance` caches
//! the pending settlement derived from `old_balance` and the staff log ledger.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Employment status
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum StaffStatus {
    /// Currently working
    #[default]
    #[sea_orm(string_value = "active")]
    Active,
    /// Not currently working
    #[sea_orm(string_value = "inactive")]
    Inactive,
}

/// Staff database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "staff")]
pub struct Model {
    /// Unique identifier for the staff member
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Full name
    pub name: String,
    /// Phone number
    pub phone: String,
    /// Pay for one day of attendance
    pub per_day_rate: f64,
    /// Carry-forward owed before the current ledger
    pub old_balance: f64,
    /// Cached pending settlement
    pub balance: f64,
    /// Active or inactive
    pub status: StaffStatus,
    /// Link to a photo
    pub photo_url: Option<String>,
    /// Link to identity documents
    pub documents_url: Option<String>,
    /// Free-text notes
    pub notes: String,
    /// Activation date
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Staff and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One staff member has many log entries
    #[sea_orm(has_many = "super::staff_log::Entity")]
    Logs,
}

impl Related<super::staff_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Logs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
