//! Staff log entity - Append-only attendance and balance adjustments.
//!
//! Attendance rows carry no amount; they are priced by the staff member's per-day rate.
//! Advances are debits, every other type is a credit.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of staff log entry
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum StaffLogType {
    /// One day worked
    #[sea_orm(string_value = "attendance")]
    Attendance,
    /// Money paid out ahead of settlement
    #[sea_orm(string_value = "advance")]
    Advance,
    /// Discretionary bonus
    #[sea_orm(string_value = "bonus")]
    Bonus,
    /// Full-night allowance
    #[sea_orm(string_value = "full_night")]
    FullNight,
    /// Half-night allowance
    #[sea_orm(string_value = "half_night")]
    HalfNight,
    /// Petrol allowance
    #[sea_orm(string_value = "petrol")]
    Petrol,
    /// Anything else owed
    #[sea_orm(string_value = "other")]
    Other,
}

impl StaffLogType {
    /// Human-readable label used in activity messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Attendance => "attendance",
            Self::Advance => "advance payment",
            Self::Bonus => "bonus",
            Self::FullNight => "full night allowance",
            Self::HalfNight => "half night allowance",
            Self::Petrol => "petrol allowance",
            Self::Other => "adjustment",
        }
    }
}

/// Staff log database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "staff_logs")]
pub struct Model {
    /// Unique identifier for the log entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Staff member this entry belongs to
    pub staff_id: i64,
    /// Attendance, advance, bonus, allowance...
    #[serde(rename = "type")]
    pub log_type: StaffLogType,
    /// Amount in rupees (zero for attendance)
    pub amount: f64,
    /// Free-text description
    pub description: String,
    /// When the entry applies
    pub date: DateTimeUtc,
}

/// Defines relationships between Staff log and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each log entry belongs to one staff member
    #[sea_orm(
        belongs_to = "super::staff::Entity",
        from = "Column::StaffId",
        to = "super::staff::Column::Id",
        on_delete = "Cascade"
    )]
    Staff,
}

impl Related<super::staff::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Staff.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
