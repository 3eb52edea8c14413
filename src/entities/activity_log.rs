//! Activity log entity - Append-only human-readable record of mutating actions.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Category tag of an activity entry
#[allow(missing_docs)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum ActivityCategory {
    #[sea_orm(string_value = "EVENT ADD")]
    #[serde(rename = "EVENT ADD")]
    EventAdd,
    #[sea_orm(string_value = "EVENT UPDATE")]
    #[serde(rename = "EVENT UPDATE")]
    EventUpdate,
    #[sea_orm(string_value = "EVENT DELETE")]
    #[serde(rename = "EVENT DELETE")]
    EventDelete,
    #[sea_orm(string_value = "PHASE ADD")]
    #[serde(rename = "PHASE ADD")]
    PhaseAdd,
    #[sea_orm(string_value = "PHASE UPDATE")]
    #[serde(rename = "PHASE UPDATE")]
    PhaseUpdate,
    #[sea_orm(string_value = "PHASE DELETE")]
    #[serde(rename = "PHASE DELETE")]
    PhaseDelete,
    #[sea_orm(string_value = "FULL PAYMENT")]
    #[serde(rename = "FULL PAYMENT")]
    FullPayment,
    #[sea_orm(string_value = "ADVANCE PAYMENT")]
    #[serde(rename = "ADVANCE PAYMENT")]
    AdvancePayment,
    #[sea_orm(string_value = "PARTIAL PAYMENT")]
    #[serde(rename = "PARTIAL PAYMENT")]
    PartialPayment,
    #[sea_orm(string_value = "ACCOUNT ENTRY ADD")]
    #[serde(rename = "ACCOUNT ENTRY ADD")]
    AccountEntryAdd,
    #[sea_orm(string_value = "EMPLOYEE PAYMENT")]
    #[serde(rename = "EMPLOYEE PAYMENT")]
    EmployeePayment,
    #[sea_orm(string_value = "STAFF ADJUSTMENT")]
    #[serde(rename = "STAFF ADJUSTMENT")]
    StaffAdjustment,
    #[sea_orm(string_value = "STAFF ADD")]
    #[serde(rename = "STAFF ADD")]
    StaffAdd,
    #[sea_orm(string_value = "STAFF DELETE")]
    #[serde(rename = "STAFF DELETE")]
    StaffDelete,
    #[sea_orm(string_value = "CLIENT UPDATE")]
    #[serde(rename = "CLIENT UPDATE")]
    ClientUpdate,
    #[sea_orm(string_value = "CLIENT DELETE")]
    #[serde(rename = "CLIENT DELETE")]
    ClientDelete,
}

/// Activity log database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "activity_log")]
pub struct Model {
    /// Insertion sequence; breaks ties between equal timestamps
    #[sea_orm(primary_key)]
    pub id: i64,
    /// When the action happened
    pub created_at: DateTimeUtc,
    /// What happened, in plain words
    pub description: String,
    /// Action tag
    pub category: ActivityCategory,
    /// Id of the affected record
    pub ref_id: Option<i64>,
}

/// Activity entries reference records loosely and have no foreign keys
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
