//! Expense category entity - Lookup table for account-book entries.
//!
//! The "Salary" category is created the first time a staff member is settled.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Expense category database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expense_categories")]
pub struct Model {
    /// Unique identifier for the category
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Category name (e.g., "Petrol", "Salary")
    #[sea_orm(unique)]
    pub name: String,
}

/// Defines relationships between Expense category and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One category has many expenses
    #[sea_orm(has_many = "super::expense::Entity")]
    Expenses,
}

impl Related<super::expense::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
