//! Expense entity - An append-only account-book entry.
//!
//! An expense may belong to an event or be a general business expense.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Expense database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    /// Unique identifier for the expense
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Event this expense was incurred for, None for general expenses
    pub event_id: Option<i64>,
    /// What the money was spent on
    pub title: String,
    /// Amount spent in rupees, always positive
    pub amount: f64,
    /// Category, None when uncategorised
    pub category_id: Option<i64>,
    /// When the money was spent
    pub date: DateTimeUtc,
}

/// Defines relationships between Expense and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Weak reference to an event
    #[sea_orm(
        belongs_to = "super::event::Entity",
        from = "Column::EventId",
        to = "super::event::Column::Id",
        on_delete = "SetNull"
    )]
    Event,
    /// Each expense may belong to one category
    #[sea_orm(
        belongs_to = "super::expense_category::Entity",
        from = "Column::CategoryId",
        to = "super::expense_category::Column::Id",
        on_delete = "SetNull"
    )]
    Category,
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl Related<super::expense_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
