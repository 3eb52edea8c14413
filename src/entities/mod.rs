//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod activity_log;
pub mod client;
pub mod event;
pub mod expense;
pub mod expense_category;
pub mod payment;
pub mod staff;
pub mod staff_log;
pub mod sub_event;

// Re-export specific types to avoid conflicts
pub use activity_log::{
    ActivityCategory, Column as ActivityLogColumn, Entity as ActivityLog,
    Model as ActivityLogModel,
};
pub use client::{Column as ClientColumn, Entity as Client, Model as ClientModel};
pub use event::{Column as EventColumn, Entity as Event, Model as EventModel};
pub use expense::{Column as ExpenseColumn, Entity as Expense, Model as ExpenseModel};
pub use expense_category::{
    Column as ExpenseCategoryColumn, Entity as ExpenseCategory, Model as ExpenseCategoryModel,
};
pub use payment::{Column as PaymentColumn, Entity as Payment, Model as PaymentModel, PaymentType};
pub use staff::{Column as StaffColumn, Entity as Staff, Model as StaffModel, StaffStatus};
pub use staff_log::{
    Column as StaffLogColumn, Entity as StaffLog, Model as StaffLogModel, StaffLogType,
};
pub use sub_event::{Column as SubEventColumn, Entity as SubEvent, Model as SubEventModel, PhaseStatus};
