//! Core business logic - framework-agnostic operations over the database.
//!
//! Each module owns one kind of record. Write paths keep ledgers and their cached counters
//! consistent inside database transactions; read paths derive balances through [`derive`].

pub mod activity;
pub mod auth;
pub mod client;
pub mod dashboard;
pub mod derive;
pub mod event;
pub mod expense;
pub mod payment;
pub mod reconcile;
pub mod report;
pub mod staff;
pub mod staff_log;
pub mod sub_event;

#[cfg(test)]
mod scenarios;
