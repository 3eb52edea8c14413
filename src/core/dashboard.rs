//! Dashboard statistics - business-wide totals and the recent activity feed.
//!
//! All totals are derived from the ledgers (payments and expenses), never from the cached
//! counters on events.

use crate::{
    core::derive,
    entities::{Event, Expense, Payment, PaymentType, event, payment},
    errors::Result,
};
use chrono::{DateTime, Utc};
use sea_orm::prelude::*;
use serde::Serialize;
use std::{cmp::Ordering, collections::HashMap};

/// Kind of entry in the recent activity feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    /// Money received against an event
    Payment,
    /// A new event and its budget
    Event,
}

impl FeedKind {
    /// Payments sort ahead of events that share a timestamp.
    const fn rank(self) -> u8 {
        match self {
            Self::Payment => 0,
            Self::Event => 1,
        }
    }
}

/// One row of the recent activity feed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    /// Payment or event
    pub kind: FeedKind,
    /// Id of the payment or event row
    pub id: i64,
    /// Event the entry concerns
    pub event_id: i64,
    /// Event name at the time of the query
    pub event_name: String,
    /// Payment amount, or the event budget for event entries
    pub amount: f64,
    /// Payment type, for payment entries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_type: Option<PaymentType>,
    /// When it happened
    pub date: DateTime<Utc>,
}

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Sum of every event's pending balance
    pub total_pending: f64,
    /// Number of events on file
    pub active_events: u64,
    /// Sum of every payment received
    pub total_revenue: f64,
    /// Sum of every expense
    pub total_expenses: f64,
    /// Newest events and payments
    pub recent_activity: Vec<FeedItem>,
}

/// Newest first; equal timestamps put payments ahead of events, then higher ids first.
fn feed_order(a: &FeedItem, b: &FeedItem) -> Ordering {
    b.date
        .cmp(&a.date)
        .then_with(|| a.kind.rank().cmp(&b.kind.rank()))
        .then_with(|| b.id.cmp(&a.id))
}

/// Merges events and payments into a single feed of at most `limit` items.
#[must_use]
pub fn merge_recent_activity(
    events: &[event::Model],
    payments: &[payment::Model],
    limit: usize,
) -> Vec<FeedItem> {
    let names: HashMap<i64, &str> = events.iter().map(|e| (e.id, e.name.as_str())).collect();

    let mut feed: Vec<FeedItem> = events
        .iter()
        .map(|e| FeedItem {
            kind: FeedKind::Event,
            id: e.id,
            event_id: e.id,
            event_name: e.name.clone(),
            amount: e.total_budget,
            payment_type: None,
            date: e.created_at,
        })
        .chain(payments.iter().map(|p| FeedItem {
            kind: FeedKind::Payment,
            id: p.id,
            event_id: p.event_id,
            event_name: names.get(&p.event_id).copied().unwrap_or_default().to_string(),
            amount: p.amount,
            payment_type: Some(p.payment_type),
            date: p.date,
        }))
        .collect();

    feed.sort_by(feed_order);
    feed.truncate(limit);
    feed
}

/// Sum of pending balances over all events, each derived from its own payments.
#[must_use]
pub fn total_pending(events: &[event::Model], payments: &[payment::Model]) -> f64 {
    let mut received: HashMap<i64, Vec<payment::Model>> = HashMap::new();
    for p in payments {
        received.entry(p.event_id).or_default().push(p.clone());
    }

    events
        .iter()
        .map(|e| {
            let paid = received
                .get(&e.id)
                .map_or(0.0, |ledger| derive::event_received_amount(ledger));
            derive::event_pending_balance(e.total_budget, paid)
        })
        .sum()
}

/// Computes the dashboard with a feed of `recent_limit` items.
pub async fn get_dashboard_stats(
    db: &DatabaseConnection,
    recent_limit: u64,
) -> Result<DashboardStats> {
    let events = Event::find().all(db).await?;
    let payments = Payment::find().all(db).await?;
    let expenses = Expense::find().all(db).await?;

    let limit = usize::try_from(recent_limit).unwrap_or(usize::MAX);
    let stats = DashboardStats {
        total_pending: total_pending(&events, &payments),
        active_events: events.len() as u64,
        total_revenue: derive::event_received_amount(&payments),
        total_expenses: expenses.iter().map(|e| e.amount).sum(),
        recent_activity: merge_recent_activity(&events, &payments, limit),
    };
    tracing::debug!(
        events = stats.active_events,
        total_pending = stats.total_pending,
        "computed dashboard stats"
    );
    Ok(stats)
}
