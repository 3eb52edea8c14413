//! Route handlers grouped by resource.

pub mod auth;
pub mod clients;
pub mod events;
pub mod expenses;
pub mod payments;
pub mod staff;
pub mod stats;
pub mod sub_events;

use crate::api::AppState;
use axum::Router;

/// Every `/api` route, without state attached.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(clients::router())
        .merge(events::router())
        .merge(sub_events::router())
        .merge(payments::router())
        .merge(expenses::router())
        .merge(staff::router())
        .merge(stats::router())
}
