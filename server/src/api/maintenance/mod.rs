//! Maintenance API
//!
//! Admin-triggered operational tasks. External schedulers call these.

mod handler;

use axum::{Router, routing::post};

use crate::core::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api/maintenance/reap-reservations",
        post(handler::reap_reservations),
    )
}
