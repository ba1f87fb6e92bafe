//! Checkout API
//!
//! Direct (cash-on-delivery style) order commitment plus order reads and
//! the admin status transition.

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/checkout", post(handler::commit))
        .route("/api/orders", get(handler::list_orders))
        .route("/api/orders/{id}", get(handler::get_order))
        .route("/api/orders/{id}/status", put(handler::update_status))
}
