//! Cart API
//!
//! Reservation lifecycle for the authenticated customer.

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/cart", cart_routes())
}

fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::read).delete(handler::clear))
        .route("/reserve", post(handler::reserve))
        .route(
            "/items",
            put(handler::update_quantity).delete(handler::remove_item),
        )
}
