//! Payments API
//!
//! The provider-facing webhook. Authenticated by HMAC signature over the
//! raw body, not by JWT.

mod handler;

use axum::{Router, routing::post};

use crate::core::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/payments/webhook", post(handler::webhook))
}
