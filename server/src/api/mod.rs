//! API Routes
//!
//! # Structure
//!
//! - [`health`] - liveness check (public)
//! - [`products`] - catalog listing (public) and admin creation
//! - [`cart`] - reservation lifecycle (authenticated)
//! - [`checkout`] - direct order commitment and order reads (authenticated)
//! - [`payments`] - signature-verified payment webhook
//! - [`maintenance`] - admin-triggered reservation sweep

use axum::Router;
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::core::AppState;

pub mod cart;
pub mod checkout;
pub mod health;
pub mod maintenance;
pub mod payments;
pub mod products;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};

#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// All routes, no middleware, no state
pub fn build_router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(products::router())
        .merge(cart::router())
        .merge(checkout::router())
        .merge(payments::router())
        .merge(maintenance::router())
}

/// Routes plus the middleware stack
pub fn build_app() -> Router<AppState> {
    build_router()
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static("x-request-id"),
            XRequestId,
        ))
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            "x-request-id",
        )))
}
