//! Unified Error Handling
//!
//! Provides application-wide error types and response structures:
//! - [`AppError`] - application error enum
//! - [`AppResponse`] - unified API response envelope
//!
//! # Error code layout
//!
//! | Prefix | Category | Example |
//! |--------|----------|---------|
//! | E1xxx  | Inventory / cart | E1001 out of stock |
//! | E2xxx  | Coupons | E2103 coupon already used |
//! | E3xxx  | Authentication | E3002 invalid token |
//! | E9xxx  | System | E9002 database error |

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::db::repository::RepoError;

/// Unified API response structure
///
/// ```json
/// {
///   "code": "E0000",
///   "message": "Success",
///   "data": { ... }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct AppResponse<T> {
    /// Error code (E0000 means success)
    pub code: String,
    /// Human-readable message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

/// Application-level error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== Authentication Errors ==========
    #[error("Authentication required")]
    Unauthorized,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("Invalid webhook signature")]
    InvalidSignature,

    // ========== Inventory / Cart Errors ==========
    #[error("Out of stock: {0}")]
    OutOfStock(String),

    /// Conditional stock update lost the race too many times.
    /// Retryable by the client after `retry_after_ms`.
    #[error("Stock is being modified concurrently, retry later")]
    StockConflict { retry_after_ms: u64 },

    /// Exact-quantity adjustment asked for more than is available
    #[error("Insufficient stock: {available} available")]
    InsufficientStock { available: i64 },

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Item not reserved: {0}")]
    ItemNotReserved(String),

    /// A reserved product vanished mid-commit. Data integrity violation.
    #[error("Reserved product no longer exists: {0}")]
    ProductMissing(String),

    // ========== Coupon Errors ==========
    #[error("Coupon not found: {0}")]
    CouponNotFound(String),

    #[error("Coupon expired: {0}")]
    CouponExpired(String),

    #[error("Coupon already used: {0}")]
    CouponAlreadyUsed(String),

    // ========== Business Logic Errors ==========
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Resource already exists: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    // ========== System Errors ==========
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Invalid request: {0}")]
    Invalid(String),
}

impl AppError {
    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "E3001",
            AppError::InvalidToken => "E3002",
            AppError::TokenExpired => "E3003",
            AppError::InvalidSignature => "E3004",
            AppError::Forbidden(_) => "E2001",
            AppError::OutOfStock(_) => "E1001",
            AppError::StockConflict { .. } => "E1002",
            AppError::InsufficientStock { .. } => "E1005",
            AppError::EmptyCart => "E1003",
            AppError::ItemNotReserved(_) => "E1004",
            AppError::ProductMissing(_) => "E9003",
            AppError::CouponNotFound(_) => "E2101",
            AppError::CouponExpired(_) => "E2102",
            AppError::CouponAlreadyUsed(_) => "E2103",
            AppError::NotFound(_) => "E0003",
            AppError::Conflict(_) => "E0004",
            AppError::Validation(_) => "E0002",
            AppError::BusinessRule(_) => "E0005",
            AppError::Database(_) => "E9002",
            AppError::Internal(_) => "E9001",
            AppError::Invalid(_) => "E0006",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, message) = match &self {
            // Authentication errors (401)
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Please login first".to_string()),
            AppError::TokenExpired => (StatusCode::UNAUTHORIZED, "Token expired".to_string()),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token".to_string()),
            AppError::InvalidSignature => {
                (StatusCode::UNAUTHORIZED, "Invalid webhook signature".to_string())
            }

            // Authorization errors (403)
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),

            // Inventory (409 = caller may retry or abandon)
            AppError::OutOfStock(msg) => (StatusCode::CONFLICT, format!("Out of stock: {msg}")),
            AppError::StockConflict { .. } => (
                StatusCode::CONFLICT,
                "Stock is being modified concurrently, retry later".to_string(),
            ),
            AppError::InsufficientStock { available } => (
                StatusCode::CONFLICT,
                format!("Insufficient stock: {available} available"),
            ),

            // Cart errors (4xx)
            AppError::EmptyCart => (StatusCode::BAD_REQUEST, "Cart is empty".to_string()),
            AppError::ItemNotReserved(msg) => {
                (StatusCode::NOT_FOUND, format!("Item not reserved: {msg}"))
            }

            // Data integrity (500)
            AppError::ProductMissing(msg) => {
                error!(target: "integrity", product = %msg, "Reserved product vanished");
                (StatusCode::INTERNAL_SERVER_ERROR, "Data integrity error".to_string())
            }

            // Coupon errors (422)
            AppError::CouponNotFound(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, format!("Coupon not found: {msg}"))
            }
            AppError::CouponExpired(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, format!("Coupon expired: {msg}"))
            }
            AppError::CouponAlreadyUsed(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, format!("Coupon already used: {msg}"))
            }

            // Not found (404)
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),

            // Conflict (409)
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),

            // Validation (400)
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),

            // Business rule (422)
            AppError::BusinessRule(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),

            // Database errors (500)
            AppError::Database(msg) => {
                error!(target: "database", error = %msg, "Database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }

            // Internal errors (500)
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }

            // Invalid request (400)
            AppError::Invalid(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        let retry_after_ms = match &self {
            AppError::StockConflict { retry_after_ms } => Some(*retry_after_ms),
            _ => None,
        };

        let body = Json(AppResponse::<()> {
            code: code.to_string(),
            message,
            data: None,
            trace_id: None,
        });

        let mut response = (status, body).into_response();

        // Concurrency conflicts carry a retry hint (seconds, rounded up)
        if let Some(ms) = retry_after_ms {
            let secs = ms.div_ceil(1000).max(1);
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound(msg) => AppError::NotFound(msg),
            RepoError::Duplicate(msg) => AppError::Conflict(msg),
            RepoError::Conflict(msg) => AppError::Conflict(msg),
            RepoError::Validation(msg) => AppError::Validation(msg),
            RepoError::Database(msg) => AppError::Database(msg),
        }
    }
}

// ========== Helper functions ==========

/// Create a successful response
pub fn ok<T: Serialize>(data: T) -> Json<AppResponse<T>> {
    Json(AppResponse {
        code: "E0000".to_string(),
        message: "Success".to_string(),
        data: Some(data),
        trace_id: None,
    })
}

/// Create a successful response with custom message
pub fn ok_with_message<T: Serialize>(data: T, message: impl Into<String>) -> Json<AppResponse<T>> {
    Json(AppResponse {
        code: "E0000".to_string(),
        message: message.into(),
        data: Some(data),
        trace_id: None,
    })
}
