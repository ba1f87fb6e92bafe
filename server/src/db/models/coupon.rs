//! Coupon Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

pub const COUPON_TABLE: &str = "coupon";

/// Discount coupon with monotonically increasing usage counters.
/// Per-customer single use is tracked on the customer record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub code: String,
    /// Percentage off the subtotal (0-100)
    pub discount_percent: i64,
    /// Unix millis; unusable after this instant
    pub expires_at: i64,
    #[serde(default)]
    pub total_usage: i64,
    /// Lifetime discount amount granted through this coupon
    #[serde(default)]
    pub total_discount_given: f64,
}

impl Coupon {
    pub fn is_expired(&self, now_millis: i64) -> bool {
        now_millis > self.expires_at
    }
}
