//! Order Model
//!
//! Orders are immutable snapshots once created; only `status` moves, and
//! only forward. Orders created through the external payment path carry
//! the payment session identifier used for idempotent webhook processing.

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

pub const ORDER_TABLE: &str = "order";

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
}

impl OrderStatus {
    /// Legal forward transition check (pending → processing → shipped → delivered)
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Processing)
                | (OrderStatus::Processing, OrderStatus::Shipped)
                | (OrderStatus::Shipped, OrderStatus::Delivered)
        )
    }
}

/// Line-item snapshot with price at order time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub product: RecordId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    pub unit_price: f64,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub customer: RecordId,
    pub items: Vec<OrderItem>,
    pub shipping_address: String,
    pub payment_method: String,
    /// Server-computed amounts; never taken from client input
    pub subtotal: f64,
    pub shipping_cost: f64,
    pub discount: f64,
    pub final_amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    pub status: OrderStatus,
    /// Idempotency key for webhook-created orders
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_session: Option<String>,
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_only_moves_forward() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Processing));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Shipped));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Delivered));

        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Shipped));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Processing.can_transition_to(OrderStatus::Processing));
    }
}
