//! Customer Model
//!
//! Identity and roles come from the external authentication layer; this
//! record only carries the state the reservation subsystem owns: the
//! used-coupon set and the order history list.

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

pub const CUSTOMER_TABLE: &str = "customer";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub name: String,
    /// Coupon codes this customer has already redeemed (single use each)
    #[serde(default)]
    pub used_coupons: Vec<String>,
    /// Order history, newest last
    #[serde(default)]
    pub orders: Vec<RecordId>,
}

impl Customer {
    pub fn record_id(key: &str) -> RecordId {
        RecordId::from_table_key(CUSTOMER_TABLE, key)
    }

    pub fn has_used_coupon(&self, code: &str) -> bool {
        self.used_coupons.iter().any(|c| c == code)
    }
}
