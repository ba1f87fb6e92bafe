//! Reservation (cart) Model
//!
//! One reservation per customer: the record key is the customer key, which
//! makes the uniqueness constraint structural. Stock held by a reservation
//! has already been decremented from the product; deleting the reservation
//! without releasing (or converting) that stock would strand it, so every
//! mutation runs inside one transaction with the matching stock write.

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

pub const RESERVATION_TABLE: &str = "reservation";

/// One held line: (product, variant) pairs are unique within a reservation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservedItem {
    pub product: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    pub quantity: i64,
}

/// Per-customer reservation with TTL-tracked timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub customer: RecordId,
    pub items: Vec<ReservedItem>,
    /// Unix millis; refreshed on every mutation, compared against the TTL
    pub reserved_at: i64,
}

impl Reservation {
    /// Record id for a customer's reservation
    pub fn record_id(customer_key: &str) -> RecordId {
        RecordId::from_table_key(RESERVATION_TABLE, customer_key)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn find_line(&self, product: &RecordId, variant: Option<&str>) -> Option<&ReservedItem> {
        self.items
            .iter()
            .find(|line| &line.product == product && line.variant.as_deref() == variant)
    }

    /// Merge a grant into the line list: increments an existing
    /// (product, variant) line instead of duplicating it.
    pub fn merged_items(
        &self,
        product: &RecordId,
        variant: Option<&str>,
        granted: i64,
    ) -> Vec<ReservedItem> {
        let mut items = self.items.clone();
        match items
            .iter_mut()
            .find(|line| &line.product == product && line.variant.as_deref() == variant)
        {
            Some(line) => line.quantity += granted,
            None => items.push(ReservedItem {
                product: product.clone(),
                variant: variant.map(str::to_string),
                quantity: granted,
            }),
        }
        items
    }

    /// Line list after removing `qty` from a line; the line disappears when
    /// its quantity reaches zero.
    pub fn decremented_items(
        &self,
        product: &RecordId,
        variant: Option<&str>,
        qty: i64,
    ) -> Vec<ReservedItem> {
        self.items
            .iter()
            .filter_map(|line| {
                if &line.product == product && line.variant.as_deref() == variant {
                    let remaining = line.quantity - qty;
                    if remaining > 0 {
                        let mut kept = line.clone();
                        kept.quantity = remaining;
                        Some(kept)
                    } else {
                        None
                    }
                } else {
                    Some(line.clone())
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(key: &str) -> RecordId {
        RecordId::from_table_key("product", key)
    }

    fn reservation(items: Vec<ReservedItem>) -> Reservation {
        Reservation {
            id: Some(Reservation::record_id("alice")),
            customer: RecordId::from_table_key("customer", "alice"),
            items,
            reserved_at: 0,
        }
    }

    #[test]
    fn merge_increments_existing_line() {
        let resv = reservation(vec![ReservedItem {
            product: product("tee"),
            variant: Some("M".to_string()),
            quantity: 2,
        }]);

        let items = resv.merged_items(&product("tee"), Some("M"), 3);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 5);
    }

    #[test]
    fn merge_distinguishes_variants() {
        let resv = reservation(vec![ReservedItem {
            product: product("tee"),
            variant: Some("M".to_string()),
            quantity: 2,
        }]);

        let items = resv.merged_items(&product("tee"), Some("L"), 1);
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn decrement_removes_line_at_zero() {
        let resv = reservation(vec![ReservedItem {
            product: product("tee"),
            variant: None,
            quantity: 2,
        }]);

        let items = resv.decremented_items(&product("tee"), None, 2);
        assert!(items.is_empty());

        let items = resv.decremented_items(&product("tee"), None, 5);
        assert!(items.is_empty(), "over-decrement also removes the line");
    }

    #[test]
    fn decrement_keeps_remainder() {
        let resv = reservation(vec![ReservedItem {
            product: product("tee"),
            variant: None,
            quantity: 5,
        }]);

        let items = resv.decremented_items(&product("tee"), None, 2);
        assert_eq!(items[0].quantity, 3);
    }
}
