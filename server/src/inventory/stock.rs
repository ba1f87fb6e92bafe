//! Stock value type
//!
//! A product's stock is either a single counter (simple products) or a
//! counter per variant label (size/volume). Both cases share one
//! reserve/release interface; callers never branch on a category string.
//!
//! All operations are pure: they return the next stock value without
//! touching storage. The ledger persists the result with a conditional
//! write keyed on the previously observed value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Per-product stock, scalar or keyed by variant
///
/// Serialized untagged: a bare integer for simple products, an object
/// mapping variant label to quantity otherwise. Quantities are never
/// negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Stock {
    Simple(i64),
    ByVariant(BTreeMap<String, i64>),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StockError {
    #[error("out of stock")]
    OutOfStock,

    #[error("variant is required for this product")]
    VariantRequired,

    #[error("unknown variant: {0}")]
    UnknownVariant(String),

    #[error("product has no variants")]
    VariantNotApplicable,
}

impl Stock {
    /// Currently available quantity for the addressed counter
    pub fn available(&self, variant: Option<&str>) -> Result<i64, StockError> {
        match (self, variant) {
            (Stock::Simple(qty), None) => Ok(*qty),
            (Stock::Simple(_), Some(_)) => Err(StockError::VariantNotApplicable),
            (Stock::ByVariant(map), Some(label)) => map
                .get(label)
                .copied()
                .ok_or_else(|| StockError::UnknownVariant(label.to_string())),
            (Stock::ByVariant(_), None) => Err(StockError::VariantRequired),
        }
    }

    /// Conditional decrement: grants `min(requested, available)`, never
    /// below zero. Fails with [`StockError::OutOfStock`] when nothing is
    /// available. Returns the granted quantity and the next stock value.
    pub fn reserve(&self, variant: Option<&str>, requested: i64) -> Result<(i64, Stock), StockError> {
        let available = self.available(variant)?;
        if available == 0 {
            return Err(StockError::OutOfStock);
        }
        let granted = requested.min(available);
        let next = self.with_quantity(variant, available - granted)?;
        Ok((granted, next))
    }

    /// Unconditional increment, used on cart removal, commit cancellation
    /// and reservation expiry. A missing variant entry is created rather
    /// than dropping the returned units.
    pub fn release(&self, variant: Option<&str>, qty: i64) -> Result<Stock, StockError> {
        match (self, variant) {
            (Stock::Simple(current), None) => Ok(Stock::Simple(current + qty)),
            (Stock::Simple(_), Some(_)) => Err(StockError::VariantNotApplicable),
            (Stock::ByVariant(map), Some(label)) => {
                let mut next = map.clone();
                *next.entry(label.to_string()).or_insert(0) += qty;
                Ok(Stock::ByVariant(next))
            }
            (Stock::ByVariant(_), None) => Err(StockError::VariantRequired),
        }
    }

    fn with_quantity(&self, variant: Option<&str>, qty: i64) -> Result<Stock, StockError> {
        match (self, variant) {
            (Stock::Simple(_), None) => Ok(Stock::Simple(qty)),
            (Stock::ByVariant(map), Some(label)) => {
                if !map.contains_key(label) {
                    return Err(StockError::UnknownVariant(label.to_string()));
                }
                let mut next = map.clone();
                next.insert(label.to_string(), qty);
                Ok(Stock::ByVariant(next))
            }
            (Stock::Simple(_), Some(_)) => Err(StockError::VariantNotApplicable),
            (Stock::ByVariant(_), None) => Err(StockError::VariantRequired),
        }
    }
}
