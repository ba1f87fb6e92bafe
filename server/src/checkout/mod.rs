//! Checkout Module
//!
//! Server-side pricing and the transactional reservation-to-order
//! conversion.

pub mod committer;
pub mod pricing;

pub use committer::{CheckoutRequest, CustomerIdentity, OrderCommitter};
pub use pricing::Totals;
