//! Inventory Module
//!
//! The stock ledger and its supporting pieces: the pure stock value type,
//! the conditional-write planner and the bounded retry driver.

pub mod ledger;
pub mod retry;
pub mod stock;

pub use ledger::{PlannedReserve, StockLedger, StockWrite};
pub use retry::{CasOutcome, RetryPolicy, retry_cas};
pub use stock::{Stock, StockError};
