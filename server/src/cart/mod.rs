//! Cart Module
//!
//! The per-customer reservation lifecycle: holding stock against a cart
//! and giving it back when lines shrink, carts clear, or holds expire.

pub mod reaper;
pub mod store;

pub use reaper::ExpiryReaper;
pub use store::{CartLine, ReleaseReceipt, ReservationStore, ReserveReceipt};
