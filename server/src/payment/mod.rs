//! Payment Module
//!
//! The webhook-driven payment confirmation path: signature verification,
//! the processed-session marker and the idempotent processor.

pub mod processor;
pub mod session_cache;
pub mod signature;

pub use processor::{NotificationKind, PaymentNotification, PaymentProcessor, ProcessOutcome};
pub use session_cache::ProcessedSessions;
