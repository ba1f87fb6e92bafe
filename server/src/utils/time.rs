//! Time helpers
//!
//! All persisted timestamps are Unix epoch milliseconds (i64).

use chrono::Utc;

/// Current time as Unix epoch milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
