//! Transaction helpers
//!
//! Cross-record mutations (stock + reservation, or reservation + order +
//! coupon + customer) run as one multi-statement SurrealDB transaction.
//! Statements are chained onto a single request between `BEGIN` and
//! `COMMIT`; guard statements `THROW` a short reason string which aborts
//! the whole unit, so no partial writes are ever retained.

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use surrealdb::method::Query;

/// Guard reasons thrown inside transactions
pub const STOCK_CONFLICT: &str = "stock_conflict";
pub const RESERVATION_GONE: &str = "reservation_gone";
pub const COUPON_USED: &str = "coupon_used";

/// Error from a transactional unit
#[derive(Debug, thiserror::Error)]
pub enum TxnError {
    /// A guard statement threw: the reason string it was built with
    #[error("transaction aborted: {0}")]
    Abort(String),

    /// The storage engine detected a concurrent write; safe to re-plan
    #[error("transaction conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Db(String),
}

impl TxnError {
    /// True when the caller may re-read state and try the unit again
    pub fn is_retryable(&self) -> bool {
        match self {
            TxnError::Abort(reason) => reason == STOCK_CONFLICT,
            TxnError::Conflict(_) => true,
            TxnError::Db(_) => false,
        }
    }

    pub fn aborted_with(&self, reason: &str) -> bool {
        matches!(self, TxnError::Abort(r) if r == reason)
    }
}

/// Start a transaction chain
pub fn begin(db: &Surreal<Db>) -> Query<'_, Db> {
    db.query("BEGIN TRANSACTION")
}

/// Close the chain with a commit
pub fn commit(query: Query<'_, Db>) -> Query<'_, Db> {
    query.query("COMMIT TRANSACTION")
}

/// Execute the chain, classifying failures.
///
/// A `THROW` anywhere in the unit cancels every statement, so the useful
/// reason has to be fished out of the per-statement errors rather than
/// taken from the first one.
pub async fn run(query: Query<'_, Db>) -> Result<(), TxnError> {
    let mut response = query.await.map_err(|e| classify(&e.to_string()))?;
    let errors = response.take_errors();
    if errors.is_empty() {
        return Ok(());
    }

    // Prefer an explicit guard reason over engine noise
    for err in errors.values() {
        let msg = err.to_string();
        if let Some(reason) = extract_thrown(&msg) {
            return Err(TxnError::Abort(reason));
        }
    }

    let first = errors
        .values()
        .next()
        .map(|e| e.to_string())
        .unwrap_or_else(|| "unknown transaction error".to_string());
    Err(classify(&first))
}

fn classify(msg: &str) -> TxnError {
    if let Some(reason) = extract_thrown(msg) {
        return TxnError::Abort(reason);
    }
    let lower = msg.to_lowercase();
    if lower.contains("conflict") || lower.contains("already exists") {
        return TxnError::Conflict(msg.to_string());
    }
    TxnError::Db(msg.to_string())
}

/// Extract the reason from a `THROW 'reason'` error message
fn extract_thrown(msg: &str) -> Option<String> {
    msg.split("An error occurred: ")
        .nth(1)
        .map(|rest| rest.trim().trim_matches('\'').to_string())
}
