//! Repository Module
//!
//! Read and single-record write access per table. Cross-record mutations
//! (stock + reservation, commit units) are composed as transactions in the
//! service layer instead.

pub mod coupon;
pub mod customer;
pub mod order;
pub mod product;
pub mod reservation;

pub use coupon::CouponRepository;
pub use customer::CustomerRepository;
pub use order::OrderRepository;
pub use product::ProductRepository;
pub use reservation::ReservationRepository;

use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// ID convention: `surrealdb::RecordId` end to end. External input may carry
// either a bare key ("abc") or the full "table:abc" form; `record_id`
// normalizes both.

/// Build a RecordId from a bare key or a "table:key" string
pub fn record_id(table: &str, id: &str) -> RecordId {
    let key = id.strip_prefix(&format!("{table}:")).unwrap_or(id);
    RecordId::from_table_key(table, key)
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}
