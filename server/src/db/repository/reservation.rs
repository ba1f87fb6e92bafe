//! Reservation Repository
//!
//! Read-side access only. Reservation writes always travel with their
//! matching stock writes inside one transaction, composed in
//! `cart::ReservationStore` and `checkout::OrderCommitter`.

use super::{BaseRepository, RepoResult};
use crate::db::models::Reservation;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct ReservationRepository {
    base: BaseRepository,
}

impl ReservationRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// A customer's reservation, if any (record key = customer key)
    pub async fn find_by_customer(&self, customer_key: &str) -> RepoResult<Option<Reservation>> {
        let reservation: Option<Reservation> = self
            .base
            .db()
            .select(Reservation::record_id(customer_key))
            .await?;
        Ok(reservation)
    }

    /// Reservations whose `reserved_at` precedes the cutoff, oldest first
    pub async fn find_expired(&self, cutoff_millis: i64) -> RepoResult<Vec<Reservation>> {
        let expired: Vec<Reservation> = self
            .base
            .db()
            .query("SELECT * FROM reservation WHERE reserved_at < $cutoff ORDER BY reserved_at")
            .bind(("cutoff", cutoff_millis))
            .await?
            .take(0)?;
        Ok(expired)
    }
}
