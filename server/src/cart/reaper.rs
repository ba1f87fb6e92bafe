//! Expiry Reaper
//!
//! Sweeps reservations whose `reserved_at` precedes `now - TTL` and gives
//! their held stock back. Each reservation is one transactional unit
//! (every release plus the delete), so a crash mid-sweep never strands
//! stock; the next sweep simply picks up whatever is left. The delete is
//! guarded on the observed `reserved_at`, so a cart the user touches
//! mid-sweep is skipped instead of double-released.

use std::time::Duration;

use tracing::{info, warn};

use crate::cart::ReservationStore;
use crate::db::DbService;
use crate::db::repository::ReservationRepository;
use crate::inventory::RetryPolicy;
use crate::utils::AppResult;

#[derive(Clone)]
pub struct ExpiryReaper {
    reservations: ReservationRepository,
    store: ReservationStore,
    ttl: chrono::Duration,
}

impl ExpiryReaper {
    pub fn new(db: &DbService, policy: RetryPolicy, ttl: chrono::Duration) -> Self {
        Self {
            reservations: ReservationRepository::new(db.db.clone()),
            store: ReservationStore::new(db.db.clone(), policy),
            ttl,
        }
    }

    /// Release and delete every reservation older than the TTL.
    /// Returns the number reaped. Safe to invoke repeatedly.
    pub async fn reap(&self, now_millis: i64) -> AppResult<u64> {
        let cutoff = now_millis - self.ttl.num_milliseconds();
        let expired = self.reservations.find_expired(cutoff).await?;
        if expired.is_empty() {
            return Ok(0);
        }

        let mut reaped = 0u64;
        for resv in &expired {
            match self.store.release_all_and_delete(resv).await {
                Ok(()) => reaped += 1,
                // Guard miss: the customer touched the cart after our scan,
                // refreshing its timestamp. It is no longer expired.
                Err(e) if e.is_retryable() => {
                    warn!(customer = %resv.customer, "skipping reservation touched mid-sweep: {e}");
                }
                Err(e) => {
                    warn!(customer = %resv.customer, "failed to reap reservation: {e}");
                }
            }
        }

        info!(candidates = expired.len(), reaped, "reservation sweep complete");
        Ok(reaped)
    }

    /// Spawn a periodic sweep; external schedulers can still trigger
    /// `reap` directly through the maintenance endpoint.
    pub fn spawn_periodic(self, interval: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = self.reap(crate::utils::now_millis()).await {
                    warn!("reservation sweep failed: {e}");
                }
            }
        })
    }
}
