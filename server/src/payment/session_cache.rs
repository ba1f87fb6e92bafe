//! Processed-session marker
//!
//! Process-local fast path for webhook deduplication. The durable check is
//! always the order lookup by session id; this cache only closes the short
//! window where two deliveries of the same notification race before the
//! first order write lands. Entries are time-boxed and swept so the map
//! stays bounded over a long uptime.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::utils::now_millis;

#[derive(Clone)]
pub struct ProcessedSessions {
    inner: Arc<DashMap<String, i64>>,
    retention: chrono::Duration,
}

impl ProcessedSessions {
    pub fn new(retention: chrono::Duration) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            retention,
        }
    }

    /// Claim a session for processing. Returns false when another delivery
    /// already holds the claim.
    pub fn mark(&self, session_id: &str) -> bool {
        match self.inner.entry(session_id.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(now_millis());
                true
            }
        }
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.inner.contains_key(session_id)
    }

    /// Release a claim after a failed commit so a retried delivery can
    /// attempt again.
    pub fn unmark(&self, session_id: &str) {
        self.inner.remove(session_id);
    }

    /// Drop entries older than the retention window
    pub fn sweep(&self, now_millis: i64) {
        let cutoff = now_millis - self.retention.num_milliseconds();
        self.inner.retain(|_, marked_at| *marked_at >= cutoff);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Spawn the periodic sweep keeping the map bounded
    pub fn spawn_sweeper(self, interval: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.sweep(now_millis());
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_mark_wins() {
        let cache = ProcessedSessions::new(chrono::Duration::hours(1));
        assert!(cache.mark("cs_1"));
        assert!(!cache.mark("cs_1"));
        assert!(cache.contains("cs_1"));
    }

    #[test]
    fn unmark_releases_the_claim() {
        let cache = ProcessedSessions::new(chrono::Duration::hours(1));
        assert!(cache.mark("cs_1"));
        cache.unmark("cs_1");
        assert!(cache.mark("cs_1"));
    }

    #[test]
    fn sweep_drops_stale_entries() {
        let cache = ProcessedSessions::new(chrono::Duration::milliseconds(10));
        cache.mark("cs_old");
        cache.sweep(now_millis() + 1_000);
        assert!(cache.is_empty());
    }
}
