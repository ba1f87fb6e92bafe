//! Bounded retry driver for conditional stock writes
//!
//! The stock ledger persists changes with a compare-and-swap keyed on the
//! previously observed value. When the swap misses (another writer got
//! there first) the whole attempt is re-planned from a fresh read, up to a
//! fixed ceiling with a linearly increasing delay between attempts.
//! Exhausting the ceiling surfaces as a retryable conflict to the caller
//! rather than spinning.

use std::future::Future;
use std::time::Duration;

use crate::utils::{AppError, AppResult};

/// Outcome of a single compare-and-swap attempt
pub enum CasOutcome<T> {
    /// The conditional write applied
    Applied(T),
    /// The observed value changed under us; re-plan and try again
    Conflict,
}

/// Retry ceiling and backoff for conditional writes
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Suggested client retry delay once the ceiling is exhausted
    pub fn retry_after_ms(&self) -> u64 {
        (self.base_delay.as_millis() as u64) * u64::from(self.max_attempts)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(50))
    }
}

/// Run `attempt` until it applies, conflicts out, or fails hard.
///
/// Each attempt is expected to re-read current state, compute its candidate
/// update and issue the conditional write. Non-conflict errors abort
/// immediately. Backoff between attempts is `attempt_index * base_delay`.
///
/// `attempt` builds a fresh future per call. Callers pass `|| async move`
/// closures whose captures are plain copies (shared references, small
/// values), so the returned future is `Send` whenever the captures are and
/// the overall call can be driven from spawned tasks.
pub async fn retry_cas<T, F, Fut>(policy: &RetryPolicy, mut attempt: F) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<CasOutcome<T>>>,
{
    for n in 1..=policy.max_attempts {
        match attempt().await? {
            CasOutcome::Applied(value) => return Ok(value),
            CasOutcome::Conflict if n < policy.max_attempts => {
                tokio::time::sleep(policy.base_delay * n).await;
            }
            CasOutcome::Conflict => break,
        }
    }

    Err(AppError::StockConflict {
        retry_after_ms: policy.retry_after_ms(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn applies_on_first_attempt() {
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let result = retry_cas(&fast_policy(3), || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(CasOutcome::Applied(42))
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_until_applied() {
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let result = retry_cas(&fast_policy(3), || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Ok(CasOutcome::Conflict)
            } else {
                Ok(CasOutcome::Applied("done"))
            }
        })
        .await;
        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausting_ceiling_is_a_stock_conflict() {
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let result: AppResult<()> = retry_cas(&fast_policy(3), || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(CasOutcome::Conflict)
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match result {
            Err(AppError::StockConflict { retry_after_ms }) => assert_eq!(retry_after_ms, 3),
            other => panic!("expected StockConflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn hard_errors_abort_immediately() {
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let result: AppResult<()> = retry_cas(&fast_policy(3), || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(AppError::Database("boom".to_string()))
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(AppError::Database(_))));
    }

    #[tokio::test]
    async fn driver_future_can_be_spawned() {
        let policy = fast_policy(2);
        let handle = tokio::spawn(async move {
            retry_cas(&policy, || async move { Ok(CasOutcome::Applied(7)) }).await
        });
        assert_eq!(handle.await.unwrap().unwrap(), 7);
    }
}
