use std::future::Future;
use std::time::Duration;
use sync_core::SyncError;
use tracing::warn;

/// Bounded retries with exponential backoff.
///
/// The delay after failed attempt `n` (0-based) is `backoff_unit * 2^n`.
/// Only `Transient` errors are retried; once attempts run out the last error
/// is escalated to `Fatal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff_unit: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_unit: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_unit,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff_unit.saturating_mul(2u32.saturating_pow(attempt))
    }

    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T, SyncError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SyncError>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_transient() => return Err(e),
                Err(e) if attempt + 1 >= self.max_attempts => {
                    return Err(SyncError::fatal(format!(
                        "{what} failed after {} attempts: {}",
                        self.max_attempts,
                        e.message()
                    )));
                }
                Err(e) => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        "{what} failed (attempt {}/{}), retrying in {:?}: {}",
                        attempt + 1,
                        self.max_attempts,
                        delay,
                        e.message()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(10, Duration::from_secs(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use sync_core::ErrorKind;

    #[test]
    fn test_delays_double() {
        let policy = RetryPolicy::new(10, Duration::from_millis(100));
        assert_eq!(policy.delay_for(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for(4), Duration::from_millis(1600));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_transient_failures() {
        let calls = &AtomicU32::new(0);
        let policy = RetryPolicy::new(5, Duration::from_secs(1));
        let started = tokio::time::Instant::now();

        let value = policy
            .run("fetch", || async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(SyncError::transient("timeout"))
                } else {
                    Ok(7)
                }
            })
            .await
            .unwrap();

        assert_eq!(value, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 1s + 2s of backoff
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_are_fatal() {
        let calls = &AtomicU32::new(0);
        let policy = RetryPolicy::new(10, Duration::from_millis(10));

        let err = policy
            .run("fetch", || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(SyncError::transient("timeout"))
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Fatal);
        assert!(err.message().contains("10 attempts"));
        assert_eq!(calls.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn test_non_transient_errors_are_not_retried() {
        let calls = &AtomicU32::new(0);
        let policy = RetryPolicy::default();

        let err = policy
            .run("fetch", || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(SyncError::not_allowed("auth_user"))
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotAllowed);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
