//! Retry-with-backoff and per-attempt timeouts for startup fetches.
//!
//! Backoff delays use fixed formulas (no jitter) so tests running on a
//! paused clock observe exact timings.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::ClientError;

/// Pause inserted before each retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// The same pause before every retry.
    Constant(Duration),
    /// `first` before the first retry, twice as long before each later one,
    /// never longer than `ceiling`.
    Doubling {
        /// Pause before the first retry.
        first: Duration,
        /// Longest pause.
        ceiling: Duration,
    },
}

impl Backoff {
    /// Pause before the retry that follows `failed` failed attempts
    /// (the first retry follows one failure).
    #[must_use]
    pub fn pause(self, failed: u32) -> Duration {
        match self {
            Self::Constant(pause) => pause,
            Self::Doubling { first, ceiling } => {
                let doublings = failed.saturating_sub(1);
                let factor = 1u32.checked_shl(doublings).unwrap_or(u32::MAX);
                first.saturating_mul(factor).min(ceiling)
            }
        }
    }
}

/// How a startup fetch is bounded and repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. Zero means one attempt only.
    pub max_retries: u32,
    /// Pause between attempts.
    pub backoff: Backoff,
    /// Deadline applied to each attempt separately.
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Backoff::Doubling {
                first: Duration::from_millis(200),
                ceiling: Duration::from_secs(5),
            },
            attempt_timeout: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// A single attempt that still gives up after `attempt_timeout`.
    #[must_use]
    pub fn once(attempt_timeout: Duration) -> Self {
        Self {
            max_retries: 0,
            backoff: Backoff::Constant(Duration::ZERO),
            attempt_timeout,
        }
    }

    /// Runs `attempt_fn` until it succeeds, fails with a non-retryable error,
    /// or the retry budget is exhausted.
    ///
    /// # Errors
    ///
    /// Returns the last error observed. An attempt that exceeds
    /// `attempt_timeout` yields `ClientError::Timeout`.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut attempt_fn: F) -> Result<T, ClientError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let mut failed = 0;
        loop {
            let outcome = match tokio::time::timeout(self.attempt_timeout, attempt_fn()).await {
                Ok(result) => result,
                Err(_) => Err(ClientError::Timeout {
                    operation: operation.to_owned(),
                    elapsed_ms: u64::try_from(self.attempt_timeout.as_millis())
                        .unwrap_or(u64::MAX),
                }),
            };

            match outcome {
                Err(err) if err.is_retryable() && failed < self.max_retries => {
                    failed += 1;
                    let delay = self.backoff.pause(failed);
                    warn!(
                        operation,
                        attempt = failed,
                        backoff_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "retrying after failure"
                    );
                    tokio::time::sleep(delay).await;
                }
                other => return other,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            backoff: Backoff::Constant(Duration::from_millis(10)),
            attempt_timeout: Duration::from_millis(100),
        }
    }

    #[test]
    fn test_doubling_pause_grows_until_ceiling() {
        let backoff = RetryPolicy::default().backoff;

        assert_eq!(backoff.pause(1), Duration::from_millis(200));
        assert_eq!(backoff.pause(2), Duration::from_millis(400));
        assert_eq!(backoff.pause(3), Duration::from_millis(800));
        assert_eq!(backoff.pause(11), Duration::from_secs(5));
        assert_eq!(backoff.pause(80), Duration::from_secs(5));
    }

    #[test]
    fn test_once_never_retries() {
        let policy = RetryPolicy::once(Duration::from_secs(2));

        assert_eq!(policy.max_retries, 0);
        assert_eq!(policy.backoff.pause(1), Duration::ZERO);
        assert_eq!(policy.attempt_timeout, Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_retries_transient_failures_then_succeeds() {
        // Arrange
        let calls = Arc::new(AtomicU32::new(0));
        let policy = fast_policy(3);

        // Act
        let counter = Arc::clone(&calls);
        let result = policy
            .run("session", move || {
                let counter = Arc::clone(&counter);
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(ClientError::Transport("connection reset".into()))
                    } else {
                        Ok("sid")
                    }
                }
            })
            .await;

        // Assert
        assert_eq!(result, Ok("sid"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_does_not_retry_client_errors() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = fast_policy(3);

        let counter = Arc::clone(&calls);
        let result: Result<(), _> = policy
            .run("dataset", move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(ClientError::Status {
                        status: 404,
                        url: "http://api.test/alice/datasets/a".into(),
                    })
                }
            })
            .await;

        assert!(matches!(result, Err(ClientError::Status { status: 404, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_times_out_hung_attempts_and_gives_up() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = fast_policy(1);

        let counter = Arc::clone(&calls);
        let result: Result<(), _> = policy
            .run("user", move || {
                counter.fetch_add(1, Ordering::SeqCst);
                std::future::pending()
            })
            .await;

        match result {
            Err(ClientError::Timeout {
                operation,
                elapsed_ms,
            }) => {
                assert_eq!(operation, "user");
                assert_eq!(elapsed_ms, 100);
            }
            other => panic!("expected Timeout, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
