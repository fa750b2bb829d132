//! Transient fault retry wrapper
//!
//! Store calls run through a [`RetryPolicy`]. Only
//! [`LedgerError::TransientStorage`] is retried; every other error returns
//! on the first attempt. Attempt `i` (0-based) that fails transiently is
//! followed by a sleep of `base_delay * 2^i` unless it was the last one.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

use cf_core::{LedgerError, LedgerResult};

use crate::error::DbError;

/// What an exhausted retry run reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransientFailurePolicy {
    /// Return the last transient error
    Propagate,
    /// Return an empty result; reads only
    EmptyResult,
}

impl FromStr for TransientFailurePolicy {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "propagate" | "error" => Ok(Self::Propagate),
            "empty_result" | "empty" | "null" => Ok(Self::EmptyResult),
            other => Err(DbError::Configuration(format!(
                "unknown transient failure policy: {}",
                other
            ))),
        }
    }
}

/// Retry policy
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub on_transient_failure: TransientFailurePolicy,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            on_transient_failure: TransientFailurePolicy::Propagate,
        }
    }
}

impl RetryPolicy {
    /// Policy that runs the operation exactly once
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// Calculate delay after the failed 0-based attempt
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Run `op` until it succeeds, fails terminally, or attempts run out.
    ///
    /// `Ok(None)` means every attempt failed transiently and the policy
    /// is [`TransientFailurePolicy::EmptyResult`].
    pub async fn run<T, F, Fut>(&self, operation: &str, mut op: F) -> LedgerResult<Option<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = LedgerResult<T>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut last_error: Option<LedgerError> = None;

        for attempt in 0..attempts {
            match op().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(operation, attempt, "Store operation succeeded after retry");
                    }
                    return Ok(Some(value));
                }
                Err(e) if e.is_transient() => {
                    if attempt + 1 < attempts {
                        let delay = self.delay_for_attempt(attempt);
                        warn!(
                            operation,
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %e,
                            "Transient storage fault, retrying"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        let error = last_error.unwrap_or_else(|| {
            LedgerError::TransientStorage(format!("{} made no attempts", operation))
        });
        match self.on_transient_failure {
            TransientFailurePolicy::Propagate => {
                warn!(operation, attempts, error = %error, "Retries exhausted");
                Err(error)
            }
            TransientFailurePolicy::EmptyResult => {
                warn!(
                    operation,
                    attempts,
                    error = %error,
                    "Retries exhausted, returning empty result"
                );
                Ok(None)
            }
        }
    }

    /// [`run`](Self::run) for listing reads; an empty result becomes `T::default()`
    pub async fn read<T, F, Fut>(&self, operation: &str, op: F) -> LedgerResult<T>
    where
        T: Default,
        F: FnMut() -> Fut,
        Fut: Future<Output = LedgerResult<T>>,
    {
        Ok(self.run(operation, op).await?.unwrap_or_default())
    }

    /// [`run`](Self::run) that always propagates exhaustion.
    ///
    /// Used for writes and single-record lookups, where an empty result
    /// would be mistaken for a real answer.
    pub async fn strict<T, F, Fut>(&self, operation: &str, op: F) -> LedgerResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = LedgerResult<T>>,
    {
        let policy = Self {
            on_transient_failure: TransientFailurePolicy::Propagate,
            ..self.clone()
        };
        policy.run(operation, op).await?.ok_or_else(|| {
            LedgerError::TransientStorage(format!("{} exhausted its retries", operation))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    fn transient() -> LedgerError {
        LedgerError::TransientStorage("ECONNRESET".to_string())
    }

    /// Fails transiently `failures` times, then returns the attempt count
    fn flaky(
        calls: Arc<AtomicU32>,
        failures: u32,
    ) -> impl FnMut() -> std::future::Ready<LedgerResult<u32>> {
        move || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n <= failures {
                std::future::ready(Err(transient()))
            } else {
                std::future::ready(Ok(n))
            }
        }
    }

    #[test]
    fn test_delay_for_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(500));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(2000));
        // saturates instead of overflowing
        assert!(policy.delay_for_attempt(64) >= Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_transient_faults() {
        let calls = Arc::new(AtomicU32::new(0));
        let start = Instant::now();

        let result = RetryPolicy::default()
            .run("test", flaky(calls.clone(), 2))
            .await
            .unwrap();

        assert_eq!(result, Some(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 500ms after the first failure, 1000ms after the second
        assert_eq!(start.elapsed(), Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_read_returns_empty() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy {
            on_transient_failure: TransientFailurePolicy::EmptyResult,
            ..Default::default()
        };
        let start = Instant::now();

        let result = policy.run("test", flaky(calls.clone(), u32::MAX)).await.unwrap();

        assert_eq!(result, None);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // no sleep after the final attempt
        assert_eq!(start.elapsed(), Duration::from_millis(1500));

        let calls = Arc::new(AtomicU32::new(0));
        let value = policy.read("test", flaky(calls, u32::MAX)).await.unwrap();
        assert_eq!(value, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_strict_run_propagates() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy {
            on_transient_failure: TransientFailurePolicy::EmptyResult,
            ..Default::default()
        };

        let err = policy
            .strict("test", flaky(calls.clone(), u32::MAX))
            .await
            .unwrap_err();

        assert!(err.is_transient());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_errors_are_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let start = Instant::now();

        let err = RetryPolicy::default()
            .run("test", move || {
                counter.fetch_add(1, Ordering::SeqCst);
                std::future::ready(Err::<(), _>(LedgerError::DuplicateEvent("0xabc".into())))
            })
            .await
            .unwrap_err();

        assert_eq!(err, LedgerError::DuplicateEvent("0xabc".into()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_retry_policy_runs_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let err = RetryPolicy::no_retry()
            .run("test", flaky(calls.clone(), 1))
            .await
            .unwrap_err();
        assert!(err.is_transient());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
