//! Exponential backoff for oracle calls.
//!
//! Delays grow geometrically from `initial_delay` by `multiplier`, capped at
//! `max_delay`. Retrying stops when the next sleep would cross `deadline`, or
//! immediately on an error the predicate rejects.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::warn;

use super::LlmError;

/// Which failures are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryOn {
    /// Every error, regardless of cause.
    #[default]
    AnyError,
    /// Only failures where `LlmError::is_transient` holds.
    TransientOnly,
}

impl RetryOn {
    fn should_retry(self, err: &LlmError) -> bool {
        match self {
            RetryOn::AnyError => true,
            RetryOn::TransientOnly => err.is_transient(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub initial_delay: Duration,
    pub multiplier: f64,
    pub max_delay: Duration,
    /// Total time budget across all attempts. `None` retries forever.
    pub deadline: Option<Duration>,
    pub retry_on: RetryOn,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            multiplier: 2.0,
            max_delay: Duration::from_secs(60),
            deadline: Some(Duration::from_secs(120)),
            retry_on: RetryOn::AnyError,
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the `retry`-th failure (0-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
        let secs = self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent);
        let capped = secs.min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(capped.max(0.0))
    }

    /// Runs `op` until it succeeds, the predicate rejects an error, or the deadline
    /// would be exceeded by the next sleep.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, LlmError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LlmError>>,
    {
        let started = Instant::now();
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            let err = match op().await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            if !self.retry_on.should_retry(&err) {
                warn!("LLM call attempt {attempts} failed with non-retryable error: {err}");
                return Err(err);
            }

            let delay = self.delay_for(attempts - 1);
            if let Some(deadline) = self.deadline {
                if started.elapsed() + delay > deadline {
                    return Err(LlmError::RetriesExhausted {
                        attempts,
                        last: Box::new(err),
                    });
                }
            }

            warn!(
                "LLM call attempt {} failed ({}), retrying after {}ms...",
                attempts,
                err,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn api_error(status: u16) -> LlmError {
        LlmError::Api {
            status,
            message: "boom".to_string(),
        }
    }

    #[test]
    fn test_delays_double_and_cap_at_sixty() {
        let policy = RetryPolicy::default();
        let delays: Vec<u64> = (0..9).map(|n| policy.delay_for(n).as_secs()).collect();
        assert_eq!(delays, vec![1, 2, 4, 8, 16, 32, 60, 60, 60]);
    }

    #[test]
    fn test_delay_for_huge_retry_index_stays_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(u32::MAX), Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_failures_then_success_waits_one_then_two_seconds() {
        let policy = RetryPolicy::default();
        let calls = AtomicU32::new(0);
        let started = Instant::now();

        let result = policy
            .run(|| async {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(api_error(503))
                } else {
                    Ok("done".to_string())
                }
            })
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(3), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_secs(4), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_any_error_retries_client_errors_too() {
        let policy = RetryPolicy::default();
        let calls = AtomicU32::new(0);

        let result = policy
            .run(|| async {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(api_error(400))
                } else {
                    Ok(1)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_only_does_not_retry_bad_request() {
        let policy = RetryPolicy {
            retry_on: RetryOn::TransientOnly,
            ..RetryPolicy::default()
        };
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = policy
            .run(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(api_error(400))
            })
            .await;

        assert!(matches!(result, Err(LlmError::Api { status: 400, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_stops_after_seven_attempts() {
        // Sleeps of 1+2+4+8+16+32 = 63s fit; the next 60s sleep would cross 120s.
        let policy = RetryPolicy::default();
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = policy
            .run(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(api_error(500))
            })
            .await;

        match result {
            Err(LlmError::RetriesExhausted { attempts, last }) => {
                assert_eq!(attempts, 7);
                assert!(matches!(*last, LlmError::Api { status: 500, .. }));
            }
            other => panic!("expected RetriesExhausted, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 7);
    }
}
