//! Retry policy and executor

use log::{debug, info, warn};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Exponential backoff bounded by a deadline
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Give up once this much time has passed since the first attempt
    pub timeout: Duration,

    /// Delay after the first failed attempt
    pub initial_delay: Duration,

    /// Maximum delay between retries
    pub max_delay: Duration,

    /// Growth factor applied per attempt (e.g., 2.0 for doubling)
    pub base: f64,
}

impl RetryPolicy {
    /// Retry for as long as `timeout` allows, backing off from 100ms up to 2s
    pub fn until(timeout: Duration) -> Self {
        Self {
            timeout,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
            base: 2.0,
        }
    }

    /// Delay after a failed attempt (1-indexed): initial_delay * base^(attempt-1)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let multiplier = self.base.powi(attempt.min(i32::MAX as u32) as i32 - 1);
        let nanos = self.initial_delay.as_nanos() as f64 * multiplier;
        Duration::from_nanos(nanos.min(u64::MAX as f64) as u64).min(self.max_delay)
    }
}

/// Trait for errors that can be retried
pub trait Retryable {
    /// Whether this error is retryable
    fn is_retryable(&self) -> bool;
}

/// Retry executor
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Run `f` until it succeeds, fails with a non-retryable error, or the
    /// next delay would pass the deadline
    pub async fn execute<F, Fut, T, E>(&self, mut f: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + std::fmt::Display,
    {
        let started = Instant::now();
        let mut attempt = 1;

        loop {
            debug!("Executing attempt {}", attempt);

            let error = match f().await {
                Ok(result) => {
                    if attempt > 1 {
                        info!("Operation succeeded after {} attempts", attempt);
                    }
                    return Ok(result);
                }
                Err(error) => error,
            };

            if !error.is_retryable() {
                warn!("Operation failed with non-retryable error: {}", error);
                return Err(RetryError::NonRetryableError(error));
            }

            let delay = self.policy.delay_for_attempt(attempt);
            let elapsed = started.elapsed();
            if elapsed + delay > self.policy.timeout {
                warn!(
                    "Operation still failing after {:?} ({} attempts): {}",
                    elapsed, attempt, error
                );
                return Err(RetryError::TimedOut {
                    timeout: self.policy.timeout,
                    attempts: attempt,
                    last_error: error,
                });
            }

            debug!("Attempt {} failed: {}. Retrying in {:?}", attempt, error, delay);
            sleep(delay).await;
            attempt += 1;
        }
    }
}

/// Retry error types
#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
    /// Deadline reached while the error was still retryable
    #[error("Timed out after {timeout:?} ({attempts} attempts). Last error: {last_error}")]
    TimedOut {
        timeout: Duration,
        attempts: u32,
        last_error: E,
    },

    /// Non-retryable error encountered
    #[error("{0}")]
    NonRetryableError(E),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[derive(Debug, Clone)]
    struct TestError {
        retryable: bool,
        message: String,
    }

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.message)
        }
    }

    impl Retryable for TestError {
        fn is_retryable(&self) -> bool {
            self.retryable
        }
    }

    #[test]
    fn test_exponential_delay_with_cap() {
        let policy = RetryPolicy {
            timeout: Duration::from_secs(10),
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(500),
            base: 2.0,
        };

        assert_eq!(policy.delay_for_attempt(0), Duration::ZERO);
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(400));
        assert_eq!(policy.delay_for_attempt(4), Duration::from_millis(500));
        assert_eq!(policy.delay_for_attempt(u32::MAX), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_success_after_failures() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let executor = RetryExecutor::new(RetryPolicy::until(Duration::from_secs(10)));

        let result = executor
            .execute(|| {
                let count = counter_clone.fetch_add(1, Ordering::Relaxed);
                async move {
                    if count < 3 {
                        Err(TestError {
                            retryable: true,
                            message: "not yet".to_string(),
                        })
                    } else {
                        Ok("Success".to_string())
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "Success");
        assert_eq!(counter.load(Ordering::Relaxed), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_error_stops_immediately() {
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = attempts.clone();
        let executor = RetryExecutor::new(RetryPolicy::until(Duration::from_secs(10)));

        let result: Result<(), RetryError<TestError>> = executor
            .execute(|| {
                attempts_clone.fetch_add(1, Ordering::Relaxed);
                async {
                    Err(TestError {
                        retryable: false,
                        message: "Non-retryable".to_string(),
                    })
                }
            })
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, RetryError::NonRetryableError(_)));
        assert_eq!(err.to_string(), "Non-retryable");
        assert_eq!(attempts.load(Ordering::Relaxed), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_bounds_retries() {
        let executor = RetryExecutor::new(RetryPolicy::until(Duration::from_secs(10)));
        let started = Instant::now();

        let result: Result<(), RetryError<TestError>> = executor
            .execute(|| async {
                Err(TestError {
                    retryable: true,
                    message: "still missing".to_string(),
                })
            })
            .await;

        match result.unwrap_err() {
            RetryError::TimedOut {
                timeout,
                attempts,
                last_error,
            } => {
                assert_eq!(timeout, Duration::from_secs(10));
                assert!(attempts > 1);
                assert_eq!(last_error.to_string(), "still missing");
            }
            other => panic!("expected timeout, got {}", other),
        }
        assert!(started.elapsed() <= Duration::from_secs(10));
    }
}
