//! Bounded exponential backoff for external I/O
//!
//! Retry behavior is applied explicitly at each call site that talks to the
//! catalog, the search cluster, or the watermark store by wrapping the
//! operation closure in [`with_retries`]. Non-transient errors (see
//! [`CinesyncError::is_transient`]) fail immediately.

use crate::config::RetryConfig;
use crate::domain::{CinesyncError, Result};
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Run `operation` until it succeeds, a non-transient error occurs, or the
/// attempt ceiling is reached.
///
/// The delay between attempts grows by `backoff_multiplier` from
/// `initial_delay_ms`, is capped at `max_delay_ms`, and carries a small
/// random jitter so concurrent callers don't reconnect in lockstep.
///
/// # Errors
///
/// Returns the last error once retries are exhausted, or the first error
/// that is not transient.
pub async fn with_retries<T, F, Fut>(policy: &RetryConfig, what: &str, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                attempt += 1;
                if !e.is_transient() || attempt >= policy.max_retries {
                    return Err(e);
                }

                let delay = delay_for_attempt(policy, attempt);
                tracing::warn!(
                    operation = what,
                    attempt = attempt,
                    max_retries = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Retrying after transient error"
                );

                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Delay before the given (1-based) retry attempt
fn delay_for_attempt(policy: &RetryConfig, attempt: usize) -> Duration {
    let exponent = (attempt - 1) as f64;
    let base = policy.initial_delay_ms as f64 * policy.backoff_multiplier.powf(exponent);
    let capped = base.min(policy.max_delay_ms as f64);

    let jitter = rand::thread_rng().gen_range(0.0..=0.1);
    Duration::from_millis((capped * (1.0 + jitter)) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fast_policy() -> RetryConfig {
        RetryConfig {
            max_retries: 3,
            initial_delay_ms: 1,
            max_delay_ms: 2,
            backoff_multiplier: 2.0,
        }
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let calls = AtomicUsize::new(0);
        let result = with_retries(&fast_policy(), "noop", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, CinesyncError>(7)
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transient_error_retried_until_success() {
        let calls = AtomicUsize::new(0);
        let result = with_retries(&fast_policy(), "flaky", || async {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(CinesyncError::Database("connection reset".to_string()))
            } else {
                Ok(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhaustion_returns_last_error() {
        let calls = AtomicUsize::new(0);
        let result: Result<()> = with_retries(&fast_policy(), "down", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(CinesyncError::Database("still down".to_string()))
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_configuration_error_not_retried() {
        let calls = AtomicUsize::new(0);
        let result: Result<()> = with_retries(&fast_policy(), "misconfigured", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(CinesyncError::Configuration("bad mapping".to_string()))
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_delay_capped() {
        let policy = RetryConfig {
            max_retries: 10,
            initial_delay_ms: 100,
            max_delay_ms: 400,
            backoff_multiplier: 2.0,
        };

        let late = delay_for_attempt(&policy, 8);
        assert!(late.as_millis() <= 440);
    }
}
