//! Retry middleware with exponential backoff
//!
//! Wraps a fallible async operation with bounded retries. The delay doubles
//! after every failed attempt, starting from the configured initial delay:
//! pure exponential backoff, no jitter, and no sleep after the final attempt.
//! The middleware knows nothing about what the operation does; callers must
//! ensure it is safe to repeat (re-PUTting the same bytes is naturally
//! idempotent at the target, which is why uploads qualify).

use crate::config::RetryConfig;
use crate::error::{Error, Result};
use crate::observer::Observer;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Trait for errors that can be classified as retryable or not
///
/// Transient failures (connection errors, unexpected server statuses) should
/// return `true`. Structural failures (bad layout, unparsable filename, empty
/// file) should return `false`.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        // Only transport-level trouble is worth a second attempt; everything
        // else reflects the input or the configuration and will fail again.
        matches!(
            self,
            Error::Transport(_) | Error::UnexpectedStatus { .. }
        )
    }
}

/// Execute an async operation with bounded retries and exponential backoff.
///
/// Runs `operation` up to `config.max_attempts` times. A success returns
/// immediately; a non-retryable error is returned as-is without further
/// attempts; exhausting all attempts returns [`Error::RetryExhausted`]
/// wrapping the last observed error. One diagnostic event is emitted to the
/// observer per attempt, success or failure.
///
/// The cancellation token is consulted before each inter-attempt sleep:
/// cancelling interrupts the backoff and returns [`Error::Cancelled`] without
/// invoking the operation again.
///
/// # Errors
///
/// `config.max_attempts == 0` is a configuration error, returned without
/// invoking the operation.
pub async fn retry_with_backoff<T, F, Fut>(
    config: &RetryConfig,
    observer: &dyn Observer,
    cancel: &CancellationToken,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    if config.max_attempts == 0 {
        return Err(Error::config(
            "retry.max_attempts must be at least 1",
            Some("retry.max_attempts"),
        ));
    }

    let mut delay = config.initial_delay;
    let mut attempt = 1u32;

    loop {
        match operation().await {
            Ok(value) => {
                observer.debug(&format!(
                    "attempt {attempt}/{} succeeded",
                    config.max_attempts
                ));
                return Ok(value);
            }
            Err(e) if !e.is_retryable() => {
                observer.error(&format!(
                    "attempt {attempt}/{} failed permanently: {e}",
                    config.max_attempts
                ));
                return Err(e);
            }
            Err(e) if attempt >= config.max_attempts => {
                observer.error(&format!(
                    "attempt {attempt}/{} failed: {e}",
                    config.max_attempts
                ));
                return Err(Error::RetryExhausted {
                    attempts: config.max_attempts,
                    source: Box::new(e),
                });
            }
            Err(e) => {
                observer.error(&format!(
                    "attempt {attempt}/{} failed: {e}, retrying in {delay:?}",
                    config.max_attempts
                ));
                tokio::select! {
                    _ = cancel.cancelled() => return Err(Error::Cancelled),
                    _ = tokio::time::sleep(delay) => {}
                }
                delay *= 2;
                attempt += 1;
            }
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NoopObserver;
    use crate::observer::testing::CollectingObserver;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn transient() -> Error {
        Error::UnexpectedStatus {
            status: 503,
            url: "http://nexus.example.com/repository/releases/a".to_string(),
        }
    }

    fn permanent() -> Error {
        Error::EmptySource {
            path: "/tmp/a.jar".into(),
        }
    }

    fn policy(max_attempts: u32, initial_delay: Duration) -> RetryConfig {
        RetryConfig {
            max_attempts,
            initial_delay,
        }
    }

    #[tokio::test]
    async fn success_on_first_attempt_runs_once() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();
        let cancel = CancellationToken::new();

        let result = retry_with_backoff(
            &policy(3, Duration::from_millis(10)),
            &NoopObserver,
            &cancel,
            || {
                let counter = counter_clone.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, Error>(42)
                }
            },
        )
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 1, "should only call once");
    }

    #[tokio::test]
    async fn fails_twice_then_succeeds_with_two_sleeps() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();
        let cancel = CancellationToken::new();

        let start = std::time::Instant::now();
        let result = retry_with_backoff(
            &policy(3, Duration::from_millis(20)),
            &NoopObserver,
            &cancel,
            || {
                let counter = counter_clone.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(transient())
                    } else {
                        Ok(201u16)
                    }
                }
            },
        )
        .await;
        let elapsed = start.elapsed();

        assert_eq!(result.unwrap(), 201);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        // Two sleeps: 20ms then 40ms. Upper bound generous for CI.
        assert!(
            elapsed >= Duration::from_millis(60),
            "should back off 20ms then 40ms, waited {elapsed:?}"
        );
        assert!(elapsed < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn exhaustion_wraps_the_last_error_with_the_attempt_count() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();
        let cancel = CancellationToken::new();

        let result: Result<u16> = retry_with_backoff(
            &policy(2, Duration::from_millis(10)),
            &NoopObserver,
            &cancel,
            || {
                let counter = counter_clone.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(transient())
                }
            },
        )
        .await;

        assert_eq!(counter.load(Ordering::SeqCst), 2, "exactly two invocations");
        match result.unwrap_err() {
            Error::RetryExhausted { attempts, source } => {
                assert_eq!(attempts, 2);
                assert!(matches!(*source, Error::UnexpectedStatus { status: 503, .. }));
            }
            other => panic!("expected RetryExhausted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn permanent_error_is_not_retried() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();
        let cancel = CancellationToken::new();

        let result: Result<u16> = retry_with_backoff(
            &policy(5, Duration::from_millis(10)),
            &NoopObserver,
            &cancel,
            || {
                let counter = counter_clone.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(permanent())
                }
            },
        )
        .await;

        assert!(matches!(result.unwrap_err(), Error::EmptySource { .. }));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_max_attempts_is_a_config_error_without_invoking_the_operation() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();
        let cancel = CancellationToken::new();

        let result: Result<u16> = retry_with_backoff(
            &policy(0, Duration::from_millis(10)),
            &NoopObserver,
            &cancel,
            || {
                let counter = counter_clone.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(0u16)
                }
            },
        )
        .await;

        assert!(matches!(result.unwrap_err(), Error::Config { .. }));
        assert_eq!(counter.load(Ordering::SeqCst), 0, "operation never invoked");
    }

    #[tokio::test]
    async fn backoff_delays_double() {
        let timestamps = Arc::new(tokio::sync::Mutex::new(Vec::new()));
        let ts_clone = timestamps.clone();
        let cancel = CancellationToken::new();

        let _result: Result<u16> = retry_with_backoff(
            &policy(3, Duration::from_millis(50)),
            &NoopObserver,
            &cancel,
            || {
                let ts = ts_clone.clone();
                async move {
                    ts.lock().await.push(std::time::Instant::now());
                    Err(transient())
                }
            },
        )
        .await;

        let ts = timestamps.lock().await;
        assert_eq!(ts.len(), 3, "three attempts, two sleeps");

        let gap1 = ts[1].duration_since(ts[0]);
        let gap2 = ts[2].duration_since(ts[1]);
        assert!(
            gap1 >= Duration::from_millis(40),
            "first delay should be ~50ms, was {gap1:?}"
        );
        assert!(
            gap2 >= Duration::from_millis(80),
            "second delay should be ~100ms, was {gap2:?}"
        );
    }

    #[tokio::test]
    async fn one_observer_event_per_attempt() {
        let observer = CollectingObserver::default();
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();
        let cancel = CancellationToken::new();

        let result = retry_with_backoff(
            &policy(3, Duration::from_millis(5)),
            &observer,
            &cancel,
            || {
                let counter = counter_clone.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 1 {
                        Err(transient())
                    } else {
                        Ok(200u16)
                    }
                }
            },
        )
        .await;

        assert!(result.is_ok());
        assert_eq!(observer.count(), 2, "one event per attempt");
        let messages = observer.messages();
        assert_eq!(messages[0].0, "error");
        assert_eq!(messages[1].0, "debug");
    }

    #[tokio::test]
    async fn cancellation_interrupts_the_backoff_sleep() {
        let cancel = CancellationToken::new();
        let sleeper = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            sleeper.cancel();
        });

        let start = std::time::Instant::now();
        let result: Result<u16> = retry_with_backoff(
            &policy(3, Duration::from_secs(60)),
            &NoopObserver,
            &cancel,
            || async { Err(transient()) },
        )
        .await;

        assert!(matches!(result.unwrap_err(), Error::Cancelled));
        assert!(
            start.elapsed() < Duration::from_secs(5),
            "cancellation must not wait out the 60s backoff"
        );
    }
}
