//! Retry controller: exponential backoff with jitter around one fallible call.

use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

use super::LlmError;

/// Coarse failure kinds the retry policy is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureClass {
    RateLimited,
    InternalServerError,
    BadGateway,
    ServiceUnavailable,
    GatewayTimeout,
    /// Any other 4xx: malformed request, bad credential, unknown model.
    Client,
    /// Any other non-success status.
    Server,
    /// Connect/TLS/timeout failure with no HTTP status.
    Transport,
    /// Not an upstream failure at all (configuration, parsing, deadline).
    Local,
}

impl FailureClass {
    pub fn from_status(status: u16) -> Self {
        match status {
            429 => Self::RateLimited,
            500 => Self::InternalServerError,
            502 => Self::BadGateway,
            503 => Self::ServiceUnavailable,
            504 => Self::GatewayTimeout,
            400..=499 => Self::Client,
            _ => Self::Server,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt; total attempts = max_retries + 1.
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub multiplier: u32,
    /// Upper bound of the uniform random delay added to every backoff.
    pub jitter: Duration,
    pub retry_on: HashSet<FailureClass>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(500),
            multiplier: 2,
            jitter: Duration::from_millis(200),
            retry_on: HashSet::from([
                FailureClass::RateLimited,
                FailureClass::InternalServerError,
                FailureClass::BadGateway,
                FailureClass::ServiceUnavailable,
                FailureClass::GatewayTimeout,
            ]),
        }
    }
}

impl RetryPolicy {
    pub fn is_retryable(&self, class: FailureClass) -> bool {
        self.retry_on.contains(&class)
    }

    fn jittered(&self, delay: Duration) -> Duration {
        let bound = self.jitter.as_millis() as u64;
        if bound == 0 {
            return delay;
        }
        delay + Duration::from_millis(rand::thread_rng().gen_range(0..=bound))
    }
}

/// Runs `operation` until it succeeds, fails with a non-retryable class, or the
/// retry budget is spent.
///
/// Non-retryable failures return the underlying error after a single attempt.
/// Exhausting the budget on retryable failures returns
/// `LlmError::TransientUpstream` wrapping the last error.
pub async fn execute_with_retry<T, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, LlmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
{
    let mut attempt: u32 = 0;
    let mut delay = policy.initial_delay;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        let class = err.class();
        if !policy.is_retryable(class) {
            return Err(err);
        }
        if attempt >= policy.max_retries {
            return Err(LlmError::TransientUpstream {
                attempts: attempt + 1,
                source: Box::new(err),
            });
        }

        let wait = policy.jittered(delay);
        warn!(
            "LLM call attempt {} failed ({:?}: {}), retrying after {}ms...",
            attempt + 1,
            class,
            err,
            wait.as_millis()
        );
        tokio::time::sleep(wait).await;

        attempt += 1;
        delay = delay.saturating_mul(policy.multiplier);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn api(status: u16) -> LlmError {
        LlmError::Api {
            status,
            message: format!("status {status}"),
        }
    }

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            jitter: Duration::ZERO,
            ..RetryPolicy::default()
        }
    }

    #[test]
    fn test_default_policy_matches_documented_values() {
        let p = RetryPolicy::default();
        assert_eq!(p.max_retries, 3);
        assert_eq!(p.initial_delay, Duration::from_millis(500));
        assert_eq!(p.multiplier, 2);
        assert_eq!(p.jitter, Duration::from_millis(200));
        for class in [
            FailureClass::RateLimited,
            FailureClass::InternalServerError,
            FailureClass::BadGateway,
            FailureClass::ServiceUnavailable,
            FailureClass::GatewayTimeout,
        ] {
            assert!(p.is_retryable(class), "{class:?} should be retryable");
        }
        assert!(!p.is_retryable(FailureClass::Client));
        assert!(!p.is_retryable(FailureClass::Transport));
        assert!(!p.is_retryable(FailureClass::Local));
    }

    #[test]
    fn test_status_classification() {
        assert_eq!(FailureClass::from_status(429), FailureClass::RateLimited);
        assert_eq!(FailureClass::from_status(500), FailureClass::InternalServerError);
        assert_eq!(FailureClass::from_status(502), FailureClass::BadGateway);
        assert_eq!(FailureClass::from_status(503), FailureClass::ServiceUnavailable);
        assert_eq!(FailureClass::from_status(504), FailureClass::GatewayTimeout);
        assert_eq!(FailureClass::from_status(400), FailureClass::Client);
        assert_eq!(FailureClass::from_status(403), FailureClass::Client);
        assert_eq!(FailureClass::from_status(501), FailureClass::Server);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_error_makes_exactly_one_attempt() {
        for max_retries in [0, 1, 3, 10] {
            for status in [400, 401, 403, 404] {
                let calls = AtomicU32::new(0);
                let result: Result<(), _> = execute_with_retry(&policy(max_retries), || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async move { Err(api(status)) }
                })
                .await;

                assert!(matches!(result, Err(LlmError::Api { status: s, .. }) if s == status));
                assert_eq!(calls.load(Ordering::SeqCst), 1);
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_retryable_error_makes_n_plus_one_attempts() {
        for max_retries in [0, 1, 3, 5] {
            let calls = AtomicU32::new(0);
            let result: Result<(), _> = execute_with_retry(&policy(max_retries), || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(api(503)) }
            })
            .await;

            match result {
                Err(LlmError::TransientUpstream { attempts, source }) => {
                    assert_eq!(attempts, max_retries + 1);
                    assert!(matches!(*source, LlmError::Api { status: 503, .. }));
                }
                other => panic!("expected TransientUpstream, got {other:?}"),
            }
            assert_eq!(calls.load(Ordering::SeqCst), max_retries + 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_transient_failures_returns_value() {
        let calls = AtomicU32::new(0);
        let result = execute_with_retry(&policy(3), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(api(429))
                } else {
                    Ok("done")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_after_retryable_stops_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = execute_with_retry(&policy(5), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { Err(if n == 0 { api(502) } else { api(400) }) }
        })
        .await;

        assert!(matches!(result, Err(LlmError::Api { status: 400, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_doubles_between_attempts() {
        let start = tokio::time::Instant::now();
        let result: Result<(), _> =
            execute_with_retry(&policy(3), || async { Err(api(500)) }).await;

        assert!(result.is_err());
        // 500ms + 1000ms + 2000ms
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(3500), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_millis(3600), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_retry_set_can_include_transport() {
        let mut p = policy(1);
        p.retry_on.insert(FailureClass::Transport);
        p.retry_on.remove(&FailureClass::RateLimited);

        let calls = AtomicU32::new(0);
        let _: Result<(), _> = execute_with_retry(&p, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(api(429)) }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_jitter_stays_within_bound() {
        let p = RetryPolicy::default();
        let base = Duration::from_millis(500);
        for _ in 0..200 {
            let d = p.jittered(base);
            assert!(d >= base && d <= base + p.jitter, "{d:?}");
        }
    }
}
