//! Bounded exponential backoff around a single request.

use std::future::Future;
use std::time::Duration;

use grokipedia_core::{GrokipediaError, Result};
use tracing::{info, warn};

/// How a `RateLimited` answer from the service is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RateLimitPolicy {
    /// Return `RateLimited` to the caller immediately.
    #[default]
    Surface,
    /// Treat `RateLimited` like a transient failure and back off.
    Retry,
    /// Once the policy gives up on `RateLimited`, wait and run it one more time.
    WaitAndRetryOnce(Duration),
}

impl RateLimitPolicy {
    /// Wait used by `WaitAndRetryOnce` when none is configured.
    pub const DEFAULT_WAIT: Duration = Duration::from_secs(5);
}

/// Retry configuration for one logical request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub retry_rate_limited: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(10),
            retry_rate_limited: false,
        }
    }
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// A `max` below `initial` is raised to `initial`.
    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_backoff = initial;
        self.max_backoff = max.max(initial);
        self
    }

    pub fn with_retry_rate_limited(mut self, retry: bool) -> Self {
        self.retry_rate_limited = retry;
        self
    }

    /// A policy that makes exactly one attempt.
    pub fn none() -> Self {
        Self::default().with_max_attempts(1)
    }

    /// Whether `err` is worth another attempt under this policy.
    pub fn should_retry(&self, err: &GrokipediaError) -> bool {
        match err {
            GrokipediaError::RateLimited(_) => self.retry_rate_limited,
            GrokipediaError::GateClosed => false,
            other => other.is_transient(),
        }
    }

    /// Delay before attempt number `attempt` (1-based). The first attempt never waits.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        if attempt < 2 {
            return Duration::ZERO;
        }
        let exponent = (attempt - 2).min(31);
        self.initial_backoff
            .saturating_mul(1u32 << exponent)
            .min(self.max_backoff)
    }

    /// Run `op` on the current thread, sleeping between attempts.
    pub fn run_blocking<T, F>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => {
                    if attempt > 1 {
                        info!("Request succeeded on attempt {}", attempt);
                    }
                    return Ok(value);
                }
                Err(e) if attempt < self.max_attempts && self.should_retry(&e) => {
                    attempt += 1;
                    let delay = self.backoff_for(attempt);
                    warn!("Attempt {} failed: {}; retrying in {:?}", attempt - 1, e, delay);
                    std::thread::sleep(delay);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Run `op` on the async runtime, sleeping between attempts.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => {
                    if attempt > 1 {
                        info!("Request succeeded on attempt {}", attempt);
                    }
                    return Ok(value);
                }
                Err(e) if attempt < self.max_attempts && self.should_retry(&e) => {
                    attempt += 1;
                    let delay = self.backoff_for(attempt);
                    warn!("Attempt {} failed: {}; retrying in {:?}", attempt - 1, e, delay);
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Run `op` under `policy`, then apply the rate-limit fallback if configured.
pub fn execute_blocking<T, F>(policy: &RetryPolicy, rate_limit: RateLimitPolicy, mut op: F) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    match policy.run_blocking(&mut op) {
        Err(GrokipediaError::RateLimited(msg)) => match rate_limit {
            RateLimitPolicy::WaitAndRetryOnce(wait) => {
                warn!("Rate limited ({}); waiting {:?} before one more try", msg, wait);
                std::thread::sleep(wait);
                policy.run_blocking(&mut op)
            }
            _ => Err(GrokipediaError::RateLimited(msg)),
        },
        other => other,
    }
}

/// Async counterpart of [`execute_blocking`].
pub async fn execute<T, F, Fut>(policy: &RetryPolicy, rate_limit: RateLimitPolicy, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    match policy.run(&mut op).await {
        Err(GrokipediaError::RateLimited(msg)) => match rate_limit {
            RateLimitPolicy::WaitAndRetryOnce(wait) => {
                warn!("Rate limited ({}); waiting {:?} before one more try", msg, wait);
                tokio::time::sleep(wait).await;
                policy.run(&mut op).await
            }
            _ => Err(GrokipediaError::RateLimited(msg)),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast() -> RetryPolicy {
        RetryPolicy::default().with_backoff(Duration::ZERO, Duration::ZERO)
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.initial_backoff, Duration::from_secs(1));
        assert_eq!(policy.max_backoff, Duration::from_secs(10));
        assert!(!policy.retry_rate_limited);
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_for(1), Duration::ZERO);
        assert_eq!(policy.backoff_for(2), Duration::from_secs(1));
        assert_eq!(policy.backoff_for(3), Duration::from_secs(2));
        assert_eq!(policy.backoff_for(4), Duration::from_secs(4));
        assert_eq!(policy.backoff_for(5), Duration::from_secs(8));
        assert_eq!(policy.backoff_for(6), Duration::from_secs(10));
        assert_eq!(policy.backoff_for(200), Duration::from_secs(10));
    }

    #[test]
    fn test_should_retry_only_transient() {
        let policy = RetryPolicy::default();
        assert!(policy.should_retry(&GrokipediaError::malformed("x")));
        assert!(policy.should_retry(&GrokipediaError::Timeout { timeout_secs: 1 }));
        assert!(!policy.should_retry(&GrokipediaError::not_found("x")));
        assert!(!policy.should_retry(&GrokipediaError::rate_limited("x")));
        assert!(!policy.should_retry(&GrokipediaError::Api {
            status: 500,
            message: String::new()
        }));
        assert!(!policy.should_retry(&GrokipediaError::GateClosed));

        let policy = policy.with_retry_rate_limited(true);
        assert!(policy.should_retry(&GrokipediaError::rate_limited("x")));
    }

    #[test]
    fn test_two_failures_then_success_takes_three_calls() {
        let calls = Cell::new(0);
        let result = fast().run_blocking(|| {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(GrokipediaError::malformed("connection reset"))
            } else {
                Ok("done")
            }
        });

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_not_found_is_not_retried() {
        let calls = Cell::new(0);
        let result: Result<()> = fast().run_blocking(|| {
            calls.set(calls.get() + 1);
            Err(GrokipediaError::not_found("Page not found: X"))
        });

        assert!(matches!(result, Err(GrokipediaError::NotFound(_))));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_last_error_is_returned_unchanged() {
        let calls = Cell::new(0);
        let result: Result<()> = fast().run_blocking(|| {
            calls.set(calls.get() + 1);
            Err(GrokipediaError::malformed(format!("failure {}", calls.get())))
        });

        match result {
            Err(GrokipediaError::Malformed(msg)) => assert_eq!(msg, "failure 3"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_wait_and_retry_once_runs_policy_again() {
        let calls = Cell::new(0);
        let result = execute_blocking(
            &fast(),
            RateLimitPolicy::WaitAndRetryOnce(Duration::ZERO),
            || {
                calls.set(calls.get() + 1);
                if calls.get() == 1 {
                    Err(GrokipediaError::rate_limited("429"))
                } else {
                    Ok(7)
                }
            },
        );

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_surface_policy_returns_rate_limited() {
        let calls = Cell::new(0);
        let result: Result<()> = execute_blocking(&fast(), RateLimitPolicy::Surface, || {
            calls.set(calls.get() + 1);
            Err(GrokipediaError::rate_limited("429"))
        });

        assert!(matches!(result, Err(GrokipediaError::RateLimited(_))));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_async_success_first_try() {
        let calls = AtomicU32::new(0);
        let result = tokio_test::block_on(fast().run(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, GrokipediaError>("ok") }
        }));

        tokio_test::assert_ok!(result);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_async_backoff_waits_one_then_two_seconds() {
        let calls = AtomicU32::new(0);
        let start = tokio::time::Instant::now();

        let result: Result<()> = RetryPolicy::default()
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(GrokipediaError::Timeout { timeout_secs: 60 }) }
            })
            .await;

        assert!(matches!(result, Err(GrokipediaError::Timeout { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_async_rate_limit_retry_policy() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::default().with_retry_rate_limited(true);

        let result = execute(&policy, RateLimitPolicy::Retry, || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 2 {
                    Err(GrokipediaError::rate_limited("429"))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_async_wait_and_retry_once_sleeps_configured_delay() {
        let calls = AtomicU32::new(0);
        let start = tokio::time::Instant::now();

        let result: Result<()> = execute(
            &RetryPolicy::default(),
            RateLimitPolicy::WaitAndRetryOnce(RateLimitPolicy::DEFAULT_WAIT),
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(GrokipediaError::rate_limited("429")) }
            },
        )
        .await;

        assert!(matches!(result, Err(GrokipediaError::RateLimited(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(start.elapsed(), Duration::from_secs(5));
    }
}
