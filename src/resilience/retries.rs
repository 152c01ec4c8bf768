//! Retry logic.
//!
//! # Responsibilities
//! - Re-run a failed outbound operation while its failure kind is retryable
//! - Space attempts with exponential backoff (optionally capped and jittered)
//! - Surface the last failure unchanged once retries run out
//!
//! # Design Decisions
//! - The policy is a plain value handed to `run` at each call site
//! - Retryability is decided by `ErrorKind`, never by concrete error types
//! - Non-retryable failures return immediately, with no delay
//! - Waiting uses `tokio::time::sleep`, never a blocking sleep

use std::fmt;
use std::future::Future;
use std::time::Duration;

use crate::config::RetryConfig;
use crate::observability::metrics;
use crate::resilience::backoff::{apply_jitter, calculate_backoff, total_backoff};
use crate::resilience::kind::{Classify, ErrorKind};

/// How an operation is retried.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; total attempts are `max_retries + 1`.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Multiplier applied to the delay after every retry (>= 1).
    pub backoff_factor: f64,
    /// Failure kinds that are worth another attempt.
    pub retryable_kinds: Vec<ErrorKind>,
    /// Upper bound for a single delay.
    pub max_delay: Option<Duration>,
    /// Random extra delay as a fraction of the computed delay, in `[0, 1)`.
    pub jitter_ratio: f64,
}

impl RetryPolicy {
    /// Policy retrying only transient failures.
    pub fn new(max_retries: u32, base_delay: Duration, backoff_factor: f64) -> Self {
        Self {
            max_retries,
            base_delay,
            backoff_factor,
            retryable_kinds: vec![ErrorKind::Transient],
            max_delay: None,
            jitter_ratio: 0.0,
        }
    }

    /// Exactly one attempt.
    pub fn no_retry() -> Self {
        Self::new(0, Duration::ZERO, 1.0)
    }

    pub fn retry_on(mut self, kinds: impl IntoIterator<Item = ErrorKind>) -> Self {
        self.retryable_kinds = kinds.into_iter().collect();
        self
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = Some(max_delay);
        self
    }

    pub fn with_jitter(mut self, ratio: f64) -> Self {
        self.jitter_ratio = ratio;
        self
    }

    pub fn is_retryable(&self, kind: ErrorKind) -> bool {
        self.retryable_kinds.contains(&kind)
    }

    /// Delay before retry number `retry` (1-based), without jitter.
    pub fn delay_for(&self, retry: u32) -> Duration {
        calculate_backoff(retry, self.base_delay, self.backoff_factor, self.max_delay)
    }

    /// Longest total time spent sleeping when every attempt fails.
    pub fn worst_case_wait(&self) -> Duration {
        total_backoff(self.max_retries, self.base_delay, self.backoff_factor, self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2), 2.0)
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        let mut policy = RetryPolicy::new(
            config.max_retries,
            Duration::from_millis(config.base_delay_ms),
            config.backoff_factor,
        )
        .retry_on(config.retry_on.iter().copied())
        .with_jitter(config.jitter_ratio);

        if let Some(max_ms) = config.max_delay_ms {
            policy = policy.with_max_delay(Duration::from_millis(max_ms));
        }
        policy
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable kind, or
/// exhausts `policy.max_retries`.
///
/// The error returned is always the one produced by the last attempt.
pub async fn run<T, E, F, Fut>(mut operation: F, policy: &RetryPolicy) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Classify + fmt::Display,
{
    let mut retry = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => {
                if retry > 0 {
                    tracing::info!(attempts = retry + 1, "Operation succeeded after retrying");
                }
                return Ok(value);
            }
            Err(err) => err,
        };

        let kind = err.kind();
        if !policy.is_retryable(kind) {
            tracing::debug!(kind = %kind, error = %err, "Failure is not retryable");
            return Err(err);
        }

        if retry >= policy.max_retries {
            tracing::error!(
                attempts = retry + 1,
                kind = %kind,
                error = %err,
                "All attempts failed"
            );
            return Err(err);
        }

        retry += 1;
        let delay = apply_jitter(policy.delay_for(retry), policy.jitter_ratio);
        tracing::warn!(
            attempt = retry,
            max_attempts = policy.max_retries + 1,
            delay = ?delay,
            kind = %kind,
            error = %err,
            "Attempt failed, retrying"
        );
        metrics::record_retry(kind);
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::time::Instant;

    #[derive(Debug)]
    struct TestError {
        kind: ErrorKind,
        attempt: usize,
    }

    impl fmt::Display for TestError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{} failure on attempt {}", self.kind, self.attempt)
        }
    }

    impl Classify for TestError {
        fn kind(&self) -> ErrorKind {
            self.kind
        }
    }

    /// Record the instant of each attempt and fail with `kind` until
    /// `succeed_on` (1-based) is reached.
    async fn attempt(
        stamps: &Mutex<Vec<Instant>>,
        kind: ErrorKind,
        succeed_on: Option<usize>,
    ) -> Result<usize, TestError> {
        let attempt = {
            let mut stamps = stamps.lock().unwrap();
            stamps.push(Instant::now());
            stamps.len()
        };
        match succeed_on {
            Some(n) if attempt >= n => Ok(attempt),
            _ => Err(TestError { kind, attempt }),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_retries_with_growing_delays() {
        let policy = RetryPolicy::new(3, Duration::from_secs(2), 2.0);
        let stamps = Mutex::new(Vec::new());

        let result = run(|| attempt(&stamps, ErrorKind::Transient, None), &policy).await;

        let err = result.unwrap_err();
        assert_eq!(err.attempt, 4, "last failure must be propagated");

        let stamps = stamps.into_inner().unwrap();
        assert_eq!(stamps.len(), 4);
        let gaps: Vec<Duration> = stamps.windows(2).map(|w| w[1] - w[0]).collect();
        for (gap, expected) in gaps.iter().zip([2u64, 4, 8]) {
            assert!(*gap >= Duration::from_secs(expected), "gap {:?} < {}s", gap, expected);
            assert!(*gap < Duration::from_secs(expected) + Duration::from_millis(50));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_fails_fast() {
        let policy = RetryPolicy::new(3, Duration::from_secs(2), 2.0);
        let stamps = Mutex::new(Vec::new());
        let start = Instant::now();

        let result = run(|| attempt(&stamps, ErrorKind::PermanentRequest, None), &policy).await;

        assert_eq!(result.unwrap_err().attempt, 1);
        assert_eq!(stamps.lock().unwrap().len(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries_means_single_attempt() {
        let policy = RetryPolicy::new(0, Duration::from_secs(2), 2.0);
        let stamps = Mutex::new(Vec::new());

        let result = run(|| attempt(&stamps, ErrorKind::Transient, None), &policy).await;

        assert_eq!(result.unwrap_err().attempt, 1);
        assert_eq!(stamps.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failures() {
        let policy = RetryPolicy::new(3, Duration::from_millis(100), 2.0);
        let stamps = Mutex::new(Vec::new());

        let result = run(|| attempt(&stamps, ErrorKind::Transient, Some(3)), &policy).await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(stamps.lock().unwrap().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_retried_only_when_listed() {
        let strict = RetryPolicy::new(2, Duration::from_millis(10), 2.0);
        let stamps = Mutex::new(Vec::new());
        let _ = run(|| attempt(&stamps, ErrorKind::ResponseMalformed, None), &strict).await;
        assert_eq!(stamps.lock().unwrap().len(), 1);

        let lenient = strict.retry_on([ErrorKind::Transient, ErrorKind::ResponseMalformed]);
        let stamps = Mutex::new(Vec::new());
        let _ = run(|| attempt(&stamps, ErrorKind::ResponseMalformed, None), &lenient).await;
        assert_eq!(stamps.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_policy_from_config() {
        let config = RetryConfig {
            max_retries: 5,
            base_delay_ms: 250,
            backoff_factor: 3.0,
            max_delay_ms: Some(1_000),
            jitter_ratio: 0.0,
            retry_on: vec![ErrorKind::Transient, ErrorKind::ResponseMalformed],
        };
        let policy = RetryPolicy::from(&config);

        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.delay_for(1), Duration::from_millis(250));
        assert_eq!(policy.delay_for(2), Duration::from_millis(750));
        assert_eq!(policy.delay_for(3), Duration::from_secs(1));
        assert!(policy.is_retryable(ErrorKind::ResponseMalformed));
        assert!(!policy.is_retryable(ErrorKind::PermanentRequest));
    }

    #[test]
    fn test_default_worst_case() {
        assert_eq!(RetryPolicy::default().worst_case_wait(), Duration::from_secs(14));
    }
}
