//! Outbound rate limiting.
//!
//! Keeps successive calls to one external API at least `min_interval`
//! apart, matching the provider's documented quota. One limiter is shared
//! by every request handler that talks to that API.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::observability::metrics;

/// Minimum-interval limiter.
///
/// The baseline lock is held across the sleep, so concurrent callers queue
/// up (FIFO) and each one observes the interval since the previous
/// caller's permission instant.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    /// Wait until the next call is permitted, then record it.
    pub async fn wait(&self) {
        let mut last_call = self.last_call.lock().await;

        if let Some(last) = *last_call {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                let pause = self.min_interval - elapsed;
                tracing::debug!(sleep = ?pause, "Rate limiter sleeping");
                metrics::record_rate_limit_wait(pause);
                tokio::time::sleep(pause).await;
            }
        }

        *last_call = Some(Instant::now());
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_first_call_is_immediate() {
        let limiter = RateLimiter::new(Duration::from_secs(1));
        let start = Instant::now();
        limiter.wait().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequential_calls_are_spaced() {
        let limiter = RateLimiter::new(Duration::from_secs(1));
        let mut completions = Vec::new();
        for _ in 0..4 {
            limiter.wait().await;
            completions.push(Instant::now());
        }

        for pair in completions.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_secs(1));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_remaining_interval_is_waited() {
        let limiter = RateLimiter::new(Duration::from_secs(1));
        limiter.wait().await;
        tokio::time::sleep(Duration::from_millis(700)).await;

        let before = Instant::now();
        limiter.wait().await;
        let waited = before.elapsed();
        assert!(waited >= Duration::from_millis(300));
        assert!(waited < Duration::from_millis(350));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_never_exceed_rate() {
        let limiter = Arc::new(RateLimiter::new(Duration::from_millis(500)));
        let mut handles = Vec::new();
        for _ in 0..6 {
            let limiter = limiter.clone();
            handles.push(tokio::spawn(async move {
                limiter.wait().await;
                Instant::now()
            }));
        }

        let mut completions = Vec::new();
        for handle in handles {
            completions.push(handle.await.unwrap());
        }
        completions.sort();

        for pair in completions.windows(2) {
            assert!(
                pair[1] - pair[0] >= Duration::from_millis(500),
                "completions {:?} apart",
                pair[1] - pair[0]
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_never_waits() {
        let limiter = RateLimiter::new(Duration::ZERO);
        let start = Instant::now();
        for _ in 0..10 {
            limiter.wait().await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
