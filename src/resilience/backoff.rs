//! Exponential backoff with optional cap and jitter.

use rand::Rng;
use std::time::Duration;

/// Delay before retry number `retry` (1-based).
///
/// `base * factor^(retry - 1)`, capped at `max` when given. Retry 0 is the
/// first attempt and never waits.
pub fn calculate_backoff(retry: u32, base: Duration, factor: f64, max: Option<Duration>) -> Duration {
    if retry == 0 {
        return Duration::ZERO;
    }

    let exponent = i32::try_from(retry - 1).unwrap_or(i32::MAX);
    let secs = base.as_secs_f64() * factor.powi(exponent);
    let delay = Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX);

    match max {
        Some(cap) => delay.min(cap),
        None => delay,
    }
}

/// Add a uniformly random `0..ratio * delay` on top of `delay`.
pub fn apply_jitter(delay: Duration, ratio: f64) -> Duration {
    if ratio <= 0.0 || delay.is_zero() {
        return delay;
    }

    let extra = rand::thread_rng().gen_range(0.0..ratio) * delay.as_secs_f64();
    delay.saturating_add(Duration::try_from_secs_f64(extra).unwrap_or(Duration::ZERO))
}

/// Sum of every backoff delay for `max_retries` retries, ignoring jitter.
pub fn total_backoff(max_retries: u32, base: Duration, factor: f64, max: Option<Duration>) -> Duration {
    (1..=max_retries)
        .map(|retry| calculate_backoff(retry, base, factor, max))
        .fold(Duration::ZERO, Duration::saturating_add)
}
