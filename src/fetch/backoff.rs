//! Exponential backoff with full jitter for segment retries.

use std::time::Duration;

const BASE_DELAY_MS: u64 = 200;
const BACKOFF_FACTOR: u32 = 2;
const MAX_BACKOFF_MS: u64 = 10_000;

/// `delay = rand(0..=base * factor^attempt)`, capped at `MAX_BACKOFF_MS`.
/// `attempt` is zero-based (the delay before the *first* retry uses
/// `attempt = 0`).
pub fn backoff_delay(attempt: u32) -> Duration {
    let ceiling = BASE_DELAY_MS
        .saturating_mul(BACKOFF_FACTOR.saturating_pow(attempt) as u64)
        .min(MAX_BACKOFF_MS);
    let jittered = fastrand::u64(0..=ceiling);
    Duration::from_millis(jittered)
}
