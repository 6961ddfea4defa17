//! Exponential backoff with jitter

use rand::Rng;
use std::time::Duration;
use streak_common::BackoffConfig;

/// Delay before retry number `attempt` (0-based)
///
/// `min(base * 2^attempt, max)` plus uniform jitter in `[0, delay * jitter_factor)`.
/// Large attempts saturate at the cap.
pub fn backoff(config: &BackoffConfig, attempt: u32) -> Duration {
    backoff_with_rng(config, attempt, &mut rand::thread_rng())
}

/// [`backoff`] with an explicit randomness source
pub fn backoff_with_rng<R: Rng + ?Sized>(config: &BackoffConfig, attempt: u32, rng: &mut R) -> Duration {
    let delay = capped_delay(config, attempt);

    let max_jitter = delay.as_secs_f64() * config.jitter_factor;
    let jitter = if max_jitter > 0.0 {
        rng.gen_range(0.0..max_jitter)
    } else {
        0.0
    };

    delay + Duration::from_secs_f64(jitter)
}

/// The exponential delay without jitter
pub fn capped_delay(config: &BackoffConfig, attempt: u32) -> Duration {
    2u32.checked_pow(attempt)
        .and_then(|factor| config.base.checked_mul(factor))
        .map_or(config.max, |delay| delay.min(config.max))
}
