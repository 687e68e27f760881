//! Retry policy for the generative API.

use std::time::Duration;

/// Retries after the first attempt.
pub const MAX_RETRIES: u32 = 3;

/// Base of the exponential backoff.
pub const BACKOFF_BASE: Duration = Duration::from_millis(1000);

/// Longest wait honoured from a `Retry-After` header.
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Statuses worth retrying: rate limiting and transient server failures.
pub fn is_retryable(status: u16) -> bool {
    matches!(status, 429 | 500 | 503)
}

/// Delay before retry number `attempt` (0-based).
///
/// A `Retry-After` value in whole seconds wins, capped at [`MAX_RETRY_AFTER`];
/// otherwise `base * 2^attempt`.
pub fn retry_delay(attempt: u32, retry_after: Option<&str>, base: Duration) -> Duration {
    if let Some(seconds) = retry_after.and_then(|v| v.trim().parse::<u64>().ok()) {
        return Duration::from_secs(seconds).min(MAX_RETRY_AFTER);
    }
    base.saturating_mul(2u32.saturating_pow(attempt))
}
