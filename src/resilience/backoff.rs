//! Linear backoff between confirmation attempts.

use std::time::Duration;

/// Delay to wait after the given (1-based) attempt before starting the next.
///
/// Attempt 1 waits `1 × base`, attempt 2 waits `2 × base`, and so on.
pub fn linear_backoff(attempt: u32, base: Duration) -> Duration {
    base.saturating_mul(attempt)
}
