//! Renewal timing
//!
//! Renewals run at 70% of the granted lifetime. A failed renewal halves the
//! previous delay, so retries get denser as expiry approaches.

use std::time::Duration;

/// Shortest delay after a successful renewal
pub const SUCCESS_FLOOR: Duration = Duration::from_secs(5);

/// Shortest delay after a failed renewal
pub const FAILURE_FLOOR: Duration = Duration::from_secs(10);

/// Delay before the next renewal of a subscription granted `ttl`
pub fn after_success(ttl: Duration) -> Duration {
    (ttl * 7 / 10).max(SUCCESS_FLOOR)
}

/// Delay before retrying after a failed renewal that was scheduled `previous` ahead
pub fn after_failure(previous: Duration) -> Duration {
    (previous / 2).max(FAILURE_FLOOR)
}
