use std::time::Duration;

use crate::data::Backoff;

/// Delay before the retry that follows attempt `retry_count` (0-indexed).
///
/// ```
/// use std::time::Duration;
/// use rget_fetch::core::retry_delay;
/// use rget_fetch::data::Backoff;
///
/// let constant = Backoff::Constant(Duration::from_millis(50));
/// assert_eq!(retry_delay(0, constant), Duration::from_millis(50));
/// assert_eq!(retry_delay(7, constant), Duration::from_millis(50));
///
/// let exponential = Backoff::Exponential(Duration::from_millis(100));
/// assert_eq!(retry_delay(2, exponential), Duration::from_millis(400));
/// ```
pub fn retry_delay(retry_count: u32, backoff: Backoff) -> Duration {
    match backoff {
        Backoff::Constant(delay) => delay,
        Backoff::Exponential(base) => base.saturating_mul(2_u32.saturating_pow(retry_count)),
    }
}
