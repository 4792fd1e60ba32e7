/// Bookkeeping for one `resume()` call. Never shared between calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryAttemptState {
    /// Attempts observed so far.
    pub attempt_count:     u32,
    /// End offset recorded at the last stall sample.
    pub last_observed_end: Option<u64>,
}

impl RetryAttemptState {
    pub fn new() -> Self { Self::default() }

    pub fn reset(&mut self) { *self = Self::default(); }
}
