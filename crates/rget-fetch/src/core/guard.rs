use crate::data::RetryAttemptState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardVerdict {
    Progressing,
    Stalled { end: u64 },
}

/// Detects retry loops whose received range stops advancing.
///
/// Samples on every attempt whose 0-based number is a multiple of
/// `interval`: attempt 0 records a baseline, and each later sample compares
/// against the end offset recorded `interval` attempts earlier.
#[derive(Debug, Clone)]
pub struct ProgressGuard {
    interval: u32,
    state:    RetryAttemptState,
}

impl ProgressGuard {
    pub fn new(interval: u32) -> Self {
        Self {
            interval: interval.max(1),
            state:    RetryAttemptState::new(),
        }
    }

    pub fn state(&self) -> &RetryAttemptState { &self.state }

    /// Feeds the end offset of a partial response received on `attempt`.
    pub fn observe(&mut self, attempt: u32, end: u64) -> GuardVerdict {
        self.state.attempt_count = self.state.attempt_count.max(attempt.saturating_add(1));

        if attempt % self.interval != 0 {
            return GuardVerdict::Progressing;
        }

        match self.state.last_observed_end {
            Some(previous) if previous == end => GuardVerdict::Stalled { end },
            _ => {
                self.state.last_observed_end = Some(end);
                GuardVerdict::Progressing
            }
        }
    }

    pub fn reset(&mut self) { self.state.reset(); }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stall_trips_one_interval_after_baseline() {
        let mut guard = ProgressGuard::new(5);
        for attempt in 0..5 {
            assert_eq!(guard.observe(attempt, 99), GuardVerdict::Progressing);
        }
        assert_eq!(guard.observe(5, 99), GuardVerdict::Stalled { end: 99 });
        assert_eq!(guard.state().attempt_count, 6);
    }

    #[test]
    fn test_advancing_offsets_never_trip() {
        let mut guard = ProgressGuard::new(5);
        for attempt in 0..50u32 {
            let end = u64::from(attempt) * 10 + 9;
            assert_eq!(guard.observe(attempt, end), GuardVerdict::Progressing);
        }
        assert_eq!(guard.state().last_observed_end, Some(459));
    }

    #[test]
    fn test_only_samples_are_compared() {
        let mut guard = ProgressGuard::new(5);
        assert_eq!(guard.observe(0, 9), GuardVerdict::Progressing);
        // Unchanged between samples but moved by the next one.
        for attempt in 1..5 {
            assert_eq!(guard.observe(attempt, 9), GuardVerdict::Progressing);
        }
        assert_eq!(guard.observe(5, 19), GuardVerdict::Progressing);
        assert_eq!(guard.observe(10, 19), GuardVerdict::Stalled { end: 19 });
    }

    #[test]
    fn test_zero_first_end_is_not_a_stall() {
        let mut guard = ProgressGuard::new(5);
        assert_eq!(guard.observe(0, 0), GuardVerdict::Progressing);
    }

    #[test]
    fn test_interval_of_one_compares_every_attempt() {
        let mut guard = ProgressGuard::new(1);
        assert_eq!(guard.observe(0, 10), GuardVerdict::Progressing);
        assert_eq!(guard.observe(1, 20), GuardVerdict::Progressing);
        assert_eq!(guard.observe(2, 20), GuardVerdict::Stalled { end: 20 });
    }

    #[test]
    fn test_reset_clears_state() {
        let mut guard = ProgressGuard::new(2);
        guard.observe(0, 5);
        guard.reset();
        assert_eq!(guard.state(), &RetryAttemptState::default());
        assert_eq!(guard.observe(2, 5), GuardVerdict::Progressing);
    }
}
