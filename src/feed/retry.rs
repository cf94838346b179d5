//! Reconnect backoff policy.

use std::time::Duration;

/// Fixed backoff delays: doubling up to a 30s ceiling, then flat.
pub const BACKOFF_TABLE: [Duration; 6] = [
    Duration::from_secs(1),
    Duration::from_secs(2),
    Duration::from_secs(4),
    Duration::from_secs(8),
    Duration::from_secs(16),
    Duration::from_secs(30),
];

/// Automatic reconnect attempts before the feed suspends itself.
pub const MAX_RECONNECT_ATTEMPTS: u32 = 10;

/// Maps the attempt counter to the next reconnect delay.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    table: &'static [Duration],
    max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            table: &BACKOFF_TABLE,
            max_attempts: MAX_RECONNECT_ATTEMPTS,
        }
    }
}

impl RetryPolicy {
    /// Delay before the next attempt, or `None` once the budget is exhausted.
    ///
    /// `attempts` is the number of timer fires so far, not the outcome of any
    /// individual attempt.
    pub fn delay_for(&self, attempts: u32) -> Option<Duration> {
        if attempts >= self.max_attempts {
            return None;
        }
        let idx = (attempts as usize).min(self.table.len() - 1);
        Some(self.table[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_double_then_hold_at_ceiling() {
        let policy = RetryPolicy::default();
        let expected = [1u64, 2, 4, 8, 16, 30, 30, 30, 30, 30];
        for (attempts, secs) in expected.iter().enumerate() {
            assert_eq!(
                policy.delay_for(attempts as u32),
                Some(Duration::from_secs(*secs)),
                "attempt counter {attempts}"
            );
        }
    }

    #[test]
    fn budget_exhausts_after_max_attempts() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(MAX_RECONNECT_ATTEMPTS), None);
        assert_eq!(policy.delay_for(MAX_RECONNECT_ATTEMPTS + 5), None);
    }
}
