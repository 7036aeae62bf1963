//! Mock Timer implementation for testing

use crate::platform::{traits::TimerInterface, Result};

/// Mock Timer implementation
///
/// Virtual clock: delays advance time instantly.
#[derive(Debug, Default)]
pub struct MockTimer {
    now_us: u64,
    delayed_us: u64,
}

impl MockTimer {
    /// Create a new mock timer at t = 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock timer starting at `ms`
    pub fn starting_at_ms(ms: u64) -> Self {
        Self {
            now_us: ms * 1000,
            delayed_us: 0,
        }
    }

    /// Move time forward without counting it as a delay
    pub fn advance_ms(&mut self, ms: u64) {
        self.now_us = self.now_us.saturating_add(ms * 1000);
    }

    /// Total time spent in delay calls
    pub fn delayed_ms(&self) -> u64 {
        self.delayed_us / 1000
    }
}

impl TimerInterface for MockTimer {
    fn delay_us(&mut self, us: u32) -> Result<()> {
        self.now_us = self.now_us.saturating_add(u64::from(us));
        self.delayed_us = self.delayed_us.saturating_add(u64::from(us));
        Ok(())
    }

    fn now_us(&self) -> u64 {
        self.now_us
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_timer_delay_ms() {
        let mut timer = MockTimer::new();
        assert_eq!(timer.now_us(), 0);

        timer.delay_ms(1).unwrap();
        assert_eq!(timer.now_us(), 1000);

        timer.delay_ms(5).unwrap();
        assert_eq!(timer.now_ms(), 6);
        assert_eq!(timer.delayed_ms(), 6);
    }

    #[test]
    fn test_mock_timer_advance_is_not_a_delay() {
        let mut timer = MockTimer::starting_at_ms(1000);
        timer.advance_ms(250);
        assert_eq!(timer.now_ms(), 1250);
        assert_eq!(timer.delayed_ms(), 0);
    }
}
