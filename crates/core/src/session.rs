//! Message-session state and reconnect rate limiting
//!
//! [`SessionTracker`] decides *whether* a connect attempt may happen; the
//! firmware session manager performs it and reports the result back. No
//! two attempts are ever closer together than the reconnect interval, no
//! matter how often the tracker is polled.

use crate::health::HealthCode;

/// Broker session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl SessionState {
    /// Health code shown while in this state
    pub const fn health(self) -> HealthCode {
        match self {
            SessionState::Disconnected => HealthCode::SessionDown,
            SessionState::Connecting => HealthCode::Connecting,
            SessionState::Connected => HealthCode::SessionUp,
        }
    }
}

/// Bounded retry count with a fixed backoff between tries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RetryPolicy {
    /// Total tries, including the first
    pub attempts: u8,
    /// Wait between two tries
    pub backoff_ms: u32,
}

impl RetryPolicy {
    pub const fn new(attempts: u8, backoff_ms: u32) -> Self {
        Self {
            attempts,
            backoff_ms,
        }
    }

    /// Back-to-back tries without waiting
    pub const fn immediate(attempts: u8) -> Self {
        Self::new(attempts, 0)
    }

    /// Whether another try follows try number `attempt` (1-based)
    pub const fn has_next(&self, attempt: u8) -> bool {
        attempt < self.attempts
    }
}

/// Outcome of asking the tracker for a connect attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AttemptGate {
    /// Session is up, nothing to do
    AlreadyConnected,
    /// Previous attempt too recent
    RateLimited { remaining_ms: u64 },
    /// Attempt started; report the result with `mark_connected`/`mark_failed`
    Proceed,
}

/// Session state plus reconnect bookkeeping
#[derive(Debug, Clone, Copy)]
pub struct SessionTracker {
    state: SessionState,
    last_attempt_ms: Option<u64>,
    consecutive_failures: u32,
    reconnect_interval_ms: u32,
}

impl SessionTracker {
    pub const fn new(reconnect_interval_ms: u32) -> Self {
        Self {
            state: SessionState::Disconnected,
            last_attempt_ms: None,
            consecutive_failures: 0,
            reconnect_interval_ms,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected
    }

    pub fn last_attempt_ms(&self) -> Option<u64> {
        self.last_attempt_ms
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn reconnect_interval_ms(&self) -> u32 {
        self.reconnect_interval_ms
    }

    /// Check the gate without changing state
    pub fn gate(&self, now_ms: u64) -> AttemptGate {
        if self.state == SessionState::Connected {
            return AttemptGate::AlreadyConnected;
        }
        match self.last_attempt_ms {
            None => AttemptGate::Proceed,
            Some(last) => {
                let elapsed = now_ms.saturating_sub(last);
                let interval = u64::from(self.reconnect_interval_ms);
                if elapsed >= interval {
                    AttemptGate::Proceed
                } else {
                    AttemptGate::RateLimited {
                        remaining_ms: interval - elapsed,
                    }
                }
            }
        }
    }

    /// Start an attempt if the gate allows it
    ///
    /// On [`AttemptGate::Proceed`] the state becomes `Connecting` and the
    /// attempt time is recorded.
    pub fn try_begin(&mut self, now_ms: u64) -> AttemptGate {
        let gate = self.gate(now_ms);
        if gate == AttemptGate::Proceed {
            self.state = SessionState::Connecting;
            self.last_attempt_ms = Some(match self.last_attempt_ms {
                Some(last) if last > now_ms => last,
                _ => now_ms,
            });
        }
        gate
    }

    pub fn mark_connected(&mut self) {
        self.state = SessionState::Connected;
        self.consecutive_failures = 0;
    }

    /// Close a failed attempt, returning the failure streak
    pub fn mark_failed(&mut self) -> u32 {
        self.state = SessionState::Disconnected;
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.consecutive_failures
    }

    /// Record that a connected session went away
    ///
    /// Returns `true` if the session was connected. The next attempt stays
    /// rate limited against the previous attempt time.
    pub fn mark_dropped(&mut self) -> bool {
        let was_connected = self.state == SessionState::Connected;
        self.state = SessionState::Disconnected;
        was_connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_attempt_is_immediate() {
        let mut tracker = SessionTracker::new(10_000);
        assert_eq!(tracker.try_begin(0), AttemptGate::Proceed);
        assert_eq!(tracker.state(), SessionState::Connecting);
        assert_eq!(tracker.last_attempt_ms(), Some(0));
    }

    #[test]
    fn test_failed_attempt_rate_limits_next() {
        let mut tracker = SessionTracker::new(10_000);
        tracker.try_begin(1000);
        assert_eq!(tracker.mark_failed(), 1);

        assert_eq!(
            tracker.try_begin(5000),
            AttemptGate::RateLimited { remaining_ms: 6000 }
        );
        assert_eq!(tracker.state(), SessionState::Disconnected);
        assert_eq!(tracker.try_begin(11_000), AttemptGate::Proceed);
        assert_eq!(tracker.mark_failed(), 2);
    }

    #[test]
    fn test_never_two_attempts_within_interval() {
        let interval = 10_000u64;
        let mut tracker = SessionTracker::new(interval as u32);
        let mut attempts = heapless::Vec::<u64, 64>::new();

        let mut now = 0u64;
        let mut step = 1u64;
        while now < 200_000 {
            if tracker.try_begin(now) == AttemptGate::Proceed {
                attempts.push(now).unwrap();
                tracker.mark_failed();
            }
            // Irregular tick pattern
            step = (step * 7 + 3) % 1900 + 1;
            now += step;
        }

        assert!(attempts.len() > 5);
        for pair in attempts.windows(2) {
            assert!(pair[1] - pair[0] >= interval);
        }
    }

    #[test]
    fn test_connected_resets_failures_and_blocks_attempts() {
        let mut tracker = SessionTracker::new(10_000);
        tracker.try_begin(0);
        tracker.mark_failed();
        tracker.try_begin(10_000);
        tracker.mark_connected();

        assert_eq!(tracker.consecutive_failures(), 0);
        assert!(tracker.is_connected());
        assert_eq!(tracker.try_begin(50_000), AttemptGate::AlreadyConnected);
    }

    #[test]
    fn test_drop_keeps_rate_limit_from_last_attempt() {
        let mut tracker = SessionTracker::new(10_000);
        tracker.try_begin(0);
        tracker.mark_connected();

        assert!(tracker.mark_dropped());
        assert!(!tracker.mark_dropped());
        assert_eq!(
            tracker.gate(4000),
            AttemptGate::RateLimited { remaining_ms: 6000 }
        );
        assert_eq!(tracker.gate(10_000), AttemptGate::Proceed);
    }

    #[test]
    fn test_state_health_mapping() {
        assert_eq!(SessionState::Connected.health(), HealthCode::SessionUp);
        assert_eq!(SessionState::Disconnected.health(), HealthCode::SessionDown);
        assert_eq!(SessionState::Connecting.health(), HealthCode::Connecting);
    }

    #[test]
    fn test_retry_policy_has_next() {
        let policy = RetryPolicy::new(3, 5000);
        assert!(policy.has_next(1));
        assert!(policy.has_next(2));
        assert!(!policy.has_next(3));
    }
}
