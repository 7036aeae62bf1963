//! Timer interface trait
//!
//! This module defines the monotonic clock and delay interface that platform
//! implementations must provide.

use crate::platform::Result;

/// Timer interface trait
///
/// # Safety Invariants
///
/// - Timer peripheral must be initialized before use
/// - Monotonic time source (never goes backwards)
pub trait TimerInterface {
    /// Block for at least `us` microseconds
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Timer` if the delay operation fails.
    fn delay_us(&mut self, us: u32) -> Result<()>;

    /// Block for at least `ms` milliseconds
    ///
    /// Only the scheduler idle wait and the bootstrap chain call this.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Timer` if the delay operation fails.
    fn delay_ms(&mut self, ms: u32) -> Result<()> {
        self.delay_us(ms.saturating_mul(1000))
    }

    /// Monotonic timestamp in microseconds since platform initialization
    fn now_us(&self) -> u64;

    /// Monotonic timestamp in milliseconds since platform initialization
    fn now_ms(&self) -> u64 {
        self.now_us() / 1000
    }
}
