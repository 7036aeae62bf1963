//! Wall-clock synchronization
//!
//! Certificate validation needs real time, so the bootstrap chain waits for
//! the network time source before probing TLS transports.

use crate::platform::Result;

/// Epoch seconds above which the clock counts as synchronized
///
/// An unsynced clock reads seconds since boot, which stays far below this.
pub const SYNCED_EPOCH_THRESHOLD: u64 = 8 * 3600 * 2;

/// Network time source
pub trait ClockSource {
    /// Start synchronization; returns without waiting for it
    fn start_sync(&mut self) -> Result<()>;

    /// Current wall-clock time in seconds since the Unix epoch
    fn epoch_seconds(&self) -> u64;

    fn is_synced(&self) -> bool {
        self.epoch_seconds() > SYNCED_EPOCH_THRESHOLD
    }
}
