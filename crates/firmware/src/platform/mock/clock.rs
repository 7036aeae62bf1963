//! Mock network time source for testing

use core::cell::Cell;

use crate::platform::{traits::ClockSource, Result};

/// Epoch reported once synchronized (2024-01-01T00:00:00Z)
const SYNCED_EPOCH: u64 = 1_704_067_200;

/// Mock clock
///
/// Reports seconds-since-boot style values until it has been read
/// `sync_after_reads` times after `start_sync`, then a real epoch.
#[derive(Debug)]
pub struct MockClock {
    sync_after_reads: Option<u32>,
    started: bool,
    reads: Cell<u32>,
}

impl MockClock {
    /// Clock that syncs on the `reads`-th read after `start_sync`
    pub fn syncing_after(reads: u32) -> Self {
        Self {
            sync_after_reads: Some(reads),
            started: false,
            reads: Cell::new(0),
        }
    }

    /// Clock that never syncs
    pub fn never_syncing() -> Self {
        Self {
            sync_after_reads: None,
            started: false,
            reads: Cell::new(0),
        }
    }

    pub fn reads(&self) -> u32 {
        self.reads.get()
    }
}

impl ClockSource for MockClock {
    fn start_sync(&mut self) -> Result<()> {
        self.started = true;
        self.reads.set(0);
        Ok(())
    }

    fn epoch_seconds(&self) -> u64 {
        let reads = self.reads.get() + 1;
        self.reads.set(reads);
        match self.sync_after_reads {
            Some(n) if self.started && reads >= n => SYNCED_EPOCH,
            _ => u64::from(reads),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syncs_after_reads() {
        let mut clock = MockClock::syncing_after(3);
        clock.start_sync().unwrap();
        assert!(!clock.is_synced());
        assert!(!clock.is_synced());
        assert!(clock.is_synced());
        assert_eq!(clock.reads(), 3);
    }

    #[test]
    fn test_not_synced_without_start() {
        let clock = MockClock::syncing_after(1);
        assert!(!clock.is_synced());
        assert!(!MockClock::never_syncing().is_synced());
    }
}
