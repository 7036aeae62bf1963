//! Node health codes
//!
//! A [`HealthCode`] is the only status channel the node has towards a human:
//! the status indicator renders whichever code is current. Codes are written
//! by the connectivity manager and the command/publish paths only.

use core::fmt;

/// Discrete system-health value driving the status indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HealthCode {
    /// Booted, nothing attempted yet
    #[default]
    Idle,
    /// Bootstrap diagnostic chain is running
    Probing,
    /// Plain reachability probe failed (fatal)
    ProbeFailed,
    /// Clock never synchronized
    ClockSyncFailed,
    /// Identity endpoint reachable only without certificate verification
    TransportUnverified,
    /// Identity endpoint reachable with full certificate verification
    TransportVerified,
    /// Identity resolution exhausted its retries (fatal)
    IdentityFailed,
    /// Session connect attempt in progress
    Connecting,
    /// Session connect exhausted its sub-attempts, or the session dropped
    SessionDown,
    /// Session connected
    SessionUp,
    /// Last data publish accepted by the broker
    PublishOk,
    /// Last data publish rejected
    PublishFailed,
    /// Publish skipped because cached readings are stale or invalid
    SensorStale,
    /// Malformed inbound command
    CommandRejected,
    /// Actuation driver reported a failure
    ActuationFault,
}

impl HealthCode {
    /// Bootstrap failures that halt productive work until reboot
    pub const fn is_fatal(self) -> bool {
        matches!(self, HealthCode::ProbeFailed | HealthCode::IdentityFailed)
    }

    /// Short stable name for logs
    pub const fn as_str(self) -> &'static str {
        match self {
            HealthCode::Idle => "idle",
            HealthCode::Probing => "probing",
            HealthCode::ProbeFailed => "probe_failed",
            HealthCode::ClockSyncFailed => "clock_sync_failed",
            HealthCode::TransportUnverified => "transport_unverified",
            HealthCode::TransportVerified => "transport_verified",
            HealthCode::IdentityFailed => "identity_failed",
            HealthCode::Connecting => "connecting",
            HealthCode::SessionDown => "session_down",
            HealthCode::SessionUp => "session_up",
            HealthCode::PublishOk => "publish_ok",
            HealthCode::PublishFailed => "publish_failed",
            HealthCode::SensorStale => "sensor_stale",
            HealthCode::CommandRejected => "command_rejected",
            HealthCode::ActuationFault => "actuation_fault",
        }
    }
}

impl fmt::Display for HealthCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
