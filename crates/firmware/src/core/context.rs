//! Node state shared by the periodic tasks
//!
//! One [`NodeContext`] is owned by the node loop and lent to each task in
//! turn. Every field has exactly one writer: the status display is written
//! by the connectivity and command/publish paths, the cache by sampling,
//! the session tracker by the session manager.

use plant_pulse_core::command::{CommandDispatcher, OutputRange};
use plant_pulse_core::identity::Credentials;
use plant_pulse_core::sensors::SensorCache;
use plant_pulse_core::session::SessionTracker;

use super::status::StatusDisplay;
use crate::parameters::{ConfigError, NodeParams};

/// Mutable node state
#[derive(Debug, Clone)]
pub struct NodeContext {
    pub status: StatusDisplay,
    pub cache: SensorCache,
    pub session: SessionTracker,
    /// Fixed after bootstrap
    pub credentials: Credentials,
    pub dispatcher: CommandDispatcher,
}

impl NodeContext {
    /// Build the context after a successful bootstrap
    ///
    /// `status` carries over the health code and indicator phase from the
    /// bootstrap chain so the pattern does not restart.
    pub fn new(
        params: &NodeParams,
        credentials: Credentials,
        status: StatusDisplay,
    ) -> Result<Self, ConfigError> {
        let mut cache = SensorCache::new(u64::from(params.staleness_ms));
        for config in params.channels.iter() {
            cache.add_channel(*config).map_err(ConfigError::Channel)?;
        }

        Ok(Self {
            status,
            cache,
            session: SessionTracker::new(params.reconnect_interval_ms),
            credentials,
            dispatcher: CommandDispatcher::new(OutputRange::default(), params.default_on_value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plant_pulse_core::health::HealthCode;
    use plant_pulse_core::identity::Identity;
    use plant_pulse_core::sensors::{Channel, ChannelConfig};

    fn credentials() -> Credentials {
        Credentials::new(Identity::new("42", "u1", "g1").unwrap())
    }

    #[test]
    fn test_context_from_params() {
        let params = NodeParams::default();
        let mut status = StatusDisplay::new();
        status.set(HealthCode::TransportVerified);

        let ctx = NodeContext::new(&params, credentials(), status).unwrap();
        assert_eq!(ctx.cache.channel_count(), 3);
        assert_eq!(ctx.cache.staleness_ms(), 30_000);
        assert_eq!(ctx.session.reconnect_interval_ms(), 10_000);
        assert!(!ctx.session.is_connected());
        assert_eq!(ctx.status.health(), HealthCode::TransportVerified);
        assert_eq!(ctx.credentials.topics.command.as_str(), "u1/g1/42/control");
    }

    #[test]
    fn test_duplicate_channel_rejected() {
        let mut params = NodeParams::default();
        params
            .channels
            .push(ChannelConfig::optional(Channel::Temperature))
            .unwrap();
        assert!(matches!(
            NodeContext::new(&params, credentials(), StatusDisplay::new()),
            Err(ConfigError::Channel(_))
        ));
    }
}
