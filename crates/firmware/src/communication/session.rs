//! Broker session manager
//!
//! One parameterized manager handles connect, reconnect, liveness,
//! inbound dispatch and data publication. Every entry point returns
//! promptly: reconnects are rate limited by
//! [`SessionTracker`](plant_pulse_core::session::SessionTracker) instead of
//! sleeping, and sub-attempts within a round are back to back.

use core::fmt::Write;

use heapless::String;
use plant_pulse_core::actuator::Actuator;
use plant_pulse_core::codec::{self, LIVENESS_PAYLOAD};
use plant_pulse_core::command::DispatchOutcome;
use plant_pulse_core::health::HealthCode;
use plant_pulse_core::identity::MAX_ID_LEN;
use plant_pulse_core::sensors::NotReady;
use plant_pulse_core::session::AttemptGate;

use crate::core::context::NodeContext;
use crate::parameters::{ConfigError, NodeParams, MAX_FIELD_LEN, MAX_PREFIX_LEN};
use crate::platform::{
    traits::{ConnectOptions, MessageSession, NetworkInterface, QoS},
    PlatformError,
};

/// Capacity of `{prefix}_{device_id}`
pub const MAX_CLIENT_ID_LEN: usize = MAX_PREFIX_LEN + 1 + MAX_ID_LEN;

/// Broker connection settings
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub host: String<MAX_FIELD_LEN>,
    pub port: u16,
    pub user: String<MAX_FIELD_LEN>,
    pub password: String<MAX_FIELD_LEN>,
    pub client_id: String<MAX_CLIENT_ID_LEN>,
    pub keep_alive_secs: u16,
    /// Immediate sub-attempts per connect round
    pub attempts: u8,
}

impl SessionConfig {
    pub fn from_params(params: &NodeParams) -> Result<Self, ConfigError> {
        let mut client_id = String::new();
        write!(
            client_id,
            "{}_{}",
            params.client_id_prefix.as_str(),
            params.device_id.as_str()
        )
        .map_err(|_| ConfigError::ValueTooLong("client id"))?;

        Ok(Self {
            host: params.broker_host.clone(),
            port: params.broker_port,
            user: params.broker_user.clone(),
            password: params.broker_password.clone(),
            client_id,
            keep_alive_secs: params.keep_alive_secs,
            attempts: params.connect_attempts,
        })
    }

    fn options(&self) -> ConnectOptions<'_> {
        ConnectOptions {
            host: &self.host,
            port: self.port,
            client_id: &self.client_id,
            user: &self.user,
            password: &self.password,
            keep_alive_secs: self.keep_alive_secs,
            clean_session: true,
        }
    }
}

/// Result of one `ensure_connected` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectOutcome {
    AlreadyConnected,
    RateLimited { remaining_ms: u64 },
    /// Connected on sub-attempt `attempt`
    Connected { attempt: u8 },
    /// Round failed; `streak` consecutive failed rounds
    Failed { streak: u32 },
}

/// Result of one data publication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PublishOutcome {
    NotConnected,
    NotReady(NotReady),
    Published,
    Failed,
}

/// Session counters for the monitor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub connect_rounds: u32,
    pub connects: u32,
    pub drops: u32,
    pub publishes: u32,
    pub publish_failures: u32,
    pub inbound_messages: u32,
}

/// Connect/reconnect, liveness, inbound and publish paths
#[derive(Debug)]
pub struct SessionManager {
    config: SessionConfig,
    stats: SessionStats,
}

impl SessionManager {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            stats: SessionStats::default(),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.config.client_id
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Notice a session the transport has dropped
    ///
    /// Cheap enough for every pass; only reconnecting is rate limited.
    /// Returns whether the session is still up.
    pub fn check_liveness<S: MessageSession>(&mut self, ctx: &mut NodeContext, session: &S) -> bool {
        if !ctx.session.is_connected() {
            return false;
        }
        if session.is_connected() {
            return true;
        }
        if ctx.session.mark_dropped() {
            self.stats.drops = self.stats.drops.saturating_add(1);
            crate::log_warn!("Session dropped");
            ctx.status.set(HealthCode::SessionDown);
        }
        false
    }

    /// Bring the session up if it is down and an attempt is due
    pub fn ensure_connected<S, N>(
        &mut self,
        ctx: &mut NodeContext,
        session: &mut S,
        network: &mut N,
        now_ms: u64,
    ) -> ConnectOutcome
    where
        S: MessageSession,
        N: NetworkInterface,
    {
        self.check_liveness(ctx, session);

        match ctx.session.try_begin(now_ms) {
            AttemptGate::AlreadyConnected => return ConnectOutcome::AlreadyConnected,
            AttemptGate::RateLimited { remaining_ms } => {
                return ConnectOutcome::RateLimited { remaining_ms }
            }
            AttemptGate::Proceed => {}
        }

        self.stats.connect_rounds = self.stats.connect_rounds.saturating_add(1);
        ctx.status.set(HealthCode::Connecting);

        if !network.link_up() {
            crate::log_warn!("Link down, requesting rejoin");
            if let Err(e) = network.rejoin() {
                crate::log_error!("Rejoin request failed: {}", e);
            }
            return self.fail_round(ctx);
        }

        for attempt in 1..=self.config.attempts {
            match self.connect_once(session, ctx.credentials.topics.command.as_str()) {
                Ok(()) => {
                    ctx.session.mark_connected();
                    self.stats.connects = self.stats.connects.saturating_add(1);
                    crate::log_info!(
                        "Session up as {} (attempt {})",
                        self.config.client_id.as_str(),
                        attempt
                    );
                    ctx.status.set(HealthCode::SessionUp);
                    return ConnectOutcome::Connected { attempt };
                }
                Err(e) => {
                    crate::log_warn!(
                        "Connect attempt {}/{} failed: {}",
                        attempt,
                        self.config.attempts,
                        e
                    );
                }
            }
        }

        self.fail_round(ctx)
    }

    fn fail_round(&mut self, ctx: &mut NodeContext) -> ConnectOutcome {
        let streak = ctx.session.mark_failed();
        crate::log_error!(
            "Session connect failed ({} consecutive), retry in {}ms",
            streak,
            ctx.session.reconnect_interval_ms()
        );
        ctx.status.set(HealthCode::SessionDown);
        ConnectOutcome::Failed { streak }
    }

    fn connect_once<S: MessageSession>(
        &self,
        session: &mut S,
        command_topic: &str,
    ) -> Result<(), PlatformError> {
        session.connect(&self.config.options())?;
        if let Err(e) = session.subscribe(command_topic, QoS::AtLeastOnce) {
            session.disconnect();
            return Err(e);
        }
        Ok(())
    }

    /// Publish the liveness message while connected
    pub fn publish_liveness<S: MessageSession>(&mut self, ctx: &NodeContext, session: &mut S) -> bool {
        if !ctx.session.is_connected() {
            return false;
        }
        match session.publish(ctx.credentials.topics.liveness.as_str(), LIVENESS_PAYLOAD.as_bytes()) {
            Ok(()) => {
                crate::log_debug!("Liveness sent");
                true
            }
            Err(e) => {
                crate::log_warn!("Liveness publish failed: {}", e);
                false
            }
        }
    }

    /// Hand every queued inbound message to the command dispatcher
    ///
    /// Returns the number of messages delivered.
    pub fn service_inbound<S, A>(
        &mut self,
        ctx: &mut NodeContext,
        session: &mut S,
        actuator: &mut A,
    ) -> usize
    where
        S: MessageSession,
        A: Actuator,
    {
        if !self.check_liveness(ctx, session) {
            return 0;
        }

        let NodeContext {
            status,
            credentials,
            dispatcher,
            ..
        } = ctx;
        let command_topic = credentials.topics.command.as_str();

        let delivered = session.poll(|topic, payload| {
            let outcome = dispatcher.on_message(command_topic, topic, payload, actuator);
            match outcome {
                DispatchOutcome::Ignored => crate::log_debug!("Ignoring message on {}", topic),
                DispatchOutcome::Applied(intent) => {
                    crate::log_info!("Command applied: {:?}", intent)
                }
                DispatchOutcome::Rejected(e) => crate::log_warn!("Command rejected: {}", e),
                DispatchOutcome::Faulted(intent, e) => {
                    crate::log_error!("Command {:?} failed: {}", intent, e)
                }
            }
            if let Some(code) = outcome.health() {
                status.set(code);
            }
        });

        match delivered {
            Ok(n) => {
                self.stats.inbound_messages = self
                    .stats
                    .inbound_messages
                    .saturating_add(u32::try_from(n).unwrap_or(u32::MAX));
                n
            }
            Err(e) => {
                crate::log_warn!("Inbound poll failed: {}", e);
                0
            }
        }
    }

    /// Publish fresh readings to the data topic
    pub fn publish_data<S: MessageSession>(
        &mut self,
        ctx: &mut NodeContext,
        session: &mut S,
        now_ms: u64,
    ) -> PublishOutcome {
        if !self.check_liveness(ctx, session) {
            crate::log_debug!("Publish skipped: session down");
            return PublishOutcome::NotConnected;
        }

        let readings = match ctx.cache.read_fresh(now_ms) {
            Ok(readings) => readings,
            Err(not_ready) => {
                crate::log_warn!("Publish skipped: {}", not_ready);
                ctx.status.set(HealthCode::SensorStale);
                return PublishOutcome::NotReady(not_ready);
            }
        };

        let published = codec::format_sensor_payload(&readings)
            .map_err(|e| crate::log_error!("Payload encoding failed: {}", e))
            .and_then(|payload| {
                session
                    .publish(ctx.credentials.topics.data.as_str(), payload.as_bytes())
                    .map_err(|e| crate::log_warn!("Data publish failed: {}", e))
            });

        if published.is_ok() {
            self.stats.publishes = self.stats.publishes.saturating_add(1);
            crate::log_debug!("Published {} readings", readings.len());
            ctx.status.set(HealthCode::PublishOk);
            PublishOutcome::Published
        } else {
            self.stats.publish_failures = self.stats.publish_failures.saturating_add(1);
            ctx.status.set(HealthCode::PublishFailed);
            PublishOutcome::Failed
        }
    }
}
