//! Node Parameter Definitions
//!
//! Everything the node needs to know before it boots: device identity,
//! broker and endpoint addresses, task intervals and retry policies.
//!
//! # Build-Time Defaults
//!
//! String settings are captured by `build.rs` from environment variables:
//!
//! - `DEVICE_ID` - Compiled-in device id (required)
//! - `MQTT_HOST` / `MQTT_PORT` - Broker address (port defaults to 8883)
//! - `MQTT_USER` / `MQTT_PASSWORD` - Broker credentials (password hidden in build output)
//! - `IDENTITY_URL` - Identity endpoint (required)
//! - `PROBE_URL` - Plain reachability probe target
//! - `TRANSPORT_POLICY` - `verified_only` or `allow_unverified_fallback`
//!
//! # Example
//!
//! ```ignore
//! use plant_pulse_firmware::parameters::NodeParams;
//!
//! let params = NodeParams::from_build_env()?;
//! params.validate()?;
//! ```

use core::fmt;

use heapless::{String, Vec};
use plant_pulse_core::identity::{validate_id, IdString, IdentityError};
use plant_pulse_core::sensors::{CacheError, Channel, ChannelConfig, MAX_CHANNELS};
use plant_pulse_core::session::RetryPolicy;

/// Maximum host / user / password length
pub const MAX_FIELD_LEN: usize = 64;

/// Maximum endpoint URL length
pub const MAX_ENDPOINT_LEN: usize = 128;

/// Maximum client id prefix length
pub const MAX_PREFIX_LEN: usize = 32;

/// Ceiling on the loop idle wait; bounds indicator staleness
pub const MAX_IDLE_WAIT_MS: u32 = 50;

/// Which transport identity resolution may use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportPolicy {
    /// Always resolve identity over the verified transport
    #[default]
    VerifiedOnly,
    /// Fall back to the unverified transport when only it answered
    AllowUnverifiedFallback,
}

impl TransportPolicy {
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("verified_only") {
            Some(TransportPolicy::VerifiedOnly)
        } else if s.eq_ignore_ascii_case("allow_unverified_fallback") {
            Some(TransportPolicy::AllowUnverifiedFallback)
        } else {
            None
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            TransportPolicy::VerifiedOnly => "verified_only",
            TransportPolicy::AllowUnverifiedFallback => "allow_unverified_fallback",
        }
    }
}

/// Parameter errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    EmptyDeviceId,
    InvalidDeviceId(IdentityError),
    EmptyIdentityEndpoint,
    /// Named interval is zero
    ZeroInterval(&'static str),
    IdleWaitTooLong(u32),
    StalenessBelowSampling,
    /// Named retry policy allows no attempt
    ZeroRetries(&'static str),
    /// Named value does not fit its buffer
    ValueTooLong(&'static str),
    UnknownTransportPolicy,
    InvalidPort,
    NoChannels,
    /// Channel list rejected by the sensor cache
    Channel(CacheError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyDeviceId => f.write_str("device id is empty"),
            ConfigError::InvalidDeviceId(e) => write!(f, "invalid device id: {}", e),
            ConfigError::EmptyIdentityEndpoint => f.write_str("identity endpoint is empty"),
            ConfigError::ZeroInterval(name) => write!(f, "{} interval is zero", name),
            ConfigError::IdleWaitTooLong(ms) => {
                write!(f, "idle wait {}ms exceeds {}ms", ms, MAX_IDLE_WAIT_MS)
            }
            ConfigError::StalenessBelowSampling => {
                f.write_str("staleness threshold shorter than sampling interval")
            }
            ConfigError::ZeroRetries(name) => write!(f, "{} retry count is zero", name),
            ConfigError::ValueTooLong(name) => write!(f, "{} is too long", name),
            ConfigError::UnknownTransportPolicy => f.write_str("unknown transport policy"),
            ConfigError::InvalidPort => f.write_str("invalid broker port"),
            ConfigError::NoChannels => f.write_str("no sensor channels configured"),
            ConfigError::Channel(e) => write!(f, "sensor channels: {}", e),
        }
    }
}

/// Raw string settings as captured at build time
#[derive(Debug, Clone, Copy)]
pub struct BuildEnv<'a> {
    pub device_id: &'a str,
    pub mqtt_host: &'a str,
    pub mqtt_port: &'a str,
    pub mqtt_user: &'a str,
    pub mqtt_password: &'a str,
    pub identity_url: &'a str,
    pub probe_url: &'a str,
    pub transport_policy: &'a str,
}

impl BuildEnv<'static> {
    /// Values emitted by `build.rs`
    pub const fn captured() -> Self {
        Self {
            device_id: env!("DEVICE_ID"),
            mqtt_host: env!("MQTT_HOST"),
            mqtt_port: env!("MQTT_PORT"),
            mqtt_user: env!("MQTT_USER"),
            mqtt_password: env!("MQTT_PASSWORD"),
            identity_url: env!("IDENTITY_URL"),
            probe_url: env!("PROBE_URL"),
            transport_policy: env!("TRANSPORT_POLICY"),
        }
    }
}

/// Node configuration
#[derive(Debug, Clone)]
pub struct NodeParams {
    /// Compiled-in device id
    pub device_id: IdString,
    pub broker_host: String<MAX_FIELD_LEN>,
    pub broker_port: u16,
    pub broker_user: String<MAX_FIELD_LEN>,
    pub broker_password: String<MAX_FIELD_LEN>,
    /// Client id is `{prefix}_{device_id}`
    pub client_id_prefix: String<MAX_PREFIX_LEN>,
    pub identity_endpoint: String<MAX_ENDPOINT_LEN>,
    pub probe_url: String<MAX_ENDPOINT_LEN>,
    pub transport_policy: TransportPolicy,

    pub probe_retry: RetryPolicy,
    pub clock_sync_attempts: u8,
    pub clock_sync_poll_ms: u32,
    pub identity_retry: RetryPolicy,
    /// Immediate sub-attempts inside one connect round
    pub connect_attempts: u8,
    pub reconnect_interval_ms: u32,

    pub health_check_interval_ms: u32,
    pub sample_interval_ms: u32,
    pub publish_interval_ms: u32,
    pub liveness_interval_ms: u32,
    pub monitor_interval_ms: u32,
    pub staleness_ms: u32,
    pub idle_wait_ms: u32,
    /// HTTP request timeout
    pub request_timeout_ms: u32,
    pub keep_alive_secs: u16,
    pub default_on_value: u8,

    /// Channels the node carries, in payload order
    pub channels: Vec<ChannelConfig, MAX_CHANNELS>,
}

impl Default for NodeParams {
    fn default() -> Self {
        let mut channels = Vec::new();
        // Capacity is MAX_CHANNELS
        // Payload key order follows the channel order
        let _ = channels.push(ChannelConfig::required(Channel::Temperature));
        let _ = channels.push(ChannelConfig::optional(Channel::Illuminance));
        let _ = channels.push(ChannelConfig::required(Channel::Humidity));

        let mut client_id_prefix = String::new();
        let _ = client_id_prefix.push_str("ESP32Client");
        let mut probe_url = String::new();
        let _ = probe_url.push_str("http://httpbin.org/get");

        Self {
            device_id: String::new(),
            broker_host: String::new(),
            broker_port: 8883,
            broker_user: String::new(),
            broker_password: String::new(),
            client_id_prefix,
            identity_endpoint: String::new(),
            probe_url,
            transport_policy: TransportPolicy::default(),

            probe_retry: RetryPolicy::new(3, 2000),
            clock_sync_attempts: 20,
            clock_sync_poll_ms: 500,
            identity_retry: RetryPolicy::new(3, 5000),
            connect_attempts: 5,
            reconnect_interval_ms: 10_000,

            health_check_interval_ms: 5000,
            sample_interval_ms: 2000,
            publish_interval_ms: 10_000,
            liveness_interval_ms: 30_000,
            monitor_interval_ms: 60_000,
            staleness_ms: 30_000,
            idle_wait_ms: 10,
            request_timeout_ms: 15_000,
            keep_alive_secs: 60,
            default_on_value: plant_pulse_core::command::DEFAULT_ON_VALUE,

            channels,
        }
    }
}

fn bounded<const N: usize>(value: &str, field: &'static str) -> Result<String<N>, ConfigError> {
    String::try_from(value).map_err(|_| ConfigError::ValueTooLong(field))
}

impl NodeParams {
    /// Defaults overlaid with the build-time environment
    pub fn from_build_env() -> Result<Self, ConfigError> {
        Self::from_env(&BuildEnv::captured())
    }

    /// Defaults overlaid with `env`
    ///
    /// Fails on values that cannot be represented; semantic checks are
    /// left to [`NodeParams::validate`].
    pub fn from_env(env: &BuildEnv<'_>) -> Result<Self, ConfigError> {
        let mut params = Self::default();
        params.device_id = bounded(env.device_id, "device id")?;
        params.broker_host = bounded(env.mqtt_host, "broker host")?;
        params.broker_user = bounded(env.mqtt_user, "broker user")?;
        params.broker_password = bounded(env.mqtt_password, "broker password")?;
        params.identity_endpoint = bounded(env.identity_url, "identity endpoint")?;
        params.probe_url = bounded(env.probe_url, "probe url")?;
        params.broker_port = match env.mqtt_port.parse::<u16>() {
            Ok(port) if port != 0 => port,
            _ => return Err(ConfigError::InvalidPort),
        };
        params.transport_policy = TransportPolicy::parse(env.transport_policy)
            .ok_or(ConfigError::UnknownTransportPolicy)?;
        Ok(params)
    }

    /// Check the parameter set is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device_id.is_empty() {
            return Err(ConfigError::EmptyDeviceId);
        }
        validate_id(&self.device_id).map_err(ConfigError::InvalidDeviceId)?;
        if self.identity_endpoint.is_empty() {
            return Err(ConfigError::EmptyIdentityEndpoint);
        }

        for (name, interval) in [
            ("health check", self.health_check_interval_ms),
            ("publish", self.publish_interval_ms),
            ("sample", self.sample_interval_ms),
            ("reconnect", self.reconnect_interval_ms),
            ("liveness", self.liveness_interval_ms),
            ("monitor", self.monitor_interval_ms),
        ] {
            if interval == 0 {
                return Err(ConfigError::ZeroInterval(name));
            }
        }

        if self.idle_wait_ms > MAX_IDLE_WAIT_MS {
            return Err(ConfigError::IdleWaitTooLong(self.idle_wait_ms));
        }
        if self.staleness_ms < self.sample_interval_ms {
            return Err(ConfigError::StalenessBelowSampling);
        }

        for (name, policy) in [
            ("probe", self.probe_retry),
            ("identity", self.identity_retry),
        ] {
            if policy.attempts == 0 {
                return Err(ConfigError::ZeroRetries(name));
            }
        }
        if self.connect_attempts == 0 {
            return Err(ConfigError::ZeroRetries("connect"));
        }
        if self.clock_sync_attempts == 0 {
            return Err(ConfigError::ZeroRetries("clock sync"));
        }

        if self.channels.is_empty() {
            return Err(ConfigError::NoChannels);
        }
        for (i, config) in self.channels.iter().enumerate() {
            if self.channels[..i].iter().any(|c| c.channel == config.channel) {
                return Err(ConfigError::Channel(CacheError::Duplicate(config.channel)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> BuildEnv<'static> {
        BuildEnv {
            device_id: "42",
            mqtt_host: "broker.local",
            mqtt_port: "1883",
            mqtt_user: "node",
            mqtt_password: "secret",
            identity_url: "https://id.example/lookup",
            probe_url: "http://probe.example/get",
            transport_policy: "verified_only",
        }
    }

    fn valid() -> NodeParams {
        NodeParams::from_env(&env()).unwrap()
    }

    #[test]
    fn test_from_env_overlays_defaults() {
        let params = valid();
        assert_eq!(params.device_id.as_str(), "42");
        assert_eq!(params.broker_port, 1883);
        assert_eq!(params.transport_policy, TransportPolicy::VerifiedOnly);
        assert_eq!(params.identity_retry, RetryPolicy::new(3, 5000));
        assert_eq!(params.reconnect_interval_ms, 10_000);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!(
            TransportPolicy::parse("ALLOW_UNVERIFIED_FALLBACK"),
            Some(TransportPolicy::AllowUnverifiedFallback)
        );
        assert_eq!(TransportPolicy::parse(""), None);

        let mut e = env();
        e.transport_policy = "sometimes";
        assert_eq!(
            NodeParams::from_env(&e).unwrap_err(),
            ConfigError::UnknownTransportPolicy
        );
    }

    #[test]
    fn test_bad_port() {
        let mut e = env();
        e.mqtt_port = "0";
        assert_eq!(NodeParams::from_env(&e).unwrap_err(), ConfigError::InvalidPort);
        e.mqtt_port = "70000";
        assert_eq!(NodeParams::from_env(&e).unwrap_err(), ConfigError::InvalidPort);
    }

    #[test]
    fn test_too_long_value() {
        let mut e = env();
        let long = "h".repeat(MAX_FIELD_LEN + 1);
        e.mqtt_host = std::boxed::Box::leak(long.into_boxed_str());
        assert_eq!(
            NodeParams::from_env(&e).unwrap_err(),
            ConfigError::ValueTooLong("broker host")
        );
    }

    #[test]
    fn test_default_channel_order() {
        let p = NodeParams::default();
        let keys: [&str; 3] = [
            p.channels[0].channel.key(),
            p.channels[1].channel.key(),
            p.channels[2].channel.key(),
        ];
        assert_eq!(keys, ["temperature", "light_intensity", "humidity"]);
        assert!(p.channels[0].required);
        assert!(!p.channels[1].required);
        assert!(p.channels[2].required);
    }

    #[test]
    fn test_validate_rejections() {
        let mut p = valid();
        p.device_id.clear();
        assert_eq!(p.validate(), Err(ConfigError::EmptyDeviceId));

        let mut p = valid();
        p.device_id = bounded("a/b", "device id").unwrap();
        assert_eq!(
            p.validate(),
            Err(ConfigError::InvalidDeviceId(IdentityError::ForbiddenCharacter('/')))
        );

        let mut p = valid();
        p.identity_endpoint.clear();
        assert_eq!(p.validate(), Err(ConfigError::EmptyIdentityEndpoint));

        let mut p = valid();
        p.publish_interval_ms = 0;
        assert_eq!(p.validate(), Err(ConfigError::ZeroInterval("publish")));

        let mut p = valid();
        p.health_check_interval_ms = 0;
        assert_eq!(p.validate(), Err(ConfigError::ZeroInterval("health check")));

        let mut p = valid();
        p.idle_wait_ms = 51;
        assert_eq!(p.validate(), Err(ConfigError::IdleWaitTooLong(51)));

        let mut p = valid();
        p.staleness_ms = 1000;
        assert_eq!(p.validate(), Err(ConfigError::StalenessBelowSampling));

        let mut p = valid();
        p.identity_retry = RetryPolicy::new(0, 5000);
        assert_eq!(p.validate(), Err(ConfigError::ZeroRetries("identity")));

        let mut p = valid();
        p.channels.clear();
        assert_eq!(p.validate(), Err(ConfigError::NoChannels));

        let mut p = valid();
        p.channels
            .push(ChannelConfig::optional(Channel::Humidity))
            .unwrap();
        assert_eq!(
            p.validate(),
            Err(ConfigError::Channel(CacheError::Duplicate(Channel::Humidity)))
        );
    }

    #[test]
    fn test_idle_wait_ceiling_inclusive() {
        let mut p = valid();
        p.idle_wait_ms = MAX_IDLE_WAIT_MS;
        assert!(p.validate().is_ok());
    }
}
