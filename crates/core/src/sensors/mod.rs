//! Sensor channels and the staleness-aware reading cache
//!
//! # Channel Table
//!
//! | Channel     | Wire key          | Plausible range |
//! |-------------|-------------------|-----------------|
//! | Temperature | `temperature`     | -40 .. 80 degC  |
//! | Humidity    | `humidity`        | 0 .. 100 %      |
//! | Illuminance | `light_intensity` | 0 .. 65535 lux  |
//! | WaterLevel  | `water_level`     | 0 .. 100 %      |
//! | Acidity     | `ph`              | 0 .. 14 pH      |

pub mod analog;
pub mod cache;

pub use analog::{AdcReader, AnalogSource};
pub use cache::{
    ChannelConfig, FreshReadings, Reading, SampleReport, SensorCache, DEFAULT_STALENESS_MS,
    MAX_CHANNELS,
};

use core::fmt;

/// Logical sensor channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    Temperature,
    Humidity,
    Illuminance,
    WaterLevel,
    Acidity,
}

impl Channel {
    /// JSON key used in the data payload
    pub const fn key(self) -> &'static str {
        match self {
            Channel::Temperature => "temperature",
            Channel::Humidity => "humidity",
            Channel::Illuminance => "light_intensity",
            Channel::WaterLevel => "water_level",
            Channel::Acidity => "ph",
        }
    }

    /// Physically plausible range for the channel
    pub const fn default_range(self) -> PlausibleRange {
        match self {
            Channel::Temperature => PlausibleRange::new(-40.0, 80.0),
            Channel::Humidity => PlausibleRange::new(0.0, 100.0),
            Channel::Illuminance => PlausibleRange::new(0.0, 65_535.0),
            Channel::WaterLevel => PlausibleRange::new(0.0, 100.0),
            Channel::Acidity => PlausibleRange::new(0.0, 14.0),
        }
    }
}

/// Inclusive range a reading must fall in to be accepted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlausibleRange {
    pub min: f32,
    pub max: f32,
}

impl PlausibleRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// NaN and infinities never pass
    pub fn contains(&self, value: f32) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }
}

/// Last accepted reading of one channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSnapshot {
    pub value: f32,
    /// False until the first accepted sample
    pub valid: bool,
    pub captured_at_ms: u64,
}

impl SensorSnapshot {
    pub const fn empty() -> Self {
        Self {
            value: 0.0,
            valid: false,
            captured_at_ms: 0,
        }
    }

    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.captured_at_ms)
    }

    /// Valid and no older than `staleness_ms`
    pub fn is_fresh(&self, now_ms: u64, staleness_ms: u64) -> bool {
        self.valid && self.age_ms(now_ms) <= staleness_ms
    }
}

/// Raw per-channel reads from the sensor drivers
pub trait ChannelSource {
    /// Read one channel; `None` when the driver has no value
    fn read(&mut self, channel: Channel) -> Option<f32>;
}

/// Sensor cache configuration error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CacheError {
    /// All channel slots are in use
    Full,
    /// Channel already configured
    Duplicate(Channel),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::Full => write!(f, "sensor cache full ({} channels)", MAX_CHANNELS),
            CacheError::Duplicate(ch) => write!(f, "channel {} configured twice", ch.key()),
        }
    }
}

/// Why the cache cannot supply a publishable reading set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NotReady {
    /// Required channel has never been sampled successfully
    Invalid(Channel),
    /// Required channel's last good sample is too old
    Stale { channel: Channel, age_ms: u64 },
    /// No channel is fresh
    Empty,
}

impl fmt::Display for NotReady {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotReady::Invalid(ch) => write!(f, "{} has no valid sample", ch.key()),
            NotReady::Stale { channel, age_ms } => {
                write!(f, "{} stale ({} ms old)", channel.key(), age_ms)
            }
            NotReady::Empty => f.write_str("no fresh readings"),
        }
    }
}
