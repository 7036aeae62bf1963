//! Last-known-good reading cache
//!
//! Written by the sampling task, read by the publish task. A rejected
//! reading never touches the stored snapshot, so a faulty sensor keeps its
//! last good value until that value ages past the staleness threshold.

use heapless::Vec;

use super::{CacheError, Channel, ChannelSource, NotReady, PlausibleRange, SensorSnapshot};

/// Maximum number of channels a node carries
pub const MAX_CHANNELS: usize = 5;

/// Default maximum age of a publishable reading
pub const DEFAULT_STALENESS_MS: u64 = 30_000;

/// Per-channel cache configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelConfig {
    pub channel: Channel,
    pub range: PlausibleRange,
    /// Required channels block publication while not fresh
    pub required: bool,
}

impl ChannelConfig {
    pub const fn required(channel: Channel) -> Self {
        Self {
            channel,
            range: channel.default_range(),
            required: true,
        }
    }

    pub const fn optional(channel: Channel) -> Self {
        Self {
            channel,
            range: channel.default_range(),
            required: false,
        }
    }

    pub const fn with_range(mut self, range: PlausibleRange) -> Self {
        self.range = range;
        self
    }
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    config: ChannelConfig,
    snapshot: SensorSnapshot,
}

/// Result of one sampling pass
#[derive(Debug, Clone, Default)]
pub struct SampleReport {
    pub accepted: u8,
    /// Channels whose reading was missing or implausible
    pub rejected: Vec<Channel, MAX_CHANNELS>,
}

impl SampleReport {
    pub fn rejected_count(&self) -> usize {
        self.rejected.len()
    }
}

/// One channel value in a fresh reading set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub channel: Channel,
    pub value: f32,
}

/// Fresh readings in channel configuration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FreshReadings {
    readings: Vec<Reading, MAX_CHANNELS>,
}

impl FreshReadings {
    pub fn iter(&self) -> impl Iterator<Item = &Reading> {
        self.readings.iter()
    }

    pub fn get(&self, channel: Channel) -> Option<f32> {
        self.readings
            .iter()
            .find(|r| r.channel == channel)
            .map(|r| r.value)
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

/// Staleness-aware sensor cache with fixed channel capacity
#[derive(Debug, Clone)]
pub struct SensorCache {
    slots: Vec<Slot, MAX_CHANNELS>,
    staleness_ms: u64,
}

impl Default for SensorCache {
    fn default() -> Self {
        Self::new(DEFAULT_STALENESS_MS)
    }
}

impl SensorCache {
    pub fn new(staleness_ms: u64) -> Self {
        Self {
            slots: Vec::new(),
            staleness_ms,
        }
    }

    /// Configure a channel; order of calls is the payload key order
    pub fn add_channel(&mut self, config: ChannelConfig) -> Result<(), CacheError> {
        if self.slots.iter().any(|s| s.config.channel == config.channel) {
            return Err(CacheError::Duplicate(config.channel));
        }
        self.slots
            .push(Slot {
                config,
                snapshot: SensorSnapshot::empty(),
            })
            .map_err(|_| CacheError::Full)
    }

    pub fn staleness_ms(&self) -> u64 {
        self.staleness_ms
    }

    pub fn channel_count(&self) -> usize {
        self.slots.len()
    }

    pub fn snapshot(&self, channel: Channel) -> Option<SensorSnapshot> {
        self.slots
            .iter()
            .find(|s| s.config.channel == channel)
            .map(|s| s.snapshot)
    }

    /// Read every configured channel and keep the plausible values
    pub fn sample<S: ChannelSource>(&mut self, now_ms: u64, source: &mut S) -> SampleReport {
        let mut report = SampleReport::default();

        for slot in self.slots.iter_mut() {
            match source.read(slot.config.channel) {
                Some(value) if slot.config.range.contains(value) => {
                    slot.snapshot = SensorSnapshot {
                        value,
                        valid: true,
                        captured_at_ms: now_ms,
                    };
                    report.accepted = report.accepted.saturating_add(1);
                }
                _ => {
                    // Capacity equals slot count
                    let _ = report.rejected.push(slot.config.channel);
                }
            }
        }

        report
    }

    /// Fresh readings, or the first required channel that is not fresh
    ///
    /// Optional channels that are not fresh are left out.
    pub fn read_fresh(&self, now_ms: u64) -> Result<FreshReadings, NotReady> {
        let mut fresh = FreshReadings::default();

        for slot in self.slots.iter() {
            let snap = slot.snapshot;
            if snap.is_fresh(now_ms, self.staleness_ms) {
                let _ = fresh.readings.push(Reading {
                    channel: slot.config.channel,
                    value: snap.value,
                });
                continue;
            }

            if slot.config.required {
                return Err(if snap.valid {
                    NotReady::Stale {
                        channel: slot.config.channel,
                        age_ms: snap.age_ms(now_ms),
                    }
                } else {
                    NotReady::Invalid(slot.config.channel)
                });
            }
        }

        if fresh.is_empty() {
            return Err(NotReady::Empty);
        }
        Ok(fresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Returns a fixed value per channel, or `None`
    struct FixedSource {
        temperature: Option<f32>,
        humidity: Option<f32>,
        illuminance: Option<f32>,
    }

    impl ChannelSource for FixedSource {
        fn read(&mut self, channel: Channel) -> Option<f32> {
            match channel {
                Channel::Temperature => self.temperature,
                Channel::Humidity => self.humidity,
                Channel::Illuminance => self.illuminance,
                _ => None,
            }
        }
    }

    fn climate_cache() -> SensorCache {
        let mut cache = SensorCache::new(30_000);
        cache
            .add_channel(ChannelConfig::required(Channel::Temperature))
            .unwrap();
        cache
            .add_channel(ChannelConfig::required(Channel::Humidity))
            .unwrap();
        cache
    }

    #[test]
    fn test_valid_sample_updates_snapshot() {
        let mut cache = climate_cache();
        let mut src = FixedSource {
            temperature: Some(21.5),
            humidity: Some(60.0),
            illuminance: None,
        };

        let report = cache.sample(1000, &mut src);
        assert_eq!(report.accepted, 2);
        assert_eq!(report.rejected_count(), 0);

        let snap = cache.snapshot(Channel::Temperature).unwrap();
        assert_eq!(snap.value, 21.5);
        assert!(snap.valid);
        assert_eq!(snap.captured_at_ms, 1000);
    }

    #[test]
    fn test_invalid_samples_freeze_snapshot_until_stale() {
        let mut cache = climate_cache();
        let mut src = FixedSource {
            temperature: Some(21.5),
            humidity: Some(60.0),
            illuminance: None,
        };
        cache.sample(1000, &mut src);

        src.temperature = Some(f32::NAN);
        for i in 1..=5u64 {
            let report = cache.sample(1000 + i * 2000, &mut src);
            assert_eq!(report.rejected.as_slice(), &[Channel::Temperature]);
        }

        let snap = cache.snapshot(Channel::Temperature).unwrap();
        assert_eq!(snap.value, 21.5);
        assert_eq!(snap.captured_at_ms, 1000);
        assert!(snap.valid);

        // Humidity keeps refreshing, temperature ages out
        assert!(cache.read_fresh(31_000).is_ok());
        assert_eq!(
            cache.read_fresh(31_001),
            Err(NotReady::Stale {
                channel: Channel::Temperature,
                age_ms: 30_001
            })
        );
    }

    #[test]
    fn test_out_of_range_and_missing_readings_rejected() {
        let mut cache = climate_cache();
        let mut src = FixedSource {
            temperature: Some(120.0),
            humidity: None,
            illuminance: None,
        };

        let report = cache.sample(500, &mut src);
        assert_eq!(report.accepted, 0);
        assert_eq!(report.rejected_count(), 2);
        assert_eq!(
            cache.read_fresh(500),
            Err(NotReady::Invalid(Channel::Temperature))
        );
    }

    #[test]
    fn test_optional_channel_omitted_when_not_fresh() {
        let mut cache = climate_cache();
        cache
            .add_channel(ChannelConfig::optional(Channel::Illuminance))
            .unwrap();
        let mut src = FixedSource {
            temperature: Some(20.0),
            humidity: Some(55.0),
            illuminance: Some(-3.0),
        };
        cache.sample(0, &mut src);

        let fresh = cache.read_fresh(10).unwrap();
        assert_eq!(fresh.len(), 2);
        assert_eq!(fresh.get(Channel::Illuminance), None);
        assert_eq!(fresh.get(Channel::Humidity), Some(55.0));

        src.illuminance = Some(300.0);
        cache.sample(2000, &mut src);
        let fresh = cache.read_fresh(2000).unwrap();
        let order: Vec<Channel, MAX_CHANNELS> = fresh.iter().map(|r| r.channel).collect();
        assert_eq!(
            order.as_slice(),
            &[Channel::Temperature, Channel::Humidity, Channel::Illuminance]
        );
    }

    #[test]
    fn test_all_optional_and_none_fresh_is_empty() {
        let mut cache = SensorCache::default();
        cache
            .add_channel(ChannelConfig::optional(Channel::WaterLevel))
            .unwrap();
        assert_eq!(cache.read_fresh(0), Err(NotReady::Empty));
    }

    #[test]
    fn test_add_channel_capacity_and_duplicates() {
        let mut cache = SensorCache::default();
        for ch in [
            Channel::Temperature,
            Channel::Humidity,
            Channel::Illuminance,
            Channel::WaterLevel,
            Channel::Acidity,
        ] {
            cache.add_channel(ChannelConfig::optional(ch)).unwrap();
        }
        assert_eq!(cache.channel_count(), MAX_CHANNELS);
        assert_eq!(
            cache.add_channel(ChannelConfig::required(Channel::Humidity)),
            Err(CacheError::Duplicate(Channel::Humidity))
        );

        let mut small = SensorCache::default();
        small
            .add_channel(ChannelConfig::required(Channel::Acidity))
            .unwrap();
        assert_eq!(
            small.add_channel(ChannelConfig::required(Channel::Acidity)),
            Err(CacheError::Duplicate(Channel::Acidity))
        );
    }

    #[test]
    fn test_custom_range() {
        let mut cache = SensorCache::default();
        cache
            .add_channel(
                ChannelConfig::required(Channel::Temperature)
                    .with_range(PlausibleRange::new(0.0, 50.0)),
            )
            .unwrap();
        let mut src = FixedSource {
            temperature: Some(-5.0),
            humidity: None,
            illuminance: None,
        };
        assert_eq!(cache.sample(0, &mut src).accepted, 0);
    }
}
