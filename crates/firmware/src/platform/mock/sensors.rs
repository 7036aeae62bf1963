//! Mock sensor drivers for testing

use plant_pulse_core::sensors::{Channel, ChannelSource};

/// Per-channel values handed out on every read
#[derive(Debug, Default, Clone)]
pub struct MockSensors {
    temperature: Option<f32>,
    humidity: Option<f32>,
    illuminance: Option<f32>,
    water_level: Option<f32>,
    acidity: Option<f32>,
    reads: u32,
}

impl MockSensors {
    /// All channels unavailable
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or clear, with `None`) the value of one channel
    pub fn set(&mut self, channel: Channel, value: Option<f32>) -> &mut Self {
        *self.slot(channel) = value;
        self
    }

    /// Total channel reads served
    pub fn reads(&self) -> u32 {
        self.reads
    }

    fn slot(&mut self, channel: Channel) -> &mut Option<f32> {
        match channel {
            Channel::Temperature => &mut self.temperature,
            Channel::Humidity => &mut self.humidity,
            Channel::Illuminance => &mut self.illuminance,
            Channel::WaterLevel => &mut self.water_level,
            Channel::Acidity => &mut self.acidity,
        }
    }
}

impl ChannelSource for MockSensors {
    fn read(&mut self, channel: Channel) -> Option<f32> {
        self.reads += 1;
        *self.slot(channel)
    }
}
