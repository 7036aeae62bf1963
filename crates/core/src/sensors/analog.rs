//! Analog probe conversions
//!
//! Water level and pH probes are read through a 12-bit ADC referenced to
//! 3.3 V.

use super::{Channel, ChannelSource};

/// Full-scale count of a 12-bit converter
pub const ADC_FULL_SCALE: u16 = 4095;

/// ADC reference voltage
pub const ADC_REFERENCE_VOLTS: f32 = 3.3;

/// pH probe transfer function: pH = slope * volts + offset
pub const PH_SLOPE: f32 = 3.5;
pub const PH_OFFSET: f32 = 4.0;

/// Raw count to volts, counts above full scale saturate
pub fn adc_to_volts(raw: u16) -> f32 {
    f32::from(raw.min(ADC_FULL_SCALE)) * ADC_REFERENCE_VOLTS / f32::from(ADC_FULL_SCALE)
}

pub fn ph_from_raw(raw: u16) -> f32 {
    PH_SLOPE * adc_to_volts(raw) + PH_OFFSET
}

pub fn water_level_percent(raw: u16) -> f32 {
    f32::from(raw.min(ADC_FULL_SCALE)) * 100.0 / f32::from(ADC_FULL_SCALE)
}

/// Raw ADC access for the analog probes
pub trait AdcReader {
    fn read_raw(&mut self, channel: Channel) -> Option<u16>;
}

/// [`ChannelSource`] for the analog probes
///
/// Converts water level and pH counts to engineering units. Other channels
/// read as `None`.
#[derive(Debug)]
pub struct AnalogSource<A> {
    adc: A,
}

impl<A: AdcReader> AnalogSource<A> {
    pub fn new(adc: A) -> Self {
        Self { adc }
    }

    pub fn into_inner(self) -> A {
        self.adc
    }
}

impl<A: AdcReader> ChannelSource for AnalogSource<A> {
    fn read(&mut self, channel: Channel) -> Option<f32> {
        match channel {
            Channel::WaterLevel => self.adc.read_raw(channel).map(water_level_percent),
            Channel::Acidity => self.adc.read_raw(channel).map(ph_from_raw),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        let d = a - b;
        d < 1e-3 && d > -1e-3
    }

    struct FixedAdc(u16);

    impl AdcReader for FixedAdc {
        fn read_raw(&mut self, _channel: Channel) -> Option<u16> {
            Some(self.0)
        }
    }

    #[test]
    fn test_volts_conversion() {
        assert!(close(adc_to_volts(0), 0.0));
        assert!(close(adc_to_volts(4095), 3.3));
        assert!(close(adc_to_volts(u16::MAX), 3.3));
    }

    #[test]
    fn test_ph_transfer() {
        // 0 V -> pH 4.0, 1.0 V -> pH 7.5
        assert!(close(ph_from_raw(0), 4.0));
        let ph = ph_from_raw(1241);
        assert!(ph > 7.49 && ph < 7.51);
    }

    #[test]
    fn test_water_level_percent() {
        assert!(close(water_level_percent(0), 0.0));
        assert!(close(water_level_percent(4095), 100.0));
        assert!(close(water_level_percent(2048), 50.012));
    }

    #[test]
    fn test_analog_source_routes_channels() {
        let mut src = AnalogSource::new(FixedAdc(4095));
        assert!(close(src.read(Channel::WaterLevel).unwrap(), 100.0));
        assert!(close(src.read(Channel::Acidity).unwrap(), 3.5 * 3.3 + 4.0));
        assert_eq!(src.read(Channel::Temperature), None);
    }
}
