//! RGB status LED
//!
//! Three PWM channels, one per color component. Each rendered
//! [`IndicatorFrame`] maps to 8-bit levels; an unlit frame drives all three
//! channels to zero.

use plant_pulse_core::indicator::{IndicatorFrame, IndicatorOutput};

use crate::platform::{traits::PwmInterface, PlatformError};

/// Common-cathode RGB LED on three PWM channels
pub struct RgbLed<R, G, B>
where
    R: PwmInterface,
    G: PwmInterface,
    B: PwmInterface,
{
    red: R,
    green: G,
    blue: B,
    last: Option<(u8, u8, u8)>,
}

impl<R, G, B> RgbLed<R, G, B>
where
    R: PwmInterface,
    G: PwmInterface,
    B: PwmInterface,
{
    pub fn new(red: R, green: G, blue: B) -> Self {
        Self {
            red,
            green,
            blue,
            last: None,
        }
    }

    /// Levels last written, if any
    pub fn levels(&self) -> Option<(u8, u8, u8)> {
        self.last
    }

    pub fn release(self) -> (R, G, B) {
        (self.red, self.green, self.blue)
    }
}

impl<R, G, B> IndicatorOutput for RgbLed<R, G, B>
where
    R: PwmInterface,
    G: PwmInterface,
    B: PwmInterface,
{
    type Error = PlatformError;

    fn show(&mut self, frame: IndicatorFrame) -> Result<(), Self::Error> {
        let levels = frame.rgb();
        // Rendered every pass; skip PWM writes when nothing changed
        if self.last == Some(levels) {
            return Ok(());
        }
        let (r, g, b) = levels;
        self.red.set_level(r)?;
        self.green.set_level(g)?;
        self.blue.set_level(b)?;
        self.last = Some(levels);
        Ok(())
    }
}
