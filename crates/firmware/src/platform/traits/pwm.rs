//! PWM interface trait
//!
//! PWM channels drive the RGB status LED and the pump H-bridge inputs.

use crate::platform::Result;

/// PWM interface trait
///
/// # Safety Invariants
///
/// - PWM peripheral must be initialized before use
/// - Only one owner per PWM channel
/// - Duty cycle must be in range [0.0, 1.0]
pub trait PwmInterface {
    /// Set PWM duty cycle
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Pwm(PwmError::InvalidDutyCycle)` if the duty cycle
    /// is outside the valid range [0.0, 1.0].
    fn set_duty_cycle(&mut self, duty_cycle: f32) -> Result<()>;

    /// Current duty cycle as a fraction
    fn duty_cycle(&self) -> f32;

    /// Set 8-bit level, 255 = full on
    fn set_level(&mut self, level: u8) -> Result<()> {
        self.set_duty_cycle(f32::from(level) / 255.0)
    }
}
