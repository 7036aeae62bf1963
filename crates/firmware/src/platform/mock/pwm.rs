//! Mock PWM implementation for testing

use crate::platform::{
    error::{PlatformError, PwmError},
    traits::PwmInterface,
    Result,
};

/// Mock PWM implementation
///
/// Tracks the duty cycle and accepted writes for test verification. A
/// failing channel rejects every write.
#[derive(Debug, Default)]
pub struct MockPwm {
    duty_cycle: f32,
    writes: u32,
    failing: bool,
}

impl MockPwm {
    /// Channel starting at 0% duty
    pub fn new() -> Self {
        Self::default()
    }

    /// Channel whose writes all fail
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Number of accepted duty-cycle writes
    pub fn writes(&self) -> u32 {
        self.writes
    }
}

impl PwmInterface for MockPwm {
    fn set_duty_cycle(&mut self, duty_cycle: f32) -> Result<()> {
        if self.failing {
            return Err(PlatformError::Pwm(PwmError::ChannelUnavailable));
        }
        if !(0.0..=1.0).contains(&duty_cycle) {
            return Err(PlatformError::Pwm(PwmError::InvalidDutyCycle));
        }
        self.duty_cycle = duty_cycle;
        self.writes += 1;
        Ok(())
    }

    fn duty_cycle(&self) -> f32 {
        self.duty_cycle
    }
}
