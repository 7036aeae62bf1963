//! Actuation boundary
//!
//! The command dispatcher hands [`ActuationIntent`]s to an [`Actuator`].
//! [`HBridgePump`] is the reference implementation: a DC pump behind a
//! two-input H-bridge, driven forward only.
//!
//! # H-Bridge Truth Table
//!
//! | IN1 | IN2 | Pump State                      |
//! |-----|-----|---------------------------------|
//! | 0   | 0   | Coast (off)                     |
//! | PWM | 0   | Running (speed = PWM duty)      |

use core::fmt;

use crate::command::{Action, ActuationIntent};

/// Actuation error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActuationError {
    /// Duty cycle outside [0.0, 1.0]
    InvalidDuty,
    /// Hardware PWM channel unavailable or failed
    HardwareFault,
}

impl fmt::Display for ActuationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActuationError::InvalidDuty => f.write_str("duty cycle out of range"),
            ActuationError::HardwareFault => f.write_str("actuator hardware fault"),
        }
    }
}

/// External driver consuming actuation intents
pub trait Actuator {
    fn apply(&mut self, intent: ActuationIntent) -> Result<(), ActuationError>;
}

/// PWM pin abstraction for actuator outputs
///
/// Platform-specific implementations wrap their HAL's PWM types.
pub trait PwmPin {
    /// Set PWM duty cycle as a fraction [0.0, 1.0]
    fn set_duty(&mut self, duty: f32) -> Result<(), ActuationError>;
}

/// Pump driven through a two-pin H-bridge
pub struct HBridgePump<IN1, IN2>
where
    IN1: PwmPin,
    IN2: PwmPin,
{
    in1: IN1,
    in2: IN2,
    full_scale: u8,
}

impl<IN1, IN2> HBridgePump<IN1, IN2>
where
    IN1: PwmPin,
    IN2: PwmPin,
{
    /// Create a pump driver where `full_scale` maps to 100% duty
    pub fn new(in1: IN1, in2: IN2, full_scale: u8) -> Self {
        Self {
            in1,
            in2,
            full_scale: full_scale.max(1),
        }
    }

    /// Run forward at `duty`
    pub fn run(&mut self, duty: f32) -> Result<(), ActuationError> {
        if !(0.0..=1.0).contains(&duty) {
            return Err(ActuationError::InvalidDuty);
        }
        self.in1.set_duty(duty)?;
        self.in2.set_duty(0.0)?;
        Ok(())
    }

    /// Coast: both inputs low
    pub fn stop(&mut self) -> Result<(), ActuationError> {
        self.in1.set_duty(0.0)?;
        self.in2.set_duty(0.0)?;
        Ok(())
    }

    pub fn release(self) -> (IN1, IN2) {
        (self.in1, self.in2)
    }

    #[cfg(test)]
    pub fn in1(&self) -> &IN1 {
        &self.in1
    }

    #[cfg(test)]
    pub fn in2(&self) -> &IN2 {
        &self.in2
    }
}

impl<IN1, IN2> Actuator for HBridgePump<IN1, IN2>
where
    IN1: PwmPin,
    IN2: PwmPin,
{
    fn apply(&mut self, intent: ActuationIntent) -> Result<(), ActuationError> {
        match intent.action {
            Action::On => {
                let magnitude = intent.value.min(self.full_scale);
                self.run(f32::from(magnitude) / f32::from(self.full_scale))
            }
            Action::Off => self.stop(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct MockPwmPin {
        duty: f32,
        fail: bool,
    }

    impl PwmPin for MockPwmPin {
        fn set_duty(&mut self, duty: f32) -> Result<(), ActuationError> {
            if self.fail {
                return Err(ActuationError::HardwareFault);
            }
            self.duty = duty;
            Ok(())
        }
    }

    fn pump() -> HBridgePump<MockPwmPin, MockPwmPin> {
        HBridgePump::new(MockPwmPin::default(), MockPwmPin::default(), 255)
    }

    #[test]
    fn test_on_drives_in1_only() {
        let mut pump = pump();
        pump.apply(ActuationIntent {
            action: Action::On,
            value: 255,
        })
        .unwrap();
        assert_eq!(pump.in1().duty, 1.0);
        assert_eq!(pump.in2().duty, 0.0);

        pump.apply(ActuationIntent {
            action: Action::On,
            value: 51,
        })
        .unwrap();
        let duty = pump.in1().duty;
        assert!(duty > 0.199 && duty < 0.201);
    }

    #[test]
    fn test_off_coasts() {
        let mut pump = pump();
        pump.run(0.5).unwrap();
        pump.apply(ActuationIntent {
            action: Action::Off,
            value: 0,
        })
        .unwrap();
        assert_eq!(pump.in1().duty, 0.0);
        assert_eq!(pump.in2().duty, 0.0);
    }

    #[test]
    fn test_run_rejects_invalid_duty() {
        let mut pump = pump();
        assert_eq!(pump.run(1.5), Err(ActuationError::InvalidDuty));
        assert_eq!(pump.run(f32::NAN), Err(ActuationError::InvalidDuty));
    }

    #[test]
    fn test_hardware_fault_propagates() {
        let mut pump = HBridgePump::new(
            MockPwmPin {
                duty: 0.0,
                fail: true,
            },
            MockPwmPin::default(),
            255,
        );
        assert_eq!(
            pump.apply(ActuationIntent {
                action: Action::On,
                value: 100,
            }),
            Err(ActuationError::HardwareFault)
        );
    }

    #[test]
    fn test_custom_full_scale() {
        let mut pump = HBridgePump::new(MockPwmPin::default(), MockPwmPin::default(), 100);
        pump.apply(ActuationIntent {
            action: Action::On,
            value: 200,
        })
        .unwrap();
        assert_eq!(pump.in1().duty, 1.0);
    }
}
