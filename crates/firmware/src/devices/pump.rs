//! Pump driver wiring
//!
//! The H-bridge logic lives in `plant_pulse_core::actuator`; this module
//! adapts platform PWM channels to its [`PwmPin`] seam and logs actuation.

use plant_pulse_core::actuator::{ActuationError, Actuator, HBridgePump, PwmPin};
use plant_pulse_core::command::{Action, ActuationIntent};

use crate::platform::{traits::PwmInterface, PlatformError, PwmError};

/// Platform PWM channel usable as an H-bridge input
pub struct PwmOutput<P: PwmInterface> {
    pwm: P,
}

impl<P: PwmInterface> PwmOutput<P> {
    pub fn new(pwm: P) -> Self {
        Self { pwm }
    }

    pub fn inner(&self) -> &P {
        &self.pwm
    }
}

impl<P: PwmInterface> PwmPin for PwmOutput<P> {
    fn set_duty(&mut self, duty: f32) -> Result<(), ActuationError> {
        self.pwm.set_duty_cycle(duty).map_err(|e| match e {
            PlatformError::Pwm(PwmError::InvalidDutyCycle) => ActuationError::InvalidDuty,
            _ => ActuationError::HardwareFault,
        })
    }
}

/// Pump on two platform PWM channels
pub type PwmPump<P1, P2> = HBridgePump<PwmOutput<P1>, PwmOutput<P2>>;

/// Build a pump whose `full_scale` magnitude maps to 100% duty
pub fn pwm_pump<P1, P2>(in1: P1, in2: P2, full_scale: u8) -> PwmPump<P1, P2>
where
    P1: PwmInterface,
    P2: PwmInterface,
{
    HBridgePump::new(PwmOutput::new(in1), PwmOutput::new(in2), full_scale)
}

/// Actuator wrapper logging every intent and driver failure
pub struct LoggedActuator<A: Actuator> {
    inner: A,
}

impl<A: Actuator> LoggedActuator<A> {
    pub fn new(inner: A) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }
}

impl<A: Actuator> Actuator for LoggedActuator<A> {
    fn apply(&mut self, intent: ActuationIntent) -> Result<(), ActuationError> {
        match intent.action {
            Action::On => crate::log_info!("Pump on at {}", intent.value),
            Action::Off => crate::log_info!("Pump off"),
        }
        let result = self.inner.apply(intent);
        if let Err(e) = result {
            crate::log_error!("Pump actuation failed: {}", e);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::MockPwm;

    #[test]
    fn test_on_drives_in1_only() {
        let mut pump = pwm_pump(MockPwm::default(), MockPwm::default(), 255);
        pump.apply(ActuationIntent {
            action: Action::On,
            value: 255,
        })
        .unwrap();

        let (in1, in2) = pump.release();
        assert_eq!(in1.inner().duty_cycle(), 1.0);
        assert_eq!(in2.inner().duty_cycle(), 0.0);
    }

    #[test]
    fn test_off_coasts() {
        let mut pump = pwm_pump(MockPwm::default(), MockPwm::default(), 255);
        pump.apply(ActuationIntent {
            action: Action::On,
            value: 200,
        })
        .unwrap();
        pump.apply(ActuationIntent {
            action: Action::Off,
            value: 0,
        })
        .unwrap();

        let (in1, in2) = pump.release();
        assert_eq!(in1.inner().duty_cycle(), 0.0);
        assert_eq!(in2.inner().duty_cycle(), 0.0);
    }

    #[test]
    fn test_pwm_failure_maps_to_hardware_fault() {
        let mut pump = LoggedActuator::new(pwm_pump(MockPwm::failing(), MockPwm::default(), 255));
        assert_eq!(
            pump.apply(ActuationIntent {
                action: Action::On,
                value: 10,
            }),
            Err(ActuationError::HardwareFault)
        );
    }
}
