//! Device drivers
//!
//! Drivers sit on top of the platform traits and are platform-agnostic.
//!
//! - `rgb_led`: status indicator output on three PWM channels
//! - `pump`: H-bridge pump on two PWM channels

pub mod pump;
pub mod rgb_led;

pub use pump::{pwm_pump, LoggedActuator, PwmOutput, PwmPump};
pub use rgb_led::RgbLed;
