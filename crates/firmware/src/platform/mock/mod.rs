//! Mock platform implementation for testing
//!
//! This module provides mock implementations of platform traits that can be used
//! for unit and scenario testing without hardware or a network.
//!
//! # Feature Gate
//!
//! This module is available in two contexts:
//! - During test builds (`#[cfg(test)]`)
//! - When the `mock` feature is enabled (host builds only, mocks use `std`)
//!
//! Time is virtual: [`MockTimer`] advances only when something delays, so
//! bootstrap waits and the node loop are deterministic.
//!
//! # Example
//!
//! ```rust,ignore
//! use plant_pulse_firmware::platform::mock::MockTimer;
//! use plant_pulse_firmware::platform::traits::TimerInterface;
//!
//! let mut timer = MockTimer::new();
//! timer.delay_ms(500).unwrap();
//! assert_eq!(timer.now_ms(), 500);
//! ```

extern crate std;

mod actuator;
mod clock;
mod indicator;
mod network;
mod pwm;
mod sensors;
mod session;
mod timer;

pub use actuator::MockActuator;
pub use clock::MockClock;
pub use indicator::MockIndicator;
pub use network::{MockNetwork, MockResponse};
pub use pwm::MockPwm;
pub use sensors::MockSensors;
pub use session::MockSession;
pub use timer::MockTimer;
