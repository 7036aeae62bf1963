#![cfg_attr(not(test), no_std)]

//! plant_pulse_firmware - firmware for a plant monitoring node
//!
//! Drives the sensor/actuator node on top of the pure logic in
//! `plant_pulse_core`.
//!
//! # Design Principles
//!
//! - **Platform traits**: timer, PWM, network, clock and session access
//!   behind traits, with mocks for host tests
//! - **Cooperative loop**: one thread, no task ever sleeps
//! - **defmt logging**: structured logs on target, stdout in tests
//! - **Device drivers**: RGB status LED and H-bridge pump over PWM

// Platform abstraction layer
pub mod platform;

// Device drivers using platform abstraction
pub mod devices;

// Node state, status display and scheduler
pub mod core;

// Bootstrap, identity lookup and messaging session
pub mod communication;

// Build-time node configuration
pub mod parameters;

// Note: Logging macros (log_info!, log_warn!, log_error!, log_debug!, log_trace!)
// are exported at crate root via #[macro_export] in core::logging
