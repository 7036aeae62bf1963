//! Core node functionality
//!
//! Firmware-side state and control flow. Pure logic (health codes, sensor
//! cache, session tracking, scheduling) lives in `plant_pulse_core`.

pub mod context;
pub mod logging;
pub mod scheduler;
pub mod status;
