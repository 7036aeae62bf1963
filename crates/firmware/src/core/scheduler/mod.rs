//! Cooperative task scheduling for the node
//!
//! Timing and statistics live in `plant_pulse_core::scheduler`; this module
//! binds them to the node's tasks and peripherals. The node runs on a single
//! thread with no executor:
//!
//! - Tasks run in registration order, each at most once per pass
//! - Execution time is measured per task and compared to its budget
//! - CPU load is reported over each monitor window
//!
//! # Example
//!
//! ```rust,ignore
//! use plant_pulse_firmware::core::scheduler::{run, Peripherals};
//! use plant_pulse_firmware::parameters::NodeParams;
//!
//! let params = NodeParams::from_build_env()?;
//! run(params, Peripherals { timer, network, clock, session, sensors, actuator, indicator });
//! ```

pub mod monitor;
pub mod node;

pub use monitor::*;
pub use node::*;
