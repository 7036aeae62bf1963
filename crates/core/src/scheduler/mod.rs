//! Cooperative scheduler types and statistics
//!
//! This module provides core types for elapsed-time task scheduling without
//! any platform dependencies. The loop that measures time, runs actions and
//! sleeps between passes lives in the firmware crate.
//!
//! # Components
//!
//! - [`types`]: Core types (TaskMetadata, PeriodicTask, TaskStats, SchedulerStats)
//! - [`registry`]: Fixed-capacity task registration and due-task collection
//!
//! # Example
//!
//! ```rust
//! use plant_pulse_core::scheduler::{Schedule, TaskMetadata};
//!
//! let mut schedule = Schedule::new(0);
//! let sample = schedule
//!     .register(TaskMetadata::new("sample", 2000, 5000), 0)
//!     .unwrap();
//!
//! assert!(schedule.due(1999).is_empty());
//! assert_eq!(schedule.due(2000).as_slice(), &[sample]);
//! ```

pub mod registry;
pub mod types;

pub use registry::*;
pub use types::*;
