//! plant_pulse_core - Pure no_std logic for the plant_pulse sensor/actuator node
//!
//! This crate contains platform-agnostic state machines and types
//! that can be tested on host without any embedded dependencies.
//!
//! # Design Principles
//!
//! - **Pure no_std**: No std library, no allocator, fixed-capacity `heapless` storage
//! - **Explicit time**: Every entry point takes `now_ms` instead of reading a clock
//! - **Trait abstractions**: Sensors, actuators and indicator outputs injected via traits
//! - **No logging**: Functions return outcomes; the firmware crate decides what to log
//!
//! # Modules
//!
//! - [`health`]: Health codes shown on the status indicator
//! - [`indicator`]: Color/pattern lookup and the non-blocking blink state machine
//! - [`sensors`]: Channel table, plausibility ranges and the staleness-aware cache
//! - [`scheduler`]: Periodic task types, registry and execution statistics
//! - [`session`]: Message-session state and reconnect rate limiting
//! - [`identity`]: Resolved identity and topic derivation
//! - [`codec`]: JSON wire formats for identity, sensor data and commands
//! - [`command`]: Inbound command dispatch to actuation intents
//! - [`actuator`]: Actuation boundary and the H-bridge pump driver

#![no_std]

pub mod actuator;
pub mod codec;
pub mod command;
pub mod health;
pub mod identity;
pub mod indicator;
pub mod scheduler;
pub mod sensors;
pub mod session;
