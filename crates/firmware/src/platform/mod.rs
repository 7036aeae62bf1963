//! Platform abstraction layer
//!
//! This module provides hardware and transport abstraction for the node.
//! All platform-specific code must be isolated behind these traits.

pub mod error;
pub mod traits;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export commonly used types
pub use error::{NetworkError, PlatformError, PwmError, Result, SessionError, TimerError};
pub use traits::{
    ClockSource, ConnectOptions, HttpResponse, MessageSession, NetworkInterface,
    PwmInterface, QoS, TimerInterface, TrustLevel,
};
