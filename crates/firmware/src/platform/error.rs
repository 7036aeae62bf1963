//! Platform error types
//!
//! This module defines error types for platform operations.

use core::fmt;

/// Result type for platform operations
pub type Result<T> = core::result::Result<T, PlatformError>;

/// Platform-level errors
///
/// All platform implementations map their HAL-specific errors to these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlatformError {
    /// PWM operation failed
    Pwm(PwmError),
    /// Timer operation failed
    Timer(TimerError),
    /// Network transport operation failed
    Network(NetworkError),
    /// Message session operation failed
    Session(SessionError),
    /// Platform initialization failed
    InitializationFailed,
    /// Invalid configuration provided
    InvalidConfig,
}

/// PWM-specific errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PwmError {
    /// Invalid duty cycle value
    InvalidDutyCycle,
    /// Channel not available
    ChannelUnavailable,
}

/// Timer-specific errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerError {
    /// Timer overflow
    Overflow,
    /// Invalid duration
    InvalidDuration,
}

/// Network transport errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NetworkError {
    /// Wireless link is down
    LinkDown,
    /// Host name could not be resolved
    DnsFailed,
    /// TCP connection refused or reset
    ConnectFailed,
    /// TLS handshake or certificate verification failed
    TlsFailed,
    /// No response within the request timeout
    Timeout,
    /// Response body larger than the receive buffer
    BodyTooLarge,
}

/// Message session errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionError {
    /// Broker refused the connection
    Refused,
    /// Session is not connected
    NotConnected,
    /// Broker rejected the subscription
    SubscribeFailed,
    /// Publish was not accepted
    PublishFailed,
    /// Transport failed underneath the session
    Transport,
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::Pwm(e) => write!(f, "PWM error: {:?}", e),
            PlatformError::Timer(e) => write!(f, "Timer error: {:?}", e),
            PlatformError::Network(e) => write!(f, "Network error: {:?}", e),
            PlatformError::Session(e) => write!(f, "Session error: {:?}", e),
            PlatformError::InitializationFailed => write!(f, "Platform initialization failed"),
            PlatformError::InvalidConfig => write!(f, "Invalid configuration"),
        }
    }
}

// From implementations for error conversion
impl From<NetworkError> for PlatformError {
    fn from(error: NetworkError) -> Self {
        PlatformError::Network(error)
    }
}

impl From<SessionError> for PlatformError {
    fn from(error: SessionError) -> Self {
        PlatformError::Session(error)
    }
}

impl From<PwmError> for PlatformError {
    fn from(error: PwmError) -> Self {
        PlatformError::Pwm(error)
    }
}
