//! Message session (MQTT-style broker client) interface
//!
//! Operations are expected to honor the transport's own timeout and return
//! promptly. `poll` hands every queued inbound message to a handler and
//! returns without waiting for new ones.

use crate::platform::Result;

/// Delivery guarantee for a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum QoS {
    AtMostOnce,
    AtLeastOnce,
}

/// Connection parameters for one connect attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectOptions<'a> {
    pub host: &'a str,
    pub port: u16,
    /// Stable per device so the broker replaces a stale session
    pub client_id: &'a str,
    pub user: &'a str,
    pub password: &'a str,
    pub keep_alive_secs: u16,
    pub clean_session: bool,
}

/// Message session trait
pub trait MessageSession {
    /// Open the session
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Session` if the broker refuses or the
    /// transport fails.
    fn connect(&mut self, options: &ConnectOptions<'_>) -> Result<()>;

    fn is_connected(&self) -> bool;

    /// Subscribe to `topic`
    fn subscribe(&mut self, topic: &str, qos: QoS) -> Result<()>;

    /// Publish `payload` to `topic`
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<()>;

    /// Deliver queued inbound messages to `handler`, returning how many
    fn poll<F>(&mut self, handler: F) -> Result<usize>
    where
        F: FnMut(&str, &[u8]);

    /// Close the session, ignoring errors
    fn disconnect(&mut self);
}
