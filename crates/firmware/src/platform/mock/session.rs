//! Mock message session for testing

use std::collections::VecDeque;
use std::string::{String, ToString};
use std::vec::Vec;

use crate::platform::{
    error::{PlatformError, SessionError},
    traits::{ConnectOptions, MessageSession, QoS},
    Result,
};

/// Mock broker session
///
/// Connect and publish results are scripted through queues; an empty
/// queue means success. Published messages and connect attempts are
/// recorded for assertions.
#[derive(Debug, Default)]
pub struct MockSession {
    connected: bool,
    connect_results: VecDeque<core::result::Result<(), SessionError>>,
    subscribe_results: VecDeque<core::result::Result<(), SessionError>>,
    publish_results: VecDeque<core::result::Result<(), SessionError>>,
    inbound: VecDeque<(String, Vec<u8>)>,
    connect_attempts: Vec<String>,
    subscriptions: Vec<(String, QoS)>,
    published: Vec<(String, Vec<u8>)>,
    polls: u32,
}

impl MockSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the outcome of the next connect
    pub fn queue_connect(&mut self, result: core::result::Result<(), SessionError>) -> &mut Self {
        self.connect_results.push_back(result);
        self
    }

    /// Script the outcome of the next subscribe
    pub fn queue_subscribe(
        &mut self,
        result: core::result::Result<(), SessionError>,
    ) -> &mut Self {
        self.subscribe_results.push_back(result);
        self
    }

    /// Script the outcome of the next publish
    pub fn queue_publish(&mut self, result: core::result::Result<(), SessionError>) -> &mut Self {
        self.publish_results.push_back(result);
        self
    }

    /// Make a message available to the next `poll`
    pub fn push_inbound(&mut self, topic: &str, payload: &[u8]) {
        self.inbound.push_back((topic.to_string(), payload.to_vec()));
    }

    /// Simulate the broker dropping the session
    pub fn drop_connection(&mut self) {
        self.connected = false;
    }

    /// Client ids of every connect call
    pub fn connect_attempts(&self) -> &[String] {
        &self.connect_attempts
    }

    pub fn subscriptions(&self) -> &[(String, QoS)] {
        &self.subscriptions
    }

    /// Number of `poll` calls, connected or not
    pub fn polls(&self) -> u32 {
        self.polls
    }

    pub fn published(&self) -> &[(String, Vec<u8>)] {
        &self.published
    }

    /// Payloads published to `topic`, as strings
    pub fn published_to(&self, topic: &str) -> Vec<String> {
        self.published
            .iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, p)| String::from_utf8_lossy(p).into_owned())
            .collect()
    }
}

impl MessageSession for MockSession {
    fn connect(&mut self, options: &ConnectOptions<'_>) -> Result<()> {
        self.connect_attempts.push(options.client_id.to_string());
        match self.connect_results.pop_front().unwrap_or(Ok(())) {
            Ok(()) => {
                self.connected = true;
                Ok(())
            }
            Err(e) => {
                self.connected = false;
                Err(PlatformError::Session(e))
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn subscribe(&mut self, topic: &str, qos: QoS) -> Result<()> {
        if !self.connected {
            return Err(PlatformError::Session(SessionError::NotConnected));
        }
        self.subscribe_results
            .pop_front()
            .unwrap_or(Ok(()))
            .map_err(PlatformError::Session)?;
        self.subscriptions.push((topic.to_string(), qos));
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<()> {
        if !self.connected {
            return Err(PlatformError::Session(SessionError::NotConnected));
        }
        self.publish_results
            .pop_front()
            .unwrap_or(Ok(()))
            .map_err(PlatformError::Session)?;
        self.published.push((topic.to_string(), payload.to_vec()));
        Ok(())
    }

    fn poll<F>(&mut self, mut handler: F) -> Result<usize>
    where
        F: FnMut(&str, &[u8]),
    {
        self.polls += 1;
        if !self.connected {
            return Err(PlatformError::Session(SessionError::NotConnected));
        }
        let mut delivered = 0;
        while let Some((topic, payload)) = self.inbound.pop_front() {
            handler(&topic, &payload);
            delivered += 1;
        }
        Ok(delivered)
    }

    fn disconnect(&mut self) {
        self.connected = false;
    }
}
