//! Identity resolution
//!
//! Looks up the user and group a device belongs to, keyed by the compiled-in
//! device id. Runs once during bootstrap; the result is fixed until reboot.
//!
//! Each attempt must return status 200 with a body that parses into a valid
//! identity. Failed attempts are retried after a fixed backoff, during which
//! the indicator keeps rendering.

use core::fmt;

use plant_pulse_core::codec::{self, CodecError};
use plant_pulse_core::identity::Credentials;
use plant_pulse_core::indicator::IndicatorOutput;
use plant_pulse_core::session::RetryPolicy;

use crate::core::status::IndicatorPause;
use crate::platform::{
    traits::{NetworkInterface, TimerInterface, TrustLevel},
    NetworkError, PlatformError,
};

/// Largest identity reply accepted
pub const IDENTITY_BODY_LEN: usize = 512;

/// Why one resolution attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResolveError {
    /// No HTTP response
    Request(PlatformError),
    /// Response status other than 200
    Status(u16),
    /// Body unusable
    Reply(CodecError),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::Request(e) => write!(f, "request failed: {}", e),
            ResolveError::Status(status) => write!(f, "status {}", status),
            ResolveError::Reply(e) => write!(f, "bad reply: {}", e),
        }
    }
}

/// Identity endpoint client
#[derive(Debug, Clone, Copy)]
pub struct IdentityResolver<'a> {
    endpoint: &'a str,
    device_id: &'a str,
    retry: RetryPolicy,
    timeout_ms: u32,
}

impl<'a> IdentityResolver<'a> {
    pub fn new(endpoint: &'a str, device_id: &'a str, retry: RetryPolicy, timeout_ms: u32) -> Self {
        Self {
            endpoint,
            device_id,
            retry,
            timeout_ms,
        }
    }

    /// Resolve over `trust`, retrying per the policy
    ///
    /// Returns the error of the last attempt once retries are exhausted.
    pub fn resolve<N, T, O>(
        &self,
        network: &mut N,
        trust: TrustLevel,
        pause: &mut IndicatorPause<'_, T, O>,
    ) -> Result<Credentials, ResolveError>
    where
        N: NetworkInterface,
        T: TimerInterface,
        O: IndicatorOutput,
    {
        let url = codec::identity_url(self.endpoint, self.device_id).map_err(ResolveError::Reply)?;
        crate::log_info!("Resolving identity over {} transport", trust.as_str());

        let mut attempt: u8 = 1;
        loop {
            match self.attempt(network, url.as_str(), trust) {
                Ok(credentials) => {
                    crate::log_info!(
                        "Identity resolved: user={} group={}",
                        credentials.identity.user_id(),
                        credentials.identity.group_id()
                    );
                    return Ok(credentials);
                }
                Err(e) => {
                    crate::log_warn!(
                        "Identity attempt {}/{} failed: {}",
                        attempt,
                        self.retry.attempts,
                        e
                    );
                    if !self.retry.has_next(attempt) {
                        return Err(e);
                    }
                }
            }
            pause.wait(self.retry.backoff_ms);
            attempt += 1;
        }
    }

    fn attempt<N: NetworkInterface>(
        &self,
        network: &mut N,
        url: &str,
        trust: TrustLevel,
    ) -> Result<Credentials, ResolveError> {
        let mut body = [0u8; IDENTITY_BODY_LEN];
        let response = network
            .http_get(url, trust, self.timeout_ms, &mut body)
            .map_err(ResolveError::Request)?;

        if !response.is_ok() {
            return Err(ResolveError::Status(response.status));
        }
        if response.truncated {
            return Err(ResolveError::Request(PlatformError::Network(
                NetworkError::BodyTooLarge,
            )));
        }

        let identity = codec::parse_identity(&body[..response.body_len], self.device_id)
            .map_err(ResolveError::Reply)?;
        Ok(Credentials::new(identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::status::StatusDisplay;
    use crate::platform::mock::{MockIndicator, MockNetwork, MockResponse, MockTimer};

    const ENDPOINT: &str = "https://id.example/lookup";

    fn resolver() -> IdentityResolver<'static> {
        IdentityResolver::new(ENDPOINT, "42", RetryPolicy::new(3, 5000), 15_000)
    }

    fn resolve(network: &mut MockNetwork, timer: &mut MockTimer) -> Result<Credentials, ResolveError> {
        let mut out = MockIndicator::new();
        let mut status = StatusDisplay::new();
        let mut pause = IndicatorPause::new(timer, &mut out, &mut status, 10);
        resolver().resolve(network, TrustLevel::Verified, &mut pause)
    }

    #[test]
    fn test_resolves_and_derives_topics() {
        let mut net = MockNetwork::new();
        net.always(
            TrustLevel::Verified,
            ENDPOINT,
            MockResponse::ok(r#"{"userId":"u1","groupId":"g1"}"#),
        );
        let mut timer = MockTimer::new();

        let creds = resolve(&mut net, &mut timer).unwrap();
        assert_eq!(creds.topics.data.as_str(), "u1/g1/42/sensor");
        assert_eq!(creds.topics.command.as_str(), "u1/g1/42/control");
        assert_eq!(creds.topics.liveness.as_str(), "u1/g1/42/ping");
        assert_eq!(net.calls()[0].0, "https://id.example/lookup?deviceId=42");
        assert_eq!(timer.delayed_ms(), 0);
    }

    #[test]
    fn test_retries_with_backoff() {
        let mut net = MockNetwork::new();
        net.queue(TrustLevel::Verified, ENDPOINT, MockResponse::status(503))
            .queue(
                TrustLevel::Verified,
                ENDPOINT,
                MockResponse::fail(NetworkError::Timeout),
            )
            .always(
                TrustLevel::Verified,
                ENDPOINT,
                MockResponse::ok(r#"{"userId":"u1","groupId":"g1"}"#),
            );
        let mut timer = MockTimer::new();

        assert!(resolve(&mut net, &mut timer).is_ok());
        assert_eq!(net.calls_to(ENDPOINT), 3);
        assert_eq!(timer.delayed_ms(), 10_000);
    }

    #[test]
    fn test_exhaustion_returns_last_error() {
        let mut net = MockNetwork::new();
        net.always(
            TrustLevel::Verified,
            ENDPOINT,
            MockResponse::ok(r#"{"userId":"u1"}"#),
        );
        let mut timer = MockTimer::new();

        assert_eq!(
            resolve(&mut net, &mut timer),
            Err(ResolveError::Reply(CodecError::Malformed))
        );
        assert_eq!(net.calls_to(ENDPOINT), 3);
        // No wait after the final attempt
        assert_eq!(timer.delayed_ms(), 10_000);
    }

    #[test]
    fn test_forbidden_id_is_a_failed_attempt() {
        let mut net = MockNetwork::new();
        net.always(
            TrustLevel::Verified,
            ENDPOINT,
            MockResponse::ok(r#"{"userId":"u/1","groupId":"g1"}"#),
        );
        let mut timer = MockTimer::new();

        assert!(matches!(
            resolve(&mut net, &mut timer),
            Err(ResolveError::Reply(CodecError::Identity(_)))
        ));
    }
}
