//! Bootstrap diagnostic chain
//!
//! Runs once, before the scheduler starts, and is the only place the node
//! blocks for long. Waits are sliced so the indicator keeps rendering.
//!
//! # Sequence
//!
//! ```text
//! (a) plain probe ──fail──▶ ProbeFailed (fatal, no further network calls)
//!        │
//! (b) clock sync ──fail──▶ ClockSyncFailed, skip (c)/(d)
//!        │
//! (c) unverified probe of identity endpoint ──ok──▶ TransportUnverified
//! (d) verified probe of identity endpoint   ──ok──▶ TransportVerified
//!        │
//! identity resolution over the chosen transport ──fail──▶ IdentityFailed (fatal)
//! ```
//!
//! Steps (c) and (d) only inform which transport identity resolution uses;
//! their failure does not stop the chain.

use core::fmt;

use plant_pulse_core::health::HealthCode;
use plant_pulse_core::identity::Credentials;
use plant_pulse_core::indicator::IndicatorOutput;

use super::identity::IdentityResolver;
use crate::core::status::IndicatorPause;
use crate::parameters::{NodeParams, TransportPolicy};
use crate::platform::traits::{ClockSource, NetworkInterface, TimerInterface, TrustLevel};

/// Probe replies are discarded; only the status matters
const PROBE_BODY_LEN: usize = 64;

/// Fatal bootstrap failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootstrapError {
    /// Network unreachable
    ProbeFailed,
    /// Identity endpoint never produced a usable identity
    IdentityFailed,
}

impl BootstrapError {
    /// Health code the node halts with
    pub const fn health(self) -> HealthCode {
        match self {
            BootstrapError::ProbeFailed => HealthCode::ProbeFailed,
            BootstrapError::IdentityFailed => HealthCode::IdentityFailed,
        }
    }
}

impl fmt::Display for BootstrapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootstrapError::ProbeFailed => f.write_str("network unreachable"),
            BootstrapError::IdentityFailed => f.write_str("identity resolution failed"),
        }
    }
}

/// What the diagnostic steps found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapReport {
    pub clock_synced: bool,
    /// `None` when the probe was skipped
    pub unverified_reachable: Option<bool>,
    pub verified_reachable: Option<bool>,
    /// Transport identity resolution used
    pub identity_trust: TrustLevel,
}

/// Successful bootstrap result
#[derive(Debug, Clone)]
pub struct BootstrapOutcome {
    pub credentials: Credentials,
    pub report: BootstrapReport,
}

/// Pick the identity transport from the probe results
///
/// Verified is used unless the clock synced, only the unverified probe
/// answered, and the policy allows falling back.
pub fn choose_trust(
    policy: TransportPolicy,
    unverified_reachable: Option<bool>,
    verified_reachable: Option<bool>,
) -> TrustLevel {
    match (policy, unverified_reachable, verified_reachable) {
        (TransportPolicy::AllowUnverifiedFallback, Some(true), Some(false)) => {
            TrustLevel::Unverified
        }
        _ => TrustLevel::Verified,
    }
}

/// Bootstrap sequence over one parameter set
pub struct BootstrapChain<'p> {
    params: &'p NodeParams,
}

impl<'p> BootstrapChain<'p> {
    pub fn new(params: &'p NodeParams) -> Self {
        Self { params }
    }

    /// Run the chain to completion
    pub fn run<N, C, T, O>(
        &self,
        network: &mut N,
        clock: &mut C,
        pause: &mut IndicatorPause<'_, T, O>,
    ) -> Result<BootstrapOutcome, BootstrapError>
    where
        N: NetworkInterface,
        C: ClockSource,
        T: TimerInterface,
        O: IndicatorOutput,
    {
        let params = self.params;
        pause.set(HealthCode::Probing);
        crate::log_info!(
            "Bootstrap: device={} policy={}",
            params.device_id.as_str(),
            params.transport_policy.as_str()
        );

        // (a)
        if !self.probe_reachability(network, pause) {
            pause.set(HealthCode::ProbeFailed);
            return Err(BootstrapError::ProbeFailed);
        }

        // (b)
        let clock_synced = self.sync_clock(clock, pause);

        // (c), (d)
        let (unverified_reachable, verified_reachable) = if clock_synced {
            let unverified = self.probe_transport(network, TrustLevel::Unverified);
            if unverified {
                pause.set(HealthCode::TransportUnverified);
            }
            let verified = self.probe_transport(network, TrustLevel::Verified);
            if verified {
                pause.set(HealthCode::TransportVerified);
            }
            (Some(unverified), Some(verified))
        } else {
            crate::log_warn!("Clock not synced, skipping transport probes");
            pause.set(HealthCode::ClockSyncFailed);
            (None, None)
        };

        let identity_trust = choose_trust(
            params.transport_policy,
            unverified_reachable,
            verified_reachable,
        );
        if identity_trust == TrustLevel::Unverified {
            crate::log_warn!("Resolving identity WITHOUT certificate verification");
        }

        let resolver = IdentityResolver::new(
            params.identity_endpoint.as_str(),
            params.device_id.as_str(),
            params.identity_retry,
            params.request_timeout_ms,
        );
        match resolver.resolve(network, identity_trust, pause) {
            Ok(credentials) => Ok(BootstrapOutcome {
                credentials,
                report: BootstrapReport {
                    clock_synced,
                    unverified_reachable,
                    verified_reachable,
                    identity_trust,
                },
            }),
            Err(e) => {
                crate::log_error!("Identity resolution exhausted retries: {}", e);
                pause.set(HealthCode::IdentityFailed);
                Err(BootstrapError::IdentityFailed)
            }
        }
    }

    fn probe_reachability<N, T, O>(&self, network: &mut N, pause: &mut IndicatorPause<'_, T, O>) -> bool
    where
        N: NetworkInterface,
        T: TimerInterface,
        O: IndicatorOutput,
    {
        let retry = self.params.probe_retry;
        let url = self.params.probe_url.as_str();
        let mut body = [0u8; PROBE_BODY_LEN];

        let mut attempt: u8 = 1;
        loop {
            match network.http_get(url, TrustLevel::Plain, self.params.request_timeout_ms, &mut body) {
                Ok(response) => {
                    crate::log_info!("Reachability probe: status {}", response.status);
                    return true;
                }
                Err(e) => {
                    crate::log_warn!(
                        "Reachability probe {}/{} failed: {}",
                        attempt,
                        retry.attempts,
                        e
                    );
                }
            }
            if !retry.has_next(attempt) {
                crate::log_error!("Network unreachable");
                return false;
            }
            pause.wait(retry.backoff_ms);
            attempt += 1;
        }
    }

    fn sync_clock<C, T, O>(&self, clock: &mut C, pause: &mut IndicatorPause<'_, T, O>) -> bool
    where
        C: ClockSource,
        T: TimerInterface,
        O: IndicatorOutput,
    {
        if let Err(e) = clock.start_sync() {
            crate::log_warn!("Clock sync start failed: {}", e);
            return false;
        }
        // Read once up front and once after every wait
        let mut polls: u8 = 0;
        while !clock.is_synced() {
            if polls >= self.params.clock_sync_attempts {
                crate::log_warn!("Clock not synced after {} polls", polls);
                return false;
            }
            pause.wait(self.params.clock_sync_poll_ms);
            polls += 1;
        }
        crate::log_info!("Clock synced: epoch={}", clock.epoch_seconds());
        true
    }

    fn probe_transport<N: NetworkInterface>(&self, network: &mut N, trust: TrustLevel) -> bool {
        let mut body = [0u8; PROBE_BODY_LEN];
        match network.http_get(
            self.params.identity_endpoint.as_str(),
            trust,
            self.params.request_timeout_ms,
            &mut body,
        ) {
            Ok(response) => {
                crate::log_info!(
                    "{} transport reachable: status {}",
                    trust.as_str(),
                    response.status
                );
                true
            }
            Err(e) => {
                crate::log_warn!("{} transport unreachable: {}", trust.as_str(), e);
                false
            }
        }
    }
}
