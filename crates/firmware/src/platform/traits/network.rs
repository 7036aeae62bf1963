//! Network transport interface
//!
//! Blocking HTTP GET over the wireless link. Every request carries an
//! explicit timeout; nothing in the node cancels a request in flight.

use crate::platform::Result;

/// Transport security for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TrustLevel {
    /// Plain HTTP
    Plain,
    /// TLS without certificate verification
    Unverified,
    /// TLS with full certificate chain verification
    Verified,
}

impl TrustLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            TrustLevel::Plain => "plain",
            TrustLevel::Unverified => "unverified",
            TrustLevel::Verified => "verified",
        }
    }
}

/// Response metadata; the body is written into the caller's buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Bytes of body written to the buffer
    pub body_len: usize,
    /// Body did not fit and was cut at the buffer size
    pub truncated: bool,
}

impl HttpResponse {
    pub const fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Network interface trait
pub trait NetworkInterface {
    /// Wireless link association state
    fn link_up(&self) -> bool;

    /// Ask the link layer to re-associate; returns without waiting
    fn rejoin(&mut self) -> Result<()>;

    /// Issue a GET and copy the body into `body`
    ///
    /// Any HTTP status is a successful transport-level exchange.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Network` when no HTTP response was received
    /// (DNS, connect, TLS or timeout failures).
    fn http_get(
        &mut self,
        url: &str,
        trust: TrustLevel,
        timeout_ms: u32,
        body: &mut [u8],
    ) -> Result<HttpResponse>;
}
