//! Mock network transport for testing
//!
//! Responses are scripted per route (trust level plus URL prefix). Queued
//! responses are used once each in order; after that the route's standing
//! response applies. Requests matching no route fail to connect.

use std::collections::VecDeque;
use std::string::{String, ToString};
use std::vec::Vec;

use crate::platform::{
    error::{NetworkError, PlatformError},
    traits::{HttpResponse, NetworkInterface, TrustLevel},
    Result,
};

/// Scripted result of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockResponse {
    /// HTTP exchange completed with this status and body
    Http(u16, Vec<u8>),
    /// Transport-level failure
    Fail(NetworkError),
}

impl MockResponse {
    /// 200 with `body`
    pub fn ok(body: &str) -> Self {
        MockResponse::Http(200, body.as_bytes().to_vec())
    }

    pub fn status(status: u16) -> Self {
        MockResponse::Http(status, Vec::new())
    }

    pub fn fail(error: NetworkError) -> Self {
        MockResponse::Fail(error)
    }
}

#[derive(Debug)]
struct Route {
    trust: TrustLevel,
    prefix: String,
    queued: VecDeque<MockResponse>,
    standing: Option<MockResponse>,
}

/// Mock network interface
#[derive(Debug)]
pub struct MockNetwork {
    routes: Vec<Route>,
    calls: Vec<(String, TrustLevel)>,
    link_up: bool,
    rejoins: u32,
}

impl Default for MockNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl MockNetwork {
    /// Link up, no routes
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            calls: Vec::new(),
            link_up: true,
            rejoins: 0,
        }
    }

    fn route_mut(&mut self, trust: TrustLevel, prefix: &str) -> &mut Route {
        let index = match self
            .routes
            .iter()
            .position(|r| r.trust == trust && r.prefix == prefix)
        {
            Some(i) => i,
            None => {
                self.routes.push(Route {
                    trust,
                    prefix: prefix.to_string(),
                    queued: VecDeque::new(),
                    standing: None,
                });
                self.routes.len() - 1
            }
        };
        &mut self.routes[index]
    }

    /// Queue a one-shot response
    pub fn queue(&mut self, trust: TrustLevel, prefix: &str, response: MockResponse) -> &mut Self {
        self.route_mut(trust, prefix).queued.push_back(response);
        self
    }

    /// Set the response used once the queue is empty
    pub fn always(&mut self, trust: TrustLevel, prefix: &str, response: MockResponse) -> &mut Self {
        self.route_mut(trust, prefix).standing = Some(response);
        self
    }

    pub fn set_link_up(&mut self, up: bool) {
        self.link_up = up;
    }

    /// Every request issued, in order
    pub fn calls(&self) -> &[(String, TrustLevel)] {
        &self.calls
    }

    /// Requests whose URL starts with `prefix`
    pub fn calls_to(&self, prefix: &str) -> usize {
        self.calls.iter().filter(|(url, _)| url.starts_with(prefix)).count()
    }

    pub fn rejoins(&self) -> u32 {
        self.rejoins
    }
}

impl NetworkInterface for MockNetwork {
    fn link_up(&self) -> bool {
        self.link_up
    }

    fn rejoin(&mut self) -> Result<()> {
        self.rejoins += 1;
        Ok(())
    }

    fn http_get(
        &mut self,
        url: &str,
        trust: TrustLevel,
        _timeout_ms: u32,
        body: &mut [u8],
    ) -> Result<HttpResponse> {
        self.calls.push((url.to_string(), trust));

        if !self.link_up {
            return Err(PlatformError::Network(NetworkError::LinkDown));
        }

        let response = self
            .routes
            .iter_mut()
            .find(|r| r.trust == trust && url.starts_with(r.prefix.as_str()))
            .and_then(|r| r.queued.pop_front().or_else(|| r.standing.clone()))
            .unwrap_or(MockResponse::Fail(NetworkError::ConnectFailed));

        match response {
            MockResponse::Fail(e) => Err(PlatformError::Network(e)),
            MockResponse::Http(status, data) => {
                let len = data.len().min(body.len());
                body[..len].copy_from_slice(&data[..len]);
                Ok(HttpResponse {
                    status,
                    body_len: len,
                    truncated: len < data.len(),
                })
            }
        }
    }
}
