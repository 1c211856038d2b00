//! The network primitives every probe is built from.
//!
//! Each primitive sits behind a trait so the batch logic can be exercised
//! without touching the network. The system implementations live in
//! [`crate::network`]; [`Checks::system`] wires them together.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reachr_common::checks::WinRmTransport;
use reachr_protocols::wsman::IdentifyResponse;

use crate::network::{dns::SystemResolver, icmp::RawSocketPinger, tcp::TokioConnector, wsman::WsmanHandshake};

/// Result of a single ICMP echo attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EchoOutcome {
    Reply { rtt: Duration },
    /// Nothing came back in time. The host may still be up behind a filter.
    NoReply,
    /// The echo could not be attempted at all (e.g. raw sockets not permitted).
    Failed(String),
}

/// Result of a single TCP connection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TcpOutcome {
    Open,
    /// No answer (not even a RST) before the timeout.
    TimedOut,
    /// Refused, unreachable, or the name did not resolve.
    Failed(String),
}

/// Where a WS-Management handshake is aimed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WsmanEndpoint {
    pub host: String,
    pub port: u16,
    pub transport: WinRmTransport,
    pub accept_invalid_certs: bool,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Resolves `host` to its addresses, in the order the resolver returned them.
    async fn resolve(&self, host: &str) -> anyhow::Result<Vec<IpAddr>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Pinger: Send + Sync {
    /// Sends one echo request and waits at most `timeout` for the reply.
    async fn echo(&self, addr: IpAddr, timeout: Duration) -> EchoOutcome;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Connector: Send + Sync {
    /// Attempts a TCP connection and releases it again, whatever the outcome.
    async fn connect(&self, host: &str, port: u16, timeout: Duration) -> TcpOutcome;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Handshake: Send + Sync {
    /// Performs an anonymous WS-Management `Identify` against `endpoint`.
    async fn identify(
        &self,
        endpoint: &WsmanEndpoint,
        timeout: Duration,
    ) -> anyhow::Result<IdentifyResponse>;
}

/// The set of primitives a [`crate::prober::Prober`] works with.
#[derive(Clone)]
pub struct Checks {
    pub resolver: Arc<dyn Resolver>,
    pub pinger: Arc<dyn Pinger>,
    pub connector: Arc<dyn Connector>,
    pub handshake: Arc<dyn Handshake>,
}

impl Checks {
    /// The real thing: system resolver, raw ICMP sockets, tokio TCP and HTTP(S).
    pub fn system() -> Self {
        Self {
            resolver: Arc::new(SystemResolver),
            pinger: Arc::new(RawSocketPinger),
            connector: Arc::new(TokioConnector),
            handshake: Arc::new(WsmanHandshake),
        }
    }

    pub fn with_handshake(mut self, handshake: impl Handshake + 'static) -> Self {
        self.handshake = Arc::new(handshake);
        self
    }
}

impl Default for Checks {
    fn default() -> Self {
        Self::system()
    }
}
