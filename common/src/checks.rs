//! # Check Specifications
//!
//! What a batch call should do to every target. A spec is fixed for the
//! whole batch and validated once, before any target is touched.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SpecError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);
pub const DEFAULT_CONCURRENCY: usize = 64;
/// Upper bound a tokio semaphore accepts for its permit count.
pub const MAX_CONCURRENCY: usize = usize::MAX >> 3;

pub const WINRM_HTTP_PORT: u16 = 5985;
pub const WINRM_HTTPS_PORT: u16 = 5986;

/// The reachability checks to run against every target of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckSpec {
    /// Resolve the target through the system resolver.
    pub dns: bool,
    /// Send a single ICMP echo request.
    pub icmp: bool,
    /// Attempt a TCP connection to this port.
    pub tcp_port: Option<u16>,
    /// Upper bound for each individual check.
    pub timeout: Duration,
}

impl Default for CheckSpec {
    fn default() -> Self {
        Self {
            dns: false,
            icmp: false,
            tcp_port: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl CheckSpec {
    pub fn with_dns(mut self) -> Self {
        self.dns = true;
        self
    }

    pub fn with_icmp(mut self) -> Self {
        self.icmp = true;
        self
    }

    pub fn with_tcp_port(mut self, port: u16) -> Self {
        self.tcp_port = Some(port);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// True when no check at all is requested.
    pub fn is_empty(&self) -> bool {
        !self.dns && !self.icmp && self.tcp_port.is_none()
    }

    pub fn validate(&self) -> Result<(), SpecError> {
        validate_port(self.tcp_port)?;
        validate_timeout(self.timeout)
    }
}

/// Transport of a WinRM listener.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WinRmTransport {
    #[default]
    Http,
    Https,
}

impl WinRmTransport {
    pub fn default_port(self) -> u16 {
        match self {
            WinRmTransport::Http => WINRM_HTTP_PORT,
            WinRmTransport::Https => WINRM_HTTPS_PORT,
        }
    }

    pub fn scheme(self) -> &'static str {
        match self {
            WinRmTransport::Http => "http",
            WinRmTransport::Https => "https",
        }
    }
}

impl fmt::Display for WinRmTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scheme())
    }
}

/// Settings for the WinRM readiness check.
///
/// The WS-Management handshake is the authoritative signal. The TCP check on
/// the listener port is a secondary diagnostic and can be switched off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinRmSpec {
    pub transport: WinRmTransport,
    /// Overrides the transport's well-known port.
    pub port: Option<u16>,
    pub tcp_check: bool,
    pub timeout: Duration,
    /// Skip certificate validation on HTTPS listeners (self-signed lab hosts).
    pub accept_invalid_certs: bool,
}

impl Default for WinRmSpec {
    fn default() -> Self {
        Self {
            transport: WinRmTransport::Http,
            port: None,
            tcp_check: true,
            timeout: DEFAULT_TIMEOUT,
            accept_invalid_certs: false,
        }
    }
}

impl WinRmSpec {
    pub fn https() -> Self {
        Self {
            transport: WinRmTransport::Https,
            ..Self::default()
        }
    }

    /// The port the handshake and the TCP check are aimed at.
    pub fn port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.transport.default_port())
    }

    pub fn validate(&self) -> Result<(), SpecError> {
        validate_port(self.port)?;
        validate_timeout(self.timeout)
    }
}

/// How a batch is scheduled, independent of what is checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    /// Maximum number of targets probed at the same time.
    pub concurrency: usize,
    /// Overall deadline after which unfinished targets are cancelled.
    pub deadline: Option<Duration>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            deadline: None,
        }
    }
}

impl BatchOptions {
    pub fn validate(&self) -> Result<(), SpecError> {
        match self.concurrency {
            0 => Err(SpecError::ZeroConcurrency),
            n if n > MAX_CONCURRENCY => Err(SpecError::ConcurrencyTooHigh(n)),
            _ => Ok(()),
        }
    }
}

fn validate_port(port: Option<u16>) -> Result<(), SpecError> {
    match port {
        Some(0) => Err(SpecError::PortOutOfRange(0)),
        _ => Ok(()),
    }
}

fn validate_timeout(timeout: Duration) -> Result<(), SpecError> {
    if timeout.is_zero() {
        return Err(SpecError::ZeroTimeout);
    }
    Ok(())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
