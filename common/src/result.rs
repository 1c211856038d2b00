//! # Probe Results
//!
//! One record per input target, in input order. Check fields are `None`
//! exactly when the check was not requested (or never got to run because the
//! target was invalid or the batch was cancelled). A requested and attempted
//! check is always `Some(true)` or `Some(false)`.
//!
//! An ICMP `Some(false)` means no echo reply arrived in time. It does **not**
//! prove the host is down: many networks drop ICMP silently.

use std::net::IpAddr;

use serde::Serialize;

use crate::checks::WinRmTransport;

/// Diagnostic note texts, shared by every check implementation.
pub mod notes {
    use std::fmt::Display;

    pub const INVALID_TARGET: &str = "invalid target";
    pub const CANCELLED: &str = "cancelled";
    pub const ICMP_NO_REPLY: &str = "ICMP no reply";
    pub const TCP_TIMED_OUT: &str = "TCP connect timed out";

    pub fn dns_failed(cause: impl Display) -> String {
        format!("DNS resolution failed: {cause}")
    }

    pub fn icmp_failed(cause: impl Display) -> String {
        format!("ICMP check failed: {cause}")
    }

    pub fn tcp_failed(cause: impl Display) -> String {
        format!("TCP connect failed: {cause}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResult {
    pub target: String,
    pub dns_resolved: Option<bool>,
    pub dns_addresses: Vec<IpAddr>,
    pub icmp_reachable: Option<bool>,
    pub tcp_port: Option<u16>,
    pub tcp_port_open: Option<bool>,
    /// One entry per failed sub-check, in the order the checks ran.
    pub notes: Vec<String>,
}

impl ProbeResult {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            dns_resolved: None,
            dns_addresses: Vec::new(),
            icmp_reachable: None,
            tcp_port: None,
            tcp_port_open: None,
            notes: Vec::new(),
        }
    }

    pub fn invalid(target: impl Into<String>) -> Self {
        let mut result = Self::new(target);
        result.note(notes::INVALID_TARGET);
        result
    }

    pub fn cancelled(target: impl Into<String>) -> Self {
        let mut result = Self::new(target);
        result.note(notes::CANCELLED);
        result
    }

    pub fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    pub fn is_invalid(&self) -> bool {
        self.notes.iter().any(|note| note == notes::INVALID_TARGET)
    }

    pub fn is_cancelled(&self) -> bool {
        self.notes.iter().any(|note| note == notes::CANCELLED)
    }
}

/// Outcome of the WinRM readiness check for one target.
///
/// `protocol_ok` is the only signal a caller should gate remote work on. The
/// embedded TCP fields are a diagnostic: a listener port can be open while the
/// service is broken, or filtered while the service is fine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WinRmResult {
    #[serde(flatten)]
    pub probe: ProbeResult,
    pub transport: WinRmTransport,
    pub port: u16,
    pub protocol_ok: bool,
    pub protocol_error: Option<String>,
    pub protocol_version: Option<String>,
    pub product_vendor: Option<String>,
    pub product_version: Option<String>,
}

impl WinRmResult {
    pub fn new(target: impl Into<String>, transport: WinRmTransport, port: u16) -> Self {
        Self::from_probe(ProbeResult::new(target), transport, port)
    }

    pub fn from_probe(probe: ProbeResult, transport: WinRmTransport, port: u16) -> Self {
        Self {
            probe,
            transport,
            port,
            protocol_ok: false,
            protocol_error: None,
            protocol_version: None,
            product_vendor: None,
            product_version: None,
        }
    }

    pub fn target(&self) -> &str {
        &self.probe.target
    }

    pub fn is_ready(&self) -> bool {
        self.protocol_ok
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
