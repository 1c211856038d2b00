//! Turns results into the key/value details of a terminal tree.

use std::net::IpAddr;

use colored::*;
use reachr_common::result::{ProbeResult, WinRmResult};

use crate::terminal::colors;

pub type Detail = (String, ColoredString);

fn verdict(value: Option<bool>, yes: &str, no: &str) -> Option<ColoredString> {
    value.map(|ok| match ok {
        true => yes.color(colors::GOOD).bold(),
        false => no.color(colors::BAD).bold(),
    })
}

fn addresses(addrs: &[IpAddr]) -> ColoredString {
    let joined: Vec<String> = addrs
        .iter()
        .map(|addr| match addr {
            IpAddr::V4(v4) => v4.to_string().color(colors::IPV4_ADDR).to_string(),
            IpAddr::V6(v6) => v6.to_string().color(colors::IPV6_ADDR).to_string(),
        })
        .collect();
    joined.join(", ").normal()
}

/// Details shared by both commands: whatever the checks actually produced.
pub fn probe_details(result: &ProbeResult) -> Vec<Detail> {
    let mut details: Vec<Detail> = Vec::new();

    if let Some(resolved) = result.dns_resolved {
        let value = match resolved {
            true => addresses(&result.dns_addresses),
            false => "unresolved".color(colors::BAD).bold(),
        };
        details.push(("DNS".to_string(), value));
    }

    if let Some(value) = verdict(result.icmp_reachable, "reply", "no reply") {
        details.push(("ICMP".to_string(), value));
    }

    if let (Some(port), Some(value)) = (
        result.tcp_port,
        verdict(result.tcp_port_open, "open", "closed"),
    ) {
        details.push((format!("TCP/{port}"), value));
    }

    for note in &result.notes {
        details.push(("Note".to_string(), note.color(colors::NOTE).italic()));
    }

    details
}

pub fn winrm_details(result: &WinRmResult) -> Vec<Detail> {
    let status: ColoredString = match result.protocol_ok {
        true => "ready".color(colors::GOOD).bold(),
        false => "not ready".color(colors::BAD).bold(),
    };
    let mut details: Vec<Detail> = vec![(
        "WinRM".to_string(),
        format!("{status} ({}:{})", result.transport, result.port).normal(),
    )];

    if let Some(vendor) = &result.product_vendor {
        details.push(("Vendor".to_string(), vendor.normal()));
    }
    if let Some(version) = &result.product_version {
        details.push(("Version".to_string(), version.normal()));
    }
    if let Some(error) = &result.protocol_error {
        details.push(("Error".to_string(), error.color(colors::UNKNOWN)));
    }

    details.extend(probe_details(&result.probe));
    details
}

/// A result with no failure notes: every requested check came back positive.
pub fn is_clean(result: &ProbeResult) -> bool {
    result.notes.is_empty()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
