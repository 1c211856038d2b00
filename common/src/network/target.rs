//! # Probe Target Model
//!
//! A target is whatever the caller handed in: a hostname, an FQDN or an IP
//! literal. It is kept verbatim so results can be matched back to their input,
//! and only trimmed when a check needs the host part.
//!
//! Targets can be collected from:
//! * Single arguments (e.g., `dc01.corp.local`).
//! * Comma-separated lists (e.g., `10.0.0.5, web01, [fe80::1]`).
//! * Line-oriented files, with blank lines and `#` comments skipped.

use std::fmt;
use std::net::{IpAddr, Ipv6Addr};

/// A single host to probe. Duplicates are legal and probed independently.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    raw: String,
}

impl Target {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The target exactly as it was supplied.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn into_raw(self) -> String {
        self.raw
    }

    /// The host to contact, or `None` when the target is empty or whitespace.
    ///
    /// Bracketed IPv6 literals (`[::1]`) are unwrapped.
    pub fn host(&self) -> Option<&str> {
        let trimmed: &str = self.raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        let unbracketed = trimmed
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .filter(|inner| inner.parse::<Ipv6Addr>().is_ok());

        Some(unbracketed.unwrap_or(trimmed))
    }

    /// The target as an address, when it is an IP literal.
    pub fn ip(&self) -> Option<IpAddr> {
        self.host()?.parse().ok()
    }
}

impl From<String> for Target {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&str> for Target {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Parses a comma-separated list of targets (e.g. "10.0.0.5, web01,dc01").
///
/// Empty segments are skipped, so `"a,,b"` yields two targets.
pub fn parse_commas(s: &str) -> Vec<Target> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(Target::from)
        .collect()
}

/// Parses a target file: one entry per line, commas allowed, `#` starts a comment.
pub fn parse_lines(content: &str) -> Vec<Target> {
    content
        .lines()
        .map(|line| line.split_once('#').map_or(line, |(before, _)| before))
        .flat_map(parse_commas)
        .collect()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn host_is_trimmed_and_empty_targets_are_invalid() {
        assert_eq!(Target::from("  web01 ").host(), Some("web01"));
        assert_eq!(Target::from("  web01 ").as_str(), "  web01 ");

        assert_eq!(Target::from("").host(), None);
        assert_eq!(Target::from(" \t\n").host(), None);
        assert_eq!(Target::from("x").host(), Some("x"));
    }

    #[test]
    fn ip_literals_are_recognised() {
        assert_eq!(
            Target::from("10.0.0.5").ip(),
            Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)))
        );
        assert_eq!(Target::from("[::1]").host(), Some("::1"));
        assert_eq!(Target::from("[::1]").ip(), Some(IpAddr::V6(Ipv6Addr::LOCALHOST)));
        assert_eq!(Target::from("dc01.corp.local").ip(), None);
        // Not an IPv6 literal, so the brackets stay.
        assert_eq!(Target::from("[web01]").host(), Some("[web01]"));
    }

    #[test]
    fn comma_lists_skip_empty_segments() {
        let targets = parse_commas("10.0.0.5, web01,,dc01 ,");
        let hosts: Vec<&str> = targets.iter().map(Target::as_str).collect();
        assert_eq!(hosts, vec!["10.0.0.5", "web01", "dc01"]);
    }

    #[test]
    fn target_files_skip_blank_lines_and_comments() {
        let content = "# lab hosts\nweb01\n\n  dc01, dc02 # domain controllers\n10.0.0.5\n";
        let targets = parse_lines(content);
        let hosts: Vec<&str> = targets.iter().map(Target::as_str).collect();
        assert_eq!(hosts, vec!["web01", "dc01", "dc02", "10.0.0.5"]);
    }

    #[test]
    fn duplicates_are_kept() {
        let targets = parse_commas("web01,web01");
        assert_eq!(targets.len(), 2);
    }
}
