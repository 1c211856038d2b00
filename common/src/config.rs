use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::checks::{BatchOptions, CheckSpec, WinRmSpec, WinRmTransport};
use crate::error::ConfigError;

pub struct Config {
    /// Reduces terminal output.
    ///
    /// `1` hides headers, `2` hides per-target details and keeps the summary.
    pub quiet: u8,
    /// Prints results as JSON on stdout instead of the terminal tree.
    pub json: bool,
}

/// Defaults read from a TOML file; every key is optional.
///
/// ```toml
/// [probe]
/// dns = true
/// port = 22
/// timeout_ms = 1500
///
/// [winrm]
/// https = true
/// accept_invalid_certs = true
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub probe: ProbeDefaults,
    pub winrm: WinRmDefaults,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeDefaults {
    pub dns: Option<bool>,
    pub icmp: Option<bool>,
    pub port: Option<u16>,
    pub timeout_ms: Option<u64>,
    pub concurrency: Option<usize>,
    pub deadline_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WinRmDefaults {
    pub https: Option<bool>,
    pub port: Option<u16>,
    pub tcp_check: Option<bool>,
    pub accept_invalid_certs: Option<bool>,
    pub timeout_ms: Option<u64>,
    pub concurrency: Option<usize>,
    pub deadline_ms: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content, path)?;
        debug!("Loaded defaults from {}", path.display());
        Ok(config)
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl ProbeDefaults {
    pub fn check_spec(&self) -> CheckSpec {
        let base = CheckSpec::default();
        CheckSpec {
            dns: self.dns.unwrap_or(base.dns),
            icmp: self.icmp.unwrap_or(base.icmp),
            tcp_port: self.port.or(base.tcp_port),
            timeout: self.timeout_ms.map(Duration::from_millis).unwrap_or(base.timeout),
        }
    }

    pub fn batch_options(&self) -> BatchOptions {
        batch_options(self.concurrency, self.deadline_ms)
    }
}

impl WinRmDefaults {
    pub fn winrm_spec(&self) -> WinRmSpec {
        let base = WinRmSpec::default();
        let transport = match self.https {
            Some(true) => WinRmTransport::Https,
            _ => WinRmTransport::Http,
        };
        WinRmSpec {
            transport,
            port: self.port,
            tcp_check: self.tcp_check.unwrap_or(base.tcp_check),
            timeout: self.timeout_ms.map(Duration::from_millis).unwrap_or(base.timeout),
            accept_invalid_certs: self.accept_invalid_certs.unwrap_or(base.accept_invalid_certs),
        }
    }

    pub fn batch_options(&self) -> BatchOptions {
        batch_options(self.concurrency, self.deadline_ms)
    }
}

fn batch_options(concurrency: Option<usize>, deadline_ms: Option<u64>) -> BatchOptions {
    let base = BatchOptions::default();
    BatchOptions {
        concurrency: concurrency.unwrap_or(base.concurrency),
        deadline: deadline_ms.map(Duration::from_millis),
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

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<FileConfig, ConfigError> {
        FileConfig::parse(content, Path::new("reachr.toml"))
    }

    #[test]
    fn empty_file_yields_builtin_defaults() {
        let cfg = parse("").unwrap();
        assert_eq!(cfg.probe.check_spec(), CheckSpec::default());
        assert_eq!(cfg.probe.batch_options(), BatchOptions::default());
        assert_eq!(cfg.winrm.winrm_spec(), WinRmSpec::default());
    }

    #[test]
    fn file_values_override_defaults() {
        let cfg = parse(
            r#"
            [probe]
            dns = true
            port = 22
            timeout_ms = 1500
            concurrency = 8
            deadline_ms = 10000

            [winrm]
            https = true
            tcp_check = false
            accept_invalid_certs = true
            "#,
        )
        .unwrap();

        let spec = cfg.probe.check_spec();
        assert!(spec.dns);
        assert!(!spec.icmp);
        assert_eq!(spec.tcp_port, Some(22));
        assert_eq!(spec.timeout, Duration::from_millis(1500));

        let opts = cfg.probe.batch_options();
        assert_eq!(opts.concurrency, 8);
        assert_eq!(opts.deadline, Some(Duration::from_secs(10)));

        let winrm = cfg.winrm.winrm_spec();
        assert_eq!(winrm.transport, WinRmTransport::Https);
        assert_eq!(winrm.port(), 5986);
        assert!(!winrm.tcp_check);
        assert!(winrm.accept_invalid_certs);
    }

    #[test]
    fn unknown_keys_and_out_of_range_ports_are_rejected() {
        assert!(matches!(parse("[probe]\nping = true"), Err(ConfigError::Parse { .. })));
        assert!(matches!(parse("[probe]\nport = 70000"), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = FileConfig::load(Path::new("/nonexistent/reachr.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
