pub mod probe;
pub mod winrm;

use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, ensure};
use clap::{ArgAction, Args, Parser, Subcommand};
use reachr_common::network::target::{self, Target};
use tokio_util::sync::CancellationToken;
use tracing::warn;

#[derive(Parser)]
#[command(name = "reachr")]
#[command(version, about = "Batch reachability checks for fleets of hosts.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Less output (-q hides headers, -qq hides per-target details)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub quiet: u8,

    /// TOML file with default settings
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run DNS, ICMP and TCP checks against every target
    #[command(alias = "p")]
    Probe(ProbeArgs),
    /// Check whether WinRM answers on every target
    #[command(alias = "w")]
    Winrm(WinRmArgs),
}

#[derive(Args)]
pub struct ProbeArgs {
    #[command(flatten)]
    pub targets: TargetArgs,

    /// Resolve every target
    #[arg(long)]
    pub dns: bool,

    /// Send one ICMP echo to every target (needs root)
    #[arg(long)]
    pub icmp: bool,

    /// Try a TCP connection to this port
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Args)]
pub struct WinRmArgs {
    #[command(flatten)]
    pub targets: TargetArgs,

    /// Talk to the HTTPS listener (5986) instead of HTTP (5985)
    #[arg(long)]
    pub https: bool,

    /// Listener port, when not the default for the transport
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// Skip the TCP connect to the listener port
    #[arg(long)]
    pub no_port_check: bool,

    /// Accept invalid TLS certificates on HTTPS listeners
    #[arg(long)]
    pub insecure: bool,

    /// Print only the targets that are ready, one per line
    #[arg(long, conflicts_with = "json")]
    pub ready_only: bool,

    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Args)]
pub struct TargetArgs {
    /// Hosts to check, comma lists allowed; '-' reads them from stdin
    pub targets: Vec<String>,

    /// Read targets from a file, one per line
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,
}

#[derive(Args)]
pub struct RunArgs {
    /// Timeout for each check (e.g. 500ms, 3s)
    #[arg(short, long, value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Targets checked at the same time
    #[arg(short, long, value_parser = clap::value_parser!(usize))]
    pub concurrency: Option<usize>,

    /// Give up on unfinished targets after this long
    #[arg(long, value_parser = parse_duration)]
    pub deadline: Option<Duration>,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl TargetArgs {
    /// Gathers targets from the arguments, `--file` and stdin, in that order.
    pub fn collect(&self) -> anyhow::Result<Vec<String>> {
        let mut targets: Vec<Target> = Vec::new();

        if self.targets.len() == 1 && self.targets[0] == "-" {
            let mut content = String::new();
            io::stdin()
                .read_to_string(&mut content)
                .context("reading targets from stdin")?;
            targets.extend(target::parse_lines(&content));
        } else {
            for arg in &self.targets {
                targets.extend(target::parse_commas(arg));
            }
        }

        if let Some(path) = &self.file {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading targets from {}", path.display()))?;
            targets.extend(target::parse_lines(&content));
        }

        ensure!(
            !targets.is_empty(),
            "no targets given: pass them as arguments, with --file, or on stdin with '-'"
        );
        Ok(targets.into_iter().map(Target::into_raw).collect())
    }
}

/// Parses `500ms`, `3s`, `2m` or a bare number of seconds.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s: &str = s.trim();
    let split: usize = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (digits, unit) = s.split_at(split);

    let value: u64 = digits
        .parse()
        .map_err(|_| format!("'{s}' is not a duration (try 500ms, 3s or 2m)"))?;

    let duration: Duration = match unit.trim() {
        "ms" => Duration::from_millis(value),
        "" | "s" => Duration::from_secs(value),
        "m" => value
            .checked_mul(60)
            .map(Duration::from_secs)
            .ok_or_else(|| format!("'{s}' is too long"))?,
        other => return Err(format!("unknown unit '{other}' in '{s}' (use ms, s or m)")),
    };

    if duration.is_zero() {
        return Err("duration must be greater than zero".to_string());
    }
    Ok(duration)
}

/// A token that fires on Ctrl+C. A second Ctrl+C is left to the default handler.
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, wrapping up with partial results");
            trigger.cancel();
        }
    });

    token
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
    use clap::CommandFactory;
    use std::io::Write;

    #[test]
    fn command_line_is_well_formed() {
        CommandLine::command().debug_assert();
    }

    #[test]
    fn durations_with_units() {
        assert_eq!(parse_duration("500ms"), Ok(Duration::from_millis(500)));
        assert_eq!(parse_duration("3s"), Ok(Duration::from_secs(3)));
        assert_eq!(parse_duration("2m"), Ok(Duration::from_secs(120)));
        assert_eq!(parse_duration("5"), Ok(Duration::from_secs(5)));
        assert_eq!(parse_duration(" 10 s "), Ok(Duration::from_secs(10)));
    }

    #[test]
    fn bad_durations_are_rejected() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("0").is_err());
        assert!(parse_duration("0ms").is_err());
        assert!(parse_duration("3h").is_err());
        assert!(parse_duration("ms").is_err());
        assert!(parse_duration("-1s").is_err());
    }

    #[test]
    fn probe_flags_parse() {
        let cli = CommandLine::try_parse_from([
            "reachr", "-v", "probe", "web01,dc01", "10.0.0.5", "--dns", "-p", "5985", "-t",
            "1s", "-c", "8", "--deadline", "30s",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 1);
        let Commands::Probe(args) = cli.command else {
            panic!("expected probe");
        };
        assert!(args.dns);
        assert!(!args.icmp);
        assert_eq!(args.port, Some(5985));
        assert_eq!(args.run.timeout, Some(Duration::from_secs(1)));
        assert_eq!(args.run.concurrency, Some(8));
        assert_eq!(args.run.deadline, Some(Duration::from_secs(30)));
        assert_eq!(
            args.targets.collect().unwrap(),
            vec!["web01", "dc01", "10.0.0.5"]
        );
    }

    #[test]
    fn port_zero_is_refused_by_the_parser() {
        assert!(CommandLine::try_parse_from(["reachr", "probe", "web01", "-p", "0"]).is_err());
    }

    #[test]
    fn ready_only_and_json_are_exclusive() {
        let parsed =
            CommandLine::try_parse_from(["reachr", "winrm", "dc01", "--ready-only", "--json"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn missing_targets_are_an_error() {
        let args = TargetArgs {
            targets: vec![" , ".to_string()],
            file: None,
        };
        assert!(args.collect().is_err());
    }

    #[test]
    fn targets_file_is_appended() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"# lab\ndc01\n\nweb01, web02 # dmz\n").unwrap();

        let args = TargetArgs {
            targets: vec!["10.0.0.5".to_string()],
            file: Some(file.path().to_path_buf()),
        };
        let targets = args.collect().unwrap();

        assert_eq!(targets, vec!["10.0.0.5", "dc01", "web01", "web02"]);
    }

    #[test]
    fn unreadable_targets_file_names_the_path() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();
        drop(file);

        let args = TargetArgs {
            targets: vec!["dc01".to_string()],
            file: Some(path.clone()),
        };
        let err = args.collect().unwrap_err();
        assert!(err.to_string().contains(&path.display().to_string()), "{err}");
    }
}
