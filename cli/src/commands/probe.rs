use std::time::{Duration, Instant};

use colored::*;
use reachr_common::checks::{BatchOptions, CheckSpec};
use reachr_common::config::{Config, ProbeDefaults};
use reachr_common::result::ProbeResult;
use reachr_core::Prober;
use tracing::{info, warn};

use crate::commands::{ProbeArgs, RunArgs, cancel_on_ctrl_c};
use crate::rprint;
use crate::terminal::{colors, format, print, spinner};

pub async fn probe(args: ProbeArgs, defaults: &ProbeDefaults, cfg: &Config) -> anyhow::Result<()> {
    let targets: Vec<String> = args.targets.collect()?;
    let spec: CheckSpec = check_spec(&args, defaults);
    let opts: BatchOptions = batch_options(&args.run, defaults.batch_options());

    if spec.is_empty() {
        warn!("No check requested; pass --dns, --icmp or --port");
    }
    if spec.icmp && !is_root::is_root() {
        warn!("ICMP needs raw sockets; without root every echo will fail");
    }

    print::header("probing targets", cfg.quiet);
    info!("Checking {} target(s)", targets.len());

    let total: usize = targets.len();
    let prober = Prober::system().with_progress(move |finished| spinner::report_progress(finished, total));
    let cancel = cancel_on_ctrl_c();

    let start_time: Instant = Instant::now();
    let results: Vec<ProbeResult> = prober.probe(targets, &spec, &opts, &cancel).await?;
    spinner::finish();

    if cfg.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    print_results(&results, cfg);
    print_summary(&results, start_time.elapsed(), cfg);
    Ok(())
}

/// Flags win over the config file, the file wins over built-in defaults.
fn check_spec(args: &ProbeArgs, defaults: &ProbeDefaults) -> CheckSpec {
    let mut spec: CheckSpec = defaults.check_spec();
    spec.dns |= args.dns;
    spec.icmp |= args.icmp;
    if args.port.is_some() {
        spec.tcp_port = args.port;
    }
    if let Some(timeout) = args.run.timeout {
        spec.timeout = timeout;
    }
    spec
}

pub(crate) fn batch_options(run: &RunArgs, mut opts: BatchOptions) -> BatchOptions {
    if let Some(concurrency) = run.concurrency {
        opts.concurrency = concurrency;
    }
    if run.deadline.is_some() {
        opts.deadline = run.deadline;
    }
    opts
}

fn print_results(results: &[ProbeResult], cfg: &Config) {
    if results.is_empty() {
        print::nothing_to_show("No results");
        return;
    }

    print::header("probe results", cfg.quiet);
    if cfg.quiet >= 2 {
        return;
    }

    for (idx, result) in results.iter().enumerate() {
        print::tree_head(idx, display_name(&result.target));
        print::as_tree_one_level(format::probe_details(result));
        if idx + 1 != results.len() {
            rprint!();
        }
    }
}

pub(crate) fn display_name(target: &str) -> &str {
    match target.trim() {
        "" => "<empty>",
        trimmed => trimmed,
    }
}

fn print_summary(results: &[ProbeResult], total_time: Duration, cfg: &Config) {
    let clean: usize = results.iter().filter(|r| format::is_clean(r)).count();
    let cancelled: usize = results.iter().filter(|r| r.is_cancelled()).count();

    let clean: ColoredString = format!("{clean}/{} passed every check", results.len()).bold().green();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let mut output: String = format!("Probe complete: {clean} in {total_time}");
    if cancelled > 0 {
        output.push_str(&format!(", {}", format!("{cancelled} cancelled").bold().red()));
    }
    let output: ColoredString = output.color(colors::TEXT_DEFAULT);

    match cfg.quiet {
        0 => {
            print::fat_separator();
            print::centerln(&output);
        }
        _ => {
            rprint!();
            info!("{}", output)
        }
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
