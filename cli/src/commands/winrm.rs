use std::time::{Duration, Instant};

use colored::*;
use reachr_common::checks::{BatchOptions, WinRmSpec, WinRmTransport};
use reachr_common::config::{Config, WinRmDefaults};
use reachr_common::result::WinRmResult;
use reachr_core::Prober;
use tracing::info;

use crate::commands::probe::{batch_options, display_name};
use crate::commands::{WinRmArgs, cancel_on_ctrl_c};
use crate::rprint;
use crate::terminal::{colors, format, print, spinner};

pub async fn winrm(args: WinRmArgs, defaults: &WinRmDefaults, cfg: &Config) -> anyhow::Result<()> {
    let targets: Vec<String> = args.targets.collect()?;
    let spec: WinRmSpec = winrm_spec(&args, defaults);
    let opts: BatchOptions = batch_options(&args.run, defaults.batch_options());

    print::header("checking winrm", cfg.quiet);
    info!(
        "Sending WS-Management Identify to {} target(s) on {}:{}",
        targets.len(),
        spec.transport,
        spec.port()
    );

    let total: usize = targets.len();
    let prober = Prober::system().with_progress(move |finished| spinner::report_progress(finished, total));
    let cancel = cancel_on_ctrl_c();

    let start_time: Instant = Instant::now();
    let results: Vec<WinRmResult> = prober.probe_winrm(targets, &spec, &opts, &cancel).await?;
    spinner::finish();

    if args.ready_only {
        for target in ready_targets(&results) {
            println!("{target}");
        }
        return Ok(());
    }
    if cfg.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    print_results(&results, cfg);
    print_summary(&results, start_time.elapsed(), cfg);
    Ok(())
}

fn winrm_spec(args: &WinRmArgs, defaults: &WinRmDefaults) -> WinRmSpec {
    let mut spec: WinRmSpec = defaults.winrm_spec();
    if args.https {
        spec.transport = WinRmTransport::Https;
    }
    if args.port.is_some() {
        spec.port = args.port;
    }
    if args.no_port_check {
        spec.tcp_check = false;
    }
    spec.accept_invalid_certs |= args.insecure;
    if let Some(timeout) = args.run.timeout {
        spec.timeout = timeout;
    }
    spec
}

/// Targets worth handing to remote-management tooling, trimmed, in input order.
fn ready_targets(results: &[WinRmResult]) -> Vec<&str> {
    results
        .iter()
        .filter(|result| result.is_ready())
        .map(|result| result.target().trim())
        .collect()
}

fn print_results(results: &[WinRmResult], cfg: &Config) {
    if results.is_empty() {
        print::nothing_to_show("No results");
        return;
    }

    print::header("winrm readiness", cfg.quiet);
    if cfg.quiet >= 2 {
        return;
    }

    for (idx, result) in results.iter().enumerate() {
        print::tree_head(idx, display_name(result.target()));
        print::as_tree_one_level(format::winrm_details(result));
        if idx + 1 != results.len() {
            rprint!();
        }
    }
}

fn print_summary(results: &[WinRmResult], total_time: Duration, cfg: &Config) {
    let ready: usize = results.iter().filter(|r| r.is_ready()).count();

    let ready: ColoredString = format!("{ready}/{} ready", results.len()).bold().green();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output: ColoredString =
        format!("WinRM check complete: {ready} in {total_time}").color(colors::TEXT_DEFAULT);

    match cfg.quiet {
        0 => {
            print::fat_separator();
            print::centerln(&output);
            print::end_of_program();
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
