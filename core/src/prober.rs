//! # Batch Reachability Prober
//!
//! Runs the checks of a [`CheckSpec`] against every target of a batch and
//! returns one [`ProbeResult`] per target, in input order.
//!
//! Per target the checks run in a fixed order (DNS, ICMP, TCP) and each one
//! is isolated: a failed lookup is recorded and the next check still runs.
//! Nothing that happens to a single target is raised as an error. The only
//! error a batch call returns is a [`SpecError`], before any target is touched.

use std::net::IpAddr;
use std::time::Duration;

use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use reachr_common::checks::{BatchOptions, CheckSpec};
use reachr_common::error::SpecError;
use reachr_common::network::target::Target;
use reachr_common::result::{ProbeResult, notes};

use crate::batch::{self, ProgressFn, until_cancelled};
use crate::checks::{Checks, Connector, EchoOutcome, Resolver, TcpOutcome};
use crate::network::dns::unique_first_seen;

/// Slack granted to a check implementation on top of its own timeout before
/// the prober stops waiting for it.
const CHECK_GRACE: Duration = Duration::from_millis(250);

/// Probes batches of targets with a fixed set of [`Checks`].
///
/// Holds no state between calls; one prober can serve any number of batches.
#[derive(Clone)]
pub struct Prober {
    pub(crate) checks: Checks,
    pub(crate) progress: Option<ProgressFn>,
}

impl Prober {
    pub fn new(checks: Checks) -> Self {
        Self {
            checks,
            progress: None,
        }
    }

    /// A prober talking to the real network.
    pub fn system() -> Self {
        Self::new(Checks::system())
    }

    /// Calls `progress` with the number of finished targets after each one completes.
    pub fn with_progress(mut self, progress: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.progress = Some(std::sync::Arc::new(progress));
        self
    }

    /// Runs `spec` against every target.
    ///
    /// Returns exactly one result per target, positionally aligned with the
    /// input. When `cancel` fires (or `opts.deadline` elapses), finished
    /// results are kept and the rest carry a `"cancelled"` note.
    pub async fn probe<I, S>(
        &self,
        targets: I,
        spec: &CheckSpec,
        opts: &BatchOptions,
        cancel: &CancellationToken,
    ) -> Result<Vec<ProbeResult>, SpecError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        spec.validate()?;
        opts.validate()?;

        let targets: Vec<String> = targets.into_iter().map(Into::into).collect();
        debug!(
            "Probing {} target(s) with {:?}, up to {} at a time",
            targets.len(),
            spec,
            opts.concurrency
        );

        let results = batch::run_ordered(
            targets,
            opts,
            cancel,
            self.progress.as_ref(),
            |target, token| {
                let checks = self.checks.clone();
                let spec = spec.clone();
                async move { probe_target(&checks, target, &spec, &token).await }
            },
            placeholder,
        )
        .await;

        Ok(results)
    }
}

/// Probes `targets` against the real network with default batch options.
pub async fn probe_targets<I, S>(targets: I, spec: &CheckSpec) -> Result<Vec<ProbeResult>, SpecError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Prober::system()
        .probe(targets, spec, &BatchOptions::default(), &CancellationToken::new())
        .await
}

/// Result for a target that never ran to completion.
pub(crate) fn placeholder(target: String, note: &str) -> ProbeResult {
    match note {
        notes::CANCELLED => ProbeResult::cancelled(target),
        other => {
            let mut result = ProbeResult::new(target);
            result.note(other);
            result
        }
    }
}

async fn probe_target(
    checks: &Checks,
    raw: String,
    spec: &CheckSpec,
    token: &CancellationToken,
) -> ProbeResult {
    let target: Target = Target::new(raw);
    let (Some(host), literal) = (target.host().map(str::to_string), target.ip()) else {
        trace!("Skipping invalid target {:?}", target.as_str());
        return ProbeResult::invalid(target.into_raw());
    };
    let mut result: ProbeResult = ProbeResult::new(target.into_raw());

    if spec.dns {
        let step = check_dns(checks.resolver.as_ref(), &host, spec.timeout, &mut result);
        if until_cancelled(token, step).await.is_none() {
            result.note(notes::CANCELLED);
            return result;
        }
    }

    if spec.icmp {
        let known: Option<IpAddr> = literal.or_else(|| result.dns_addresses.first().copied());
        let step = check_icmp(checks, &host, known, spec.timeout, &mut result);
        if until_cancelled(token, step).await.is_none() {
            result.note(notes::CANCELLED);
            return result;
        }
    }

    if let Some(port) = spec.tcp_port {
        let step = check_tcp(checks.connector.as_ref(), &host, port, spec.timeout, &mut result);
        if until_cancelled(token, step).await.is_none() {
            result.note(notes::CANCELLED);
            return result;
        }
    }

    trace!("{result:?}");
    result
}

async fn check_dns(resolver: &dyn Resolver, host: &str, timeout: Duration, result: &mut ProbeResult) {
    let cause: String = match time::timeout(timeout, resolver.resolve(host)).await {
        Ok(Ok(addrs)) if !addrs.is_empty() => {
            result.dns_resolved = Some(true);
            result.dns_addresses = unique_first_seen(addrs);
            return;
        }
        Ok(Ok(_)) => format!("no addresses returned for {host}"),
        Ok(Err(e)) => format!("{e:#}"),
        Err(_elapsed) => format!("timed out after {}ms", timeout.as_millis()),
    };

    debug!("DNS check for {host} failed: {cause}");
    result.dns_resolved = Some(false);
    result.dns_addresses.clear();
    result.note(notes::dns_failed(cause));
}

/// `known` is the address to ping when one is already at hand (an IP literal
/// target, or the first address of a successful DNS check). Otherwise the
/// host is resolved here, within the same timeout.
async fn check_icmp(
    checks: &Checks,
    host: &str,
    known: Option<IpAddr>,
    timeout: Duration,
    result: &mut ProbeResult,
) {
    let started: Instant = Instant::now();

    let addr: IpAddr = match known {
        Some(addr) => addr,
        None => match time::timeout(timeout, checks.resolver.resolve(host)).await {
            Ok(Ok(addrs)) if !addrs.is_empty() => addrs[0],
            Ok(Ok(_)) => return icmp_failed(result, format!("no address to ping for {host}")),
            Ok(Err(e)) => return icmp_failed(result, format!("{e:#}")),
            Err(_elapsed) => return icmp_failed(result, format!("resolving {host} timed out")),
        },
    };

    let budget: Duration = timeout.saturating_sub(started.elapsed());
    let outcome = time::timeout(budget + CHECK_GRACE, checks.pinger.echo(addr, budget))
        .await
        .unwrap_or(EchoOutcome::NoReply);

    match outcome {
        EchoOutcome::Reply { rtt } => {
            trace!("{host} ({addr}) answered echo in {}ms", rtt.as_millis());
            result.icmp_reachable = Some(true);
        }
        EchoOutcome::NoReply => {
            result.icmp_reachable = Some(false);
            result.note(notes::ICMP_NO_REPLY);
        }
        EchoOutcome::Failed(cause) => icmp_failed(result, cause),
    }
}

fn icmp_failed(result: &mut ProbeResult, cause: String) {
    debug!("ICMP check for {} failed: {cause}", result.target);
    result.icmp_reachable = Some(false);
    result.note(notes::icmp_failed(cause));
}

/// The TCP sub-check, shared verbatim by the WinRM readiness check.
pub(crate) async fn check_tcp(
    connector: &dyn Connector,
    host: &str,
    port: u16,
    timeout: Duration,
    result: &mut ProbeResult,
) {
    let outcome = time::timeout(timeout + CHECK_GRACE, connector.connect(host, port, timeout))
        .await
        .unwrap_or(TcpOutcome::TimedOut);

    result.tcp_port = Some(port);
    match outcome {
        TcpOutcome::Open => result.tcp_port_open = Some(true),
        TcpOutcome::TimedOut => {
            result.tcp_port_open = Some(false);
            result.note(notes::TCP_TIMED_OUT);
        }
        TcpOutcome::Failed(cause) => {
            result.tcp_port_open = Some(false);
            result.note(notes::tcp_failed(cause));
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
