//! # WinRM Readiness
//!
//! A target is ready for remote management when its WinRM listener answers an
//! anonymous WS-Management `Identify`. That handshake alone decides
//! `protocol_ok`.
//!
//! The TCP connect to the listener port runs alongside it as a diagnostic. Its
//! outcome is reported but never feeds `protocol_ok`: a bare connect can fail
//! while the listener serves requests fine, and an open port can belong to a
//! broken listener.

use std::time::Duration;

use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use reachr_common::checks::{BatchOptions, WinRmSpec};
use reachr_common::error::SpecError;
use reachr_common::network::target::Target;
use reachr_common::result::{ProbeResult, WinRmResult, notes};

use crate::batch::{self, until_cancelled};
use crate::checks::{Checks, WsmanEndpoint};
use crate::prober::{Prober, check_tcp, placeholder};

const HANDSHAKE_GRACE: Duration = Duration::from_millis(250);

impl Prober {
    /// Runs the WinRM readiness check against every target.
    ///
    /// Same batch contract as [`Prober::probe`]: one result per target, in
    /// input order, with unfinished targets marked `"cancelled"`.
    pub async fn probe_winrm<I, S>(
        &self,
        targets: I,
        spec: &WinRmSpec,
        opts: &BatchOptions,
        cancel: &CancellationToken,
    ) -> Result<Vec<WinRmResult>, SpecError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        spec.validate()?;
        opts.validate()?;

        let targets: Vec<String> = targets.into_iter().map(Into::into).collect();
        debug!(
            "Checking WinRM ({} on port {}) on {} target(s)",
            spec.transport,
            spec.port(),
            targets.len()
        );

        let transport = spec.transport;
        let port: u16 = spec.port();
        let results = batch::run_ordered(
            targets,
            opts,
            cancel,
            self.progress.as_ref(),
            |target, token| {
                let checks = self.checks.clone();
                let spec = spec.clone();
                async move { check_target(&checks, target, &spec, &token).await }
            },
            |target, note| WinRmResult::from_probe(placeholder(target, note), transport, port),
        )
        .await;

        Ok(results)
    }
}

async fn check_target(
    checks: &Checks,
    raw: String,
    spec: &WinRmSpec,
    token: &CancellationToken,
) -> WinRmResult {
    let port: u16 = spec.port();
    let target: Target = Target::new(raw);
    let Some(host) = target.host().map(str::to_string) else {
        return WinRmResult::from_probe(ProbeResult::invalid(target.into_raw()), spec.transport, port);
    };
    let mut probe: ProbeResult = ProbeResult::new(target.into_raw());

    let endpoint = WsmanEndpoint {
        host: host.clone(),
        port,
        transport: spec.transport,
        accept_invalid_certs: spec.accept_invalid_certs,
    };

    let handshake = until_cancelled(
        token,
        time::timeout(
            spec.timeout + HANDSHAKE_GRACE,
            checks.handshake.identify(&endpoint, spec.timeout),
        ),
    );
    let tcp = async {
        if !spec.tcp_check {
            return Some(());
        }
        let step = check_tcp(checks.connector.as_ref(), &host, port, spec.timeout, &mut probe);
        until_cancelled(token, step).await
    };
    let (handshake, tcp) = tokio::join!(handshake, tcp);
    let cancelled: bool = handshake.is_none() || tcp.is_none();

    let mut result: WinRmResult = WinRmResult::from_probe(probe, spec.transport, port);
    match handshake {
        Some(Ok(Ok(identity))) => {
            trace!("{host} identified as {identity:?}");
            result.protocol_ok = true;
            result.protocol_version = identity.protocol_version;
            result.product_vendor = identity.product_vendor;
            result.product_version = identity.product_version;
        }
        Some(Ok(Err(e))) => {
            debug!("WS-Management handshake with {host} failed: {e:#}");
            result.protocol_error = Some(format!("{e:#}"));
        }
        Some(Err(_elapsed)) => {
            result.protocol_error = Some(format!(
                "handshake timed out after {}ms",
                spec.timeout.as_millis()
            ));
        }
        None => {}
    }

    if cancelled {
        result.probe.note(notes::CANCELLED);
    }
    result
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
