#![cfg(test)]
use std::time::Duration;

use reachr_common::checks::{BatchOptions, CheckSpec};
use reachr_common::error::SpecError;
use reachr_common::result::ProbeResult;
use reachr_core::{probe_targets, Prober};
use tokio_util::sync::CancellationToken;

use crate::support::{closed_port, open_port, LOOPBACK};

async fn probe(targets: &[&str], spec: &CheckSpec) -> Vec<ProbeResult> {
    Prober::system()
        .probe(
            targets.iter().copied(),
            spec,
            &BatchOptions::default(),
            &CancellationToken::new(),
        )
        .await
        .expect("spec is valid")
}

/// Mixed batch: an empty entry, an unroutable literal and a name that cannot exist.
#[tokio::test]
async fn mixed_batch_keeps_positions_and_isolates_failures() {
    let spec = CheckSpec::default()
        .with_dns()
        .with_tcp_port(5985)
        .with_timeout(Duration::from_secs(1));
    let results = probe(&["", "10.0.0.5", "bad-host.invalid"], &spec).await;

    assert_eq!(results.len(), 3);

    assert_eq!(results[0], ProbeResult::invalid(""));

    let literal = &results[1];
    assert_eq!(literal.target, "10.0.0.5");
    assert_eq!(literal.dns_resolved, Some(true));
    assert_eq!(literal.dns_addresses, vec!["10.0.0.5".parse::<std::net::IpAddr>().unwrap()]);
    assert_eq!(literal.tcp_port, Some(5985));
    assert!(literal.tcp_port_open.is_some());

    let unknown = &results[2];
    assert_eq!(unknown.target, "bad-host.invalid");
    assert_eq!(unknown.dns_resolved, Some(false));
    assert!(unknown.dns_addresses.is_empty());
    // The failed lookup does not stop the TCP attempt.
    assert_eq!(unknown.tcp_port, Some(5985));
    assert_eq!(unknown.tcp_port_open, Some(false));
    assert!(unknown.notes[0].starts_with("DNS resolution failed: "), "{:?}", unknown.notes);
    assert!(unknown.notes[1].starts_with("TCP connect"), "{:?}", unknown.notes);
}

#[tokio::test]
async fn loopback_open_and_refused_ports() {
    let (_listener, open) = open_port().await.unwrap();
    let closed = closed_port().await.unwrap();

    let open_spec = CheckSpec::default().with_tcp_port(open);
    let closed_spec = CheckSpec::default().with_tcp_port(closed);

    let results = probe(&[LOOPBACK, "localhost"], &open_spec).await;
    for result in &results {
        assert_eq!(result.tcp_port, Some(open));
        assert_eq!(result.tcp_port_open, Some(true), "{result:?}");
        assert!(result.notes.is_empty());
    }

    let results = probe(&[LOOPBACK], &closed_spec).await;
    assert_eq!(results[0].tcp_port_open, Some(false));
    assert_eq!(results[0].notes.len(), 1);
    // A RST answers immediately; this is not the timeout note.
    assert!(
        results[0].notes[0].starts_with("TCP connect failed: "),
        "{:?}",
        results[0].notes
    );
}

#[tokio::test]
async fn nothing_requested_touches_nothing() {
    let results = probe(&["web01", "  ", "10.0.0.5"], &CheckSpec::default()).await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0], ProbeResult::new("web01"));
    assert!(results[1].is_invalid());
    assert_eq!(results[2], ProbeResult::new("10.0.0.5"));
}

#[tokio::test]
async fn repeated_runs_agree_on_stable_targets() {
    let (_listener, open) = open_port().await.unwrap();
    let spec = CheckSpec::default().with_dns().with_tcp_port(open);

    let first = probe(&[LOOPBACK, "", LOOPBACK], &spec).await;
    let second = probe(&[LOOPBACK, "", LOOPBACK], &spec).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn one_call_batch_uses_default_options() {
    let (_listener, open) = open_port().await.unwrap();
    let spec = CheckSpec::default().with_dns().with_tcp_port(open);

    let results = probe_targets([LOOPBACK.to_string(), String::new()], &spec)
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].target, LOOPBACK);
    assert_eq!(results[0].dns_resolved, Some(true));
    assert_eq!(results[0].tcp_port_open, Some(true), "{:?}", results[0]);
    assert!(results[0].notes.is_empty());
    assert_eq!(results[1], ProbeResult::invalid(""));

    let err = probe_targets([LOOPBACK], &CheckSpec::default().with_tcp_port(0))
        .await
        .unwrap_err();
    assert_eq!(err, SpecError::PortOutOfRange(0));
}
