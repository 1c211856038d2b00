#![cfg(test)]
use std::time::Duration;

use reachr_common::checks::{BatchOptions, WinRmSpec, WinRmTransport};
use reachr_common::result::WinRmResult;
use reachr_core::Prober;
use tokio_util::sync::CancellationToken;

use crate::support::{closed_port, MockWsman, IDENTIFY_RESPONSE, LOOPBACK};

fn spec(port: u16) -> WinRmSpec {
    WinRmSpec {
        port: Some(port),
        timeout: Duration::from_secs(2),
        ..WinRmSpec::default()
    }
}

async fn check(spec: &WinRmSpec) -> WinRmResult {
    let mut results = Prober::system()
        .probe_winrm(
            [LOOPBACK],
            spec,
            &BatchOptions::default(),
            &CancellationToken::new(),
        )
        .await
        .expect("spec is valid");
    assert_eq!(results.len(), 1);
    results.remove(0)
}

#[tokio::test]
async fn identify_answer_means_ready() {
    let endpoint = MockWsman::start(200, IDENTIFY_RESPONSE).await.unwrap();
    let result = check(&spec(endpoint.port)).await;

    assert!(result.protocol_ok, "{result:?}");
    assert_eq!(result.protocol_error, None);
    assert_eq!(result.transport, WinRmTransport::Http);
    assert_eq!(result.port, endpoint.port);
    assert_eq!(result.product_vendor.as_deref(), Some("Microsoft Corporation"));
    assert_eq!(result.probe.tcp_port_open, Some(true));

    let requests = endpoint.requests();
    assert_eq!(requests.len(), 1, "{requests:?}");
    let identify = &requests[0];
    assert_eq!(identify.header("wsmanidentify"), Some("unauthenticated"));
    assert!(identify
        .header("content-type")
        .is_some_and(|value| value.starts_with("application/soap+xml")));
    assert!(identify.body.contains("Identify"), "{}", identify.body);
}

#[tokio::test]
async fn server_error_is_not_ready_even_with_the_port_open() {
    let endpoint = MockWsman::start(500, "internal error").await.unwrap();
    let result = check(&spec(endpoint.port)).await;

    assert!(!result.protocol_ok);
    assert_eq!(result.probe.tcp_port_open, Some(true));
    let error = result.protocol_error.unwrap_or_default();
    assert!(error.contains("HTTP 500"), "{error}");
}

#[tokio::test]
async fn non_wsman_server_is_not_ready() {
    let endpoint = MockWsman::start(200, "<html><body>It works!</body></html>")
        .await
        .unwrap();
    let result = check(&spec(endpoint.port)).await;

    assert!(!result.protocol_ok);
    assert!(result
        .protocol_error
        .unwrap_or_default()
        .contains("not a WS-Management IdentifyResponse"));
}

#[tokio::test]
async fn nothing_listening_fails_both_checks() {
    let port = closed_port().await.unwrap();
    let result = check(&spec(port)).await;

    assert!(!result.protocol_ok);
    assert!(result.protocol_error.is_some());
    assert_eq!(result.probe.tcp_port_open, Some(false));
    assert!(result.probe.notes[0].starts_with("TCP connect failed: "));
}

#[tokio::test]
async fn ready_without_the_port_check() {
    let endpoint = MockWsman::start(200, IDENTIFY_RESPONSE).await.unwrap();
    let spec = WinRmSpec {
        tcp_check: false,
        ..spec(endpoint.port)
    };
    let result = check(&spec).await;

    assert!(result.protocol_ok);
    assert_eq!(result.probe.tcp_port, None);
    assert_eq!(result.probe.tcp_port_open, None);
    assert!(result.probe.notes.is_empty());
}
