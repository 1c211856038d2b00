use std::time::Duration;

use anyhow::{Context, ensure};
use async_trait::async_trait;
use reachr_protocols::wsman::{self, IdentifyResponse};
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use crate::checks::{Handshake, WsmanEndpoint};

/// Anonymous WS-Management `Identify` over HTTP(S).
///
/// A client is built per handshake so no connection outlives the check. It
/// connects directly, ignoring proxy variables, like the TCP check does.
pub struct WsmanHandshake;

#[async_trait]
impl Handshake for WsmanHandshake {
    async fn identify(
        &self,
        endpoint: &WsmanEndpoint,
        timeout: Duration,
    ) -> anyhow::Result<IdentifyResponse> {
        let url: String = wsman::endpoint_url(&endpoint.host, endpoint.port, endpoint.transport);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .danger_accept_invalid_certs(endpoint.accept_invalid_certs)
            .no_proxy()
            .build()
            .context("building WS-Management client")?;

        let (header, value) = wsman::IDENTIFY_HEADER;
        let response = client
            .post(&url)
            .header(CONTENT_TYPE, wsman::CONTENT_TYPE)
            .header(header, value)
            .body(wsman::IDENTIFY_ENVELOPE)
            .send()
            .await
            .with_context(|| format!("no WS-Management answer from {url}"))?;

        let status = response.status();
        let body: String = response
            .text()
            .await
            .context("reading WS-Management response")?;
        debug!("{url} answered Identify with HTTP {status}");

        ensure!(status.is_success(), "{url} answered with HTTP {status}");
        wsman::parse_identify_response(&body)
    }
}
