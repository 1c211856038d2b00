use std::net::IpAddr;

use anyhow::{Context, ensure};
use async_trait::async_trait;
use tokio::net;
use tracing::trace;

use crate::checks::Resolver;

/// Resolves through the platform resolver (getaddrinfo), so hosts files,
/// search domains and split-horizon setups behave as they do for every other
/// tool on the machine.
pub struct SystemResolver;

#[async_trait]
impl Resolver for SystemResolver {
    async fn resolve(&self, host: &str) -> anyhow::Result<Vec<IpAddr>> {
        let addrs: Vec<IpAddr> = net::lookup_host((host, 0))
            .await
            .with_context(|| format!("lookup of {host} failed"))?
            .map(|socket_addr| socket_addr.ip())
            .collect();

        ensure!(!addrs.is_empty(), "no addresses returned for {host}");
        trace!("{host} resolved to {addrs:?}");
        Ok(addrs)
    }
}

/// Removes repeated addresses, keeping the first occurrence of each.
pub fn unique_first_seen(addrs: Vec<IpAddr>) -> Vec<IpAddr> {
    let mut unique: Vec<IpAddr> = Vec::with_capacity(addrs.len());
    for addr in addrs {
        if !unique.contains(&addr) {
            unique.push(addr);
        }
    }
    unique
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
