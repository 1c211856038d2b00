//! ICMP echo over raw sockets.
//!
//! A missing reply is reported as [`EchoOutcome::NoReply`], which is not the
//! same as "host down": firewalls commonly drop echo requests silently. Being
//! unable to send at all (no `CAP_NET_RAW`) is reported as
//! [`EchoOutcome::Failed`] so callers can tell the two apart.

use std::net::IpAddr;
use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use pnet::packet::{Packet, icmp::IcmpPacket, icmpv6::Icmpv6Packet};
use pnet::transport::{icmp_packet_iter, icmpv6_packet_iter};
use reachr_protocols::icmp::{self, EchoId};
use tracing::{debug, trace};

use crate::checks::{EchoOutcome, Pinger};
use crate::network::transport::{self, TransportHandle, TransportType};

pub struct RawSocketPinger;

#[async_trait]
impl Pinger for RawSocketPinger {
    async fn echo(&self, addr: IpAddr, timeout: Duration) -> EchoOutcome {
        let id: EchoId = EchoId::new(rand::random(), 1);
        let outcome = tokio::task::spawn_blocking(move || blocking_echo(addr, id, timeout)).await;

        match outcome {
            Ok(Ok(Some(rtt))) => {
                debug!("Echo reply from {addr} after {}ms", rtt.as_millis());
                EchoOutcome::Reply { rtt }
            }
            Ok(Ok(None)) => EchoOutcome::NoReply,
            Ok(Err(e)) => EchoOutcome::Failed(format!("{e:#}")),
            Err(e) => EchoOutcome::Failed(e.to_string()),
        }
    }
}

macro_rules! await_reply {
    ($handle:expr, $iter_func:path, $matches:path, $addr:expr, $id:expr, $started:expr, $timeout:expr) => {{
        let mut replies = $iter_func(&mut $handle.rx);
        loop {
            let Some(remaining) = remaining($started, $timeout) else {
                break Ok(None);
            };
            match replies
                .next_with_timeout(remaining)
                .context("waiting for echo reply")?
            {
                Some((packet, source)) => {
                    if source == $addr && $matches(packet.packet(), $id) {
                        break Ok(Some($started.elapsed()));
                    }
                    trace!("Ignoring ICMP message from {source}");
                }
                None => break Ok(None),
            }
        }
    }};
}

/// Sends one echo request and waits for the matching reply.
///
/// Runs on the blocking pool; the socket is closed when the handle drops,
/// whichever way this returns.
fn blocking_echo(addr: IpAddr, id: EchoId, timeout: Duration) -> anyhow::Result<Option<Duration>> {
    let request: Vec<u8> = icmp::create_echo_request(&addr, id)?;
    let mut handle: TransportHandle = transport::open_channel(TransportType::for_addr(&addr))?;
    let started: Instant = Instant::now();

    match addr {
        IpAddr::V4(_) => {
            let packet = IcmpPacket::new(&request).context("wrapping echo request")?;
            handle.tx.send_to(packet, addr).context("sending echo request")?;
            await_reply!(handle, icmp_packet_iter, icmp::is_echo_reply_v4, addr, id, started, timeout)
        }
        IpAddr::V6(_) => {
            let packet = Icmpv6Packet::new(&request).context("wrapping ICMPv6 echo request")?;
            handle.tx.send_to(packet, addr).context("sending ICMPv6 echo request")?;
            await_reply!(handle, icmpv6_packet_iter, icmp::is_echo_reply_v6, addr, id, started, timeout)
        }
    }
}

fn remaining(started: Instant, timeout: Duration) -> Option<Duration> {
    timeout
        .checked_sub(started.elapsed())
        .filter(|left| !left.is_zero())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
