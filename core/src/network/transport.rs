use std::net::IpAddr;

use anyhow::Context;
use pnet::{
    packet::ip::IpNextHeaderProtocols,
    transport::{self, TransportChannelType, TransportProtocol, TransportReceiver, TransportSender},
};

const TRANSPORT_BUFFER_SIZE: usize = 4096;
const CHANNEL_TYPE_ICMP: TransportChannelType =
    TransportChannelType::Layer4(TransportProtocol::Ipv4(IpNextHeaderProtocols::Icmp));
const CHANNEL_TYPE_ICMPV6: TransportChannelType =
    TransportChannelType::Layer4(TransportProtocol::Ipv6(IpNextHeaderProtocols::Icmpv6));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportType {
    IcmpV4,
    IcmpV6,
}

impl TransportType {
    pub fn for_addr(addr: &IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => TransportType::IcmpV4,
            IpAddr::V6(_) => TransportType::IcmpV6,
        }
    }
}

/// A raw layer 4 socket pair. Both halves close when the handle is dropped.
pub struct TransportHandle {
    pub tx: TransportSender,
    pub rx: TransportReceiver,
}

/// Opens a raw ICMP channel. Needs root or `CAP_NET_RAW`.
pub fn open_channel(transport_type: TransportType) -> anyhow::Result<TransportHandle> {
    let channel_type: TransportChannelType = match transport_type {
        TransportType::IcmpV4 => CHANNEL_TYPE_ICMP,
        TransportType::IcmpV6 => CHANNEL_TYPE_ICMPV6,
    };
    let (tx, rx) = transport::transport_channel(TRANSPORT_BUFFER_SIZE, channel_type)
        .with_context(|| format!("opening raw {transport_type:?} socket"))?;
    Ok(TransportHandle { tx, rx })
}
