use std::net::IpAddr;

use anyhow::Context;
use pnet::packet::icmp::{self, IcmpCode, IcmpPacket, IcmpTypes, echo_reply, echo_request};
use pnet::packet::icmpv6::{self, Icmpv6Code, Icmpv6Types};

pub const ECHO_HDR_LEN: usize = 8;
pub const ECHO_PAYLOAD: &[u8] = b"reachr echo probe";

/// Correlates an echo reply with the request that caused it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EchoId {
    pub identifier: u16,
    pub sequence: u16,
}

impl EchoId {
    pub fn new(identifier: u16, sequence: u16) -> Self {
        Self {
            identifier,
            sequence,
        }
    }
}

/// Builds the ICMP payload of an echo request for the address family of `addr`.
pub fn create_echo_request(addr: &IpAddr, id: EchoId) -> anyhow::Result<Vec<u8>> {
    match addr {
        IpAddr::V4(_) => create_echo_request_v4(id),
        IpAddr::V6(_) => create_echo_request_v6(id),
    }
}

pub fn create_echo_request_v4(id: EchoId) -> anyhow::Result<Vec<u8>> {
    let mut buffer: Vec<u8> = vec![0u8; ECHO_HDR_LEN + ECHO_PAYLOAD.len()];
    {
        let mut echo = echo_request::MutableEchoRequestPacket::new(&mut buffer)
            .context("creating echo request")?;
        echo.set_icmp_type(IcmpTypes::EchoRequest);
        echo.set_icmp_code(IcmpCode::new(0));
        echo.set_identifier(id.identifier);
        echo.set_sequence_number(id.sequence);
        echo.set_payload(ECHO_PAYLOAD);
        echo.set_checksum(0);
    }

    let checksum: u16 = {
        let packet = IcmpPacket::new(&buffer).context("reading back echo request")?;
        icmp::checksum(&packet)
    };
    buffer[2..4].copy_from_slice(&checksum.to_be_bytes());

    Ok(buffer)
}

/// The checksum stays zero: the kernel fills it in for ICMPv6 raw sockets,
/// since it depends on the source address picked at send time.
pub fn create_echo_request_v6(id: EchoId) -> anyhow::Result<Vec<u8>> {
    let mut buffer: Vec<u8> = vec![0u8; ECHO_HDR_LEN + ECHO_PAYLOAD.len()];
    {
        let mut echo = icmpv6::echo_request::MutableEchoRequestPacket::new(&mut buffer)
            .context("creating ICMPv6 echo request")?;
        echo.set_icmpv6_type(Icmpv6Types::EchoRequest);
        echo.set_icmpv6_code(Icmpv6Code::new(0));
        echo.set_identifier(id.identifier);
        echo.set_sequence_number(id.sequence);
        echo.set_payload(ECHO_PAYLOAD);
        echo.set_checksum(0);
    }
    Ok(buffer)
}

pub fn is_echo_reply_v4(bytes: &[u8], id: EchoId) -> bool {
    let Some(reply) = echo_reply::EchoReplyPacket::new(bytes) else {
        return false;
    };
    reply.get_icmp_type() == IcmpTypes::EchoReply
        && reply.get_identifier() == id.identifier
        && reply.get_sequence_number() == id.sequence
}

pub fn is_echo_reply_v6(bytes: &[u8], id: EchoId) -> bool {
    let Some(reply) = icmpv6::echo_reply::EchoReplyPacket::new(bytes) else {
        return false;
    };
    reply.get_icmpv6_type() == Icmpv6Types::EchoReply
        && reply.get_identifier() == id.identifier
        && reply.get_sequence_number() == id.sequence
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
