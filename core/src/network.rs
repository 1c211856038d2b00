//! System implementations of the [`crate::checks`] traits.

pub mod dns;
pub mod icmp;
pub mod tcp;
pub mod transport;
pub mod wsman;
