//! Wire formats spoken by the reachr checks.
//!
//! * [`icmp`]: ICMP / ICMPv6 echo request construction and reply matching.
//! * [`wsman`]: the WS-Management `Identify` exchange used to detect WinRM.

pub mod icmp;
pub mod wsman;
