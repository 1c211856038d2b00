//! # Reachr Core
//!
//! Batch reachability probing for fleets of hosts.
//!
//! ## Layout
//! * **[`prober`]**: the batch entry point. DNS, ICMP and TCP checks per target.
//! * **[`winrm`]**: the WinRM readiness check, built on the same batch runner.
//! * **[`checks`]**: traits for the network primitives a probe is made of.
//!     * *Swap these out to test without a network.*
//! * **[`network`]**: the system implementations of those traits.
//!
//! Every batch call returns exactly one result per input target, in input
//! order. Per-target failures are recorded in the result, never raised.

mod batch;

pub mod checks;
pub mod network;
pub mod prober;
pub mod winrm;

pub use batch::ProgressFn;
pub use checks::Checks;
pub use prober::{Prober, probe_targets};
