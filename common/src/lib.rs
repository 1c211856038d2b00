//! # Reachr Common
//!
//! Shared data model for the reachr workspace: what gets probed ([`network::target`]),
//! how it gets probed ([`checks`]), what comes back ([`result`]) and how the
//! tool is configured ([`config`]).

pub mod checks;
pub mod config;
pub mod error;
pub mod network;
pub mod result;
