//! Access control for the protocol.
//!
//! A single [`Authority`] answers "does principal P hold role R" for the
//! governor, guardian, policy, and vault roles. Every privileged entry
//! point consults it; no component embeds its own role logic.

pub mod authority;

pub use authority::*;
