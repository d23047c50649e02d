//! # Fiscus Protocol
//!
//! A token staking and treasury protocol: a base token (FISC) is staked
//! into a rebasing derivative (sFISC) whose supply grows each epoch, with
//! an optional index-wrapped non-rebasing form (gFISC). A treasury mints
//! the base token against deposited reserves and lets permitted accounts
//! borrow against their staked balance.
//!
//! ## Architecture
//!
//! - **Core**: the token ledgers (base, rebasing, wrapped, reserves)
//! - **Staking**: warmup accounting, the epoch clock, and reward policy
//! - **Treasury**: reserve bookkeeping, permissioning, and debt
//! - **Governance**: the role registry
//! - **Protocol**: the orchestrator that wires it all together
//!
//! ## Example
//!
//! ```rust,ignore
//! use fiscus::prelude::*;
//!
//! let mut protocol = Protocol::new(config, authority, deployer)?;
//! protocol.stake(alice, alice, amount, true, true)?;
//! protocol.advance_blocks(epoch_length);
//! protocol.rebase(alice)?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    trivial_casts,
    unused_lifetimes,
    unused_qualifications
)]

pub mod core;
pub mod error;
pub mod governance;
pub mod protocol;
pub mod staking;
pub mod treasury;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{base_value, BaseToken, ReserveToken, StakedToken, WrappedToken};
    pub use crate::error::{Error, Result};
    pub use crate::governance::{Authority, Role};
    pub use crate::protocol::{EventLog, Protocol, ProtocolConfig, ProtocolEvent};
    pub use crate::staking::{Distributor, Epoch, RecipientInfo, StakingEngine, WarmupInfo};
    pub use crate::treasury::{Permission, TimelockOrder, Treasury};
    pub use crate::utils::address::Address;
    pub use crate::utils::constants::*;
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Protocol name
pub const PROTOCOL_NAME: &str = "Fiscus";
