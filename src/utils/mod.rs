//! Utility modules shared across the protocol:
//! - Account addresses
//! - Constants

pub mod address;
pub mod constants;

pub use address::*;
pub use constants::*;
