//! Staking: warmup accounting, the epoch clock, and reward policy.

pub mod distributor;
pub mod engine;

pub use distributor::{Distributor, RecipientInfo};
pub use engine::{Epoch, StakingEngine, WarmupInfo};
