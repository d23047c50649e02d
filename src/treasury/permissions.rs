//! Treasury permission categories and the timelocked change queue.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::utils::address::Address;

/// What an address is allowed to do with the treasury. The numeric
/// indices are part of the external interface and must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    /// May deposit reserve tokens (0)
    ReserveDepositor,
    /// May withdraw reserve tokens (1)
    ReserveSpender,
    /// A token counted as a reserve (2)
    ReserveToken,
    /// May manage idle reserves (3)
    ReserveManager,
    /// May deposit liquidity tokens (4)
    LiquidityDepositor,
    /// A token counted as protocol liquidity (5)
    LiquidityToken,
    /// May manage liquidity positions (6)
    LiquidityManager,
    /// May borrow reserve tokens against staked collateral (7)
    ReserveDebtor,
    /// May mint the base token against excess reserves (8)
    RewardManager,
    /// The staked token wired to the treasury (9)
    StakedToken,
    /// May borrow the base token against staked collateral (10)
    BaseDebtor,
}

impl Permission {
    /// Stable numeric index of the category
    pub fn index(&self) -> u8 {
        match self {
            Permission::ReserveDepositor => 0,
            Permission::ReserveSpender => 1,
            Permission::ReserveToken => 2,
            Permission::ReserveManager => 3,
            Permission::LiquidityDepositor => 4,
            Permission::LiquidityToken => 5,
            Permission::LiquidityManager => 6,
            Permission::ReserveDebtor => 7,
            Permission::RewardManager => 8,
            Permission::StakedToken => 9,
            Permission::BaseDebtor => 10,
        }
    }

    /// Category for a numeric index, if valid
    pub fn from_index(index: u8) -> Option<Permission> {
        match index {
            0 => Some(Permission::ReserveDepositor),
            1 => Some(Permission::ReserveSpender),
            2 => Some(Permission::ReserveToken),
            3 => Some(Permission::ReserveManager),
            4 => Some(Permission::LiquidityDepositor),
            5 => Some(Permission::LiquidityToken),
            6 => Some(Permission::LiquidityManager),
            7 => Some(Permission::ReserveDebtor),
            8 => Some(Permission::RewardManager),
            9 => Some(Permission::StakedToken),
            10 => Some(Permission::BaseDebtor),
            _ => None,
        }
    }

    /// Human-readable category name
    pub fn name(&self) -> &'static str {
        match self {
            Permission::ReserveDepositor => "reserve depositor",
            Permission::ReserveSpender => "reserve spender",
            Permission::ReserveToken => "reserve token",
            Permission::ReserveManager => "reserve manager",
            Permission::LiquidityDepositor => "liquidity depositor",
            Permission::LiquidityToken => "liquidity token",
            Permission::LiquidityManager => "liquidity manager",
            Permission::ReserveDebtor => "reserve debtor",
            Permission::RewardManager => "reward manager",
            Permission::StakedToken => "staked token",
            Permission::BaseDebtor => "base debtor",
        }
    }
}

/// A queued permission change waiting out its delay
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TimelockOrder {
    /// Category being granted
    pub permission: Permission,
    /// Address being granted it
    pub target: Address,
    /// First block at which the order may execute
    pub timelock_end: u64,
    /// Cancelled by governance
    pub nullified: bool,
    /// Already applied
    pub executed: bool,
}

impl TimelockOrder {
    /// Check that the order can still run at the given block
    pub fn check_executable(&self, current_block: u64) -> Result<()> {
        if self.nullified {
            return Err(Error::OrderNotExecutable("order was nullified".into()));
        }
        if self.executed {
            return Err(Error::OrderNotExecutable("order already executed".into()));
        }
        if current_block < self.timelock_end {
            return Err(Error::TimelockNotExpired {
                current: current_block,
                eta: self.timelock_end,
            });
        }
        Ok(())
    }
}
