//! Epoch reward policy.
//!
//! Each recipient receives `supply * rate / RATE_DENOMINATOR` base tokens
//! per epoch turn, plus the trigger of a rebase earns a flat bounty. The
//! distributor only computes amounts; the treasury mints them.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::utils::address::Address;
use crate::utils::constants::{MAX_BOUNTY, RATE_DENOMINATOR};

/// A reward recipient and its emission rate
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RecipientInfo {
    /// Where minted rewards are sent
    pub recipient: Address,
    /// Emission rate, in millionths of base supply per epoch
    pub rate: u64,
}

/// Per-epoch reward calculator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Distributor {
    address: Address,
    bounty: u64,
    recipients: Vec<RecipientInfo>,
}

impl Distributor {
    /// Create a distributor with no recipients and no bounty
    pub fn new(address: Address) -> Result<Self> {
        if address.is_zero() {
            return Err(Error::ZeroAddress("distributor".into()));
        }
        Ok(Self { address, bounty: 0, recipients: Vec::new() })
    }

    /// The distributor's ledger address, used for treasury permissioning
    pub fn address(&self) -> Address {
        self.address
    }

    /// Reward owed at a given rate against the current base supply
    pub fn next_reward_at(rate: u64, base_supply: u64) -> u64 {
        ((base_supply as u128) * (rate as u128) / (RATE_DENOMINATOR as u128)) as u64
    }

    /// Rewards owed to each recipient this turn, skipping zero rates
    pub fn plan_rewards(&self, base_supply: u64) -> Vec<(Address, u64)> {
        self.recipients
            .iter()
            .filter(|info| info.rate > 0)
            .map(|info| (info.recipient, Self::next_reward_at(info.rate, base_supply)))
            .collect()
    }

    /// Sum of all planned rewards this turn
    pub fn total_planned(&self, base_supply: u64) -> u64 {
        self.plan_rewards(base_supply).iter().map(|(_, amount)| amount).sum()
    }

    /// Reward owed to a specific recipient this turn, summed across its
    /// slots; zero for unregistered addresses
    pub fn next_reward_for(&self, recipient: Address, base_supply: u64) -> u64 {
        self.recipients
            .iter()
            .filter(|info| info.recipient == recipient)
            .map(|info| Self::next_reward_at(info.rate, base_supply))
            .sum()
    }

    /// Register a reward recipient
    pub fn add_recipient(&mut self, recipient: Address, rate: u64) -> Result<()> {
        if recipient.is_zero() {
            return Err(Error::ZeroAddress("recipient".into()));
        }
        if rate > RATE_DENOMINATOR {
            return Err(Error::InvalidParameter {
                name: "rate".into(),
                reason: "exceeds denominator".into(),
            });
        }
        self.recipients.push(RecipientInfo { recipient, rate });
        Ok(())
    }

    /// Drop the recipient at the given slot
    pub fn remove_recipient(&mut self, index: usize) -> Result<()> {
        if index >= self.recipients.len() {
            return Err(Error::InvalidParameter {
                name: "index".into(),
                reason: "no recipient at slot".into(),
            });
        }
        self.recipients.remove(index);
        Ok(())
    }

    /// Registered recipients
    pub fn recipients(&self) -> &[RecipientInfo] {
        &self.recipients
    }

    /// Flat reward paid to whoever triggers a rebase
    pub fn bounty(&self) -> u64 {
        self.bounty
    }

    /// Set the trigger bounty, capped at the protocol maximum
    pub fn set_bounty(&mut self, amount: u64) -> Result<()> {
        if amount > MAX_BOUNTY {
            return Err(Error::InvalidParameter {
                name: "bounty".into(),
                reason: "exceeds maximum".into(),
            });
        }
        self.bounty = amount;
        Ok(())
    }
}
