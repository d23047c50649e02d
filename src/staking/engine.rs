//! The staking engine: warmup accounting and the epoch clock.
//!
//! Deposits sit in warmup until their expiry epoch. Warmup records are
//! kept in internal units so queued deposits participate in rebases that
//! happen while they wait. The engine itself never touches token ledgers;
//! the orchestrator moves funds and asks the engine what is owed.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::utils::address::Address;

/// The rebase schedule and the reward pending for the next turn
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Epoch {
    /// Blocks per epoch
    pub length: u64,
    /// Current epoch number
    pub number: u64,
    /// Block at which the current epoch ends
    pub end: u64,
    /// Reward to distribute when this epoch rolls over
    pub distribute: u64,
}

/// A deposit waiting out its warmup
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct WarmupInfo {
    /// Principal deposited, in base token units
    pub deposit: u64,
    /// Staked claim in internal units, so it rebases while waiting
    pub gons: u128,
    /// First epoch number at which the claim may be retrieved
    pub expiry: u64,
    /// When set, the account may only deposit to and claim for itself,
    /// and third parties may not deposit to or claim for it
    pub lock: bool,
}

/// Warmup ledger and epoch clock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakingEngine {
    address: Address,
    /// Rebase schedule
    pub epoch: Epoch,
    warmup: HashMap<Address, WarmupInfo>,
    gons_in_warmup: u128,
    warmup_period: u64,
    distributor: Option<Address>,
}

impl StakingEngine {
    /// Create the engine with its first epoch
    pub fn new(address: Address, epoch_length: u64, first_epoch_number: u64, first_epoch_end: u64) -> Result<Self> {
        if address.is_zero() {
            return Err(Error::ZeroAddress("staking".into()));
        }
        if epoch_length == 0 {
            return Err(Error::InvalidParameter {
                name: "epoch_length".into(),
                reason: "must be non-zero".into(),
            });
        }
        Ok(Self {
            address,
            epoch: Epoch {
                length: epoch_length,
                number: first_epoch_number,
                end: first_epoch_end,
                distribute: 0,
            },
            warmup: HashMap::new(),
            gons_in_warmup: 0,
            warmup_period: 0,
            distributor: None,
        })
    }

    /// The engine's ledger address
    pub fn address(&self) -> Address {
        self.address
    }

    // ═══════════════════════════════════════════════════════════════════════
    // WARMUP
    // ═══════════════════════════════════════════════════════════════════════

    /// Fail when a locked caller deposits for someone else, or when a
    /// third party deposits for a locked account
    pub fn check_deposit_lock(&self, caller: Address, to: Address) -> Result<()> {
        if to != caller && (self.is_locked(caller) || self.is_locked(to)) {
            return Err(Error::ExternalDepositsLocked);
        }
        Ok(())
    }

    /// Fail when a locked caller claims for someone else, or when a
    /// third party claims for a locked account
    pub fn check_claim_lock(&self, caller: Address, to: Address) -> Result<()> {
        if to != caller && (self.is_locked(caller) || self.is_locked(to)) {
            return Err(Error::ExternalClaimsLocked);
        }
        Ok(())
    }

    /// Queue a deposit. Principal and internal units accumulate across
    /// deposits; the expiry resets to the current warmup horizon.
    pub fn record_warmup(&mut self, to: Address, deposit: u64, gons: u128) {
        let expiry = self.epoch.number + self.warmup_period;
        let info = self.warmup.entry(to).or_default();
        info.deposit += deposit;
        info.gons += gons;
        info.expiry = expiry;
        self.gons_in_warmup += gons;
    }

    /// Retrieve a matured claim, returning the internal units owed.
    /// Returns zero when there is nothing to claim or the warmup has not
    /// expired yet; neither case is an error.
    pub fn retrieve_claim(&mut self, to: Address) -> u128 {
        let claimable = match self.warmup.get(&to) {
            Some(info) => info.gons > 0 && self.epoch.number >= info.expiry,
            None => false,
        };
        if !claimable {
            return 0;
        }
        let info = self.warmup.remove(&to).unwrap_or_default();
        self.gons_in_warmup -= info.gons;
        info.gons
    }

    /// Cancel a pending warmup, returning (principal, internal units).
    /// Callable at any time, even with nothing queued.
    pub fn forfeit(&mut self, account: Address) -> (u64, u128) {
        match self.warmup.remove(&account) {
            Some(info) => {
                self.gons_in_warmup -= info.gons;
                (info.deposit, info.gons)
            }
            None => (0, 0),
        }
    }

    /// Flip the caller's external deposit/claim lock
    pub fn toggle_lock(&mut self, account: Address) -> bool {
        let info = self.warmup.entry(account).or_default();
        info.lock = !info.lock;
        info.lock
    }

    /// Whether external deposits and claims are locked for an account
    pub fn is_locked(&self, account: Address) -> bool {
        self.warmup.get(&account).map(|i| i.lock).unwrap_or(false)
    }

    /// Pending warmup record for an account, if any
    pub fn warmup_info(&self, account: Address) -> Option<&WarmupInfo> {
        self.warmup.get(&account)
    }

    /// Internal units currently held in warmup across all accounts
    pub fn gons_in_warmup(&self) -> u128 {
        self.gons_in_warmup
    }

    /// Epochs a deposit must wait before it can be claimed
    pub fn warmup_period(&self) -> u64 {
        self.warmup_period
    }

    /// Change the warmup horizon. Applies to deposits made after the change.
    pub fn set_warmup_period(&mut self, period: u64) {
        self.warmup_period = period;
    }

    // ═══════════════════════════════════════════════════════════════════════
    // EPOCH CLOCK
    // ═══════════════════════════════════════════════════════════════════════

    /// Whether the current epoch has ended at the given block
    pub fn epoch_over(&self, block: u64) -> bool {
        self.epoch.end <= block
    }

    /// Roll to the next epoch
    pub fn advance_epoch(&mut self) {
        self.epoch.end += self.epoch.length;
        self.epoch.number += 1;
    }

    /// Reward distributor wired to the engine, if any
    pub fn distributor(&self) -> Option<Address> {
        self.distributor
    }

    /// Wire or replace the reward distributor
    pub fn set_distributor(&mut self, distributor: Address) -> Result<()> {
        if distributor.is_zero() {
            return Err(Error::ZeroAddress("distributor".into()));
        }
        self.distributor = Some(distributor);
        Ok(())
    }
}
