//! sFISC, the rebasing ledger.
//!
//! Balances are stored as internal units ("gons") that never change after
//! genesis; the displayed balance is `gons * index / INDEX_ONE`, so a
//! growing index grows every holder's balance proportionally. The entire
//! gon supply is minted to the staking engine at initialization and only
//! moves between accounts afterwards.
//!
//! The ledger also holds the debt locks backing treasury borrowing: an
//! account's spendable balance is its displayed balance minus its recorded
//! debt, so collateral is locked in place rather than transferred.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::utils::address::Address;
use crate::utils::constants::{BASE_DECIMALS, INDEX_ONE, TOTAL_GONS};

/// The rebasing balance ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakedToken {
    /// Token name
    pub name: String,
    /// Token symbol
    pub symbol: String,
    /// Decimal places of the displayed balance
    pub decimals: u8,
    initializer: Option<Address>,
    staking: Address,
    treasury: Address,
    wrapped: Address,
    index: u128,
    total_gons: u128,
    gons: HashMap<Address, u128>,
    allowances: HashMap<(Address, Address), u64>,
    debts: HashMap<Address, u64>,
}

impl StakedToken {
    /// Create the ledger. `initializer` is the only address allowed to run
    /// the one-time setup (`set_index`, `set_wrapped_token`, `initialize`).
    pub fn new(initializer: Address) -> Result<Self> {
        if initializer.is_zero() {
            return Err(Error::ZeroAddress("initializer".into()));
        }
        Ok(Self {
            name: "Staked FISC".to_string(),
            symbol: "sFISC".to_string(),
            decimals: BASE_DECIMALS,
            initializer: Some(initializer),
            staking: Address::ZERO,
            treasury: Address::ZERO,
            wrapped: Address::ZERO,
            index: 0,
            total_gons: 0,
            gons: HashMap::new(),
            allowances: HashMap::new(),
            debts: HashMap::new(),
        })
    }

    // ═══════════════════════════════════════════════════════════════════════
    // ONE-TIME SETUP
    // ═══════════════════════════════════════════════════════════════════════

    /// Set the genesis index. Initializer only; fails once the index is set.
    pub fn set_index(&mut self, caller: Address, value: u128) -> Result<()> {
        self.require_initializer(caller)?;
        if self.index != 0 {
            return Err(Error::IndexAlreadySet);
        }
        if value == 0 {
            return Err(Error::InvalidParameter {
                name: "index".into(),
                reason: "must be non-zero".into(),
            });
        }
        self.index = value;
        Ok(())
    }

    /// Wire the index-wrapped token's address. Initializer only.
    pub fn set_wrapped_token(&mut self, caller: Address, wrapped: Address) -> Result<()> {
        self.require_initializer(caller)?;
        if wrapped.is_zero() {
            return Err(Error::ZeroAddress("wrapped token".into()));
        }
        self.wrapped = wrapped;
        Ok(())
    }

    /// Mint the full gon supply to the staking engine, wire the treasury,
    /// and clear the initializer so setup can never run twice.
    pub fn initialize(&mut self, caller: Address, staking: Address, treasury: Address) -> Result<()> {
        self.require_initializer(caller)?;
        if staking.is_zero() {
            return Err(Error::ZeroAddress("staking".into()));
        }
        if treasury.is_zero() {
            return Err(Error::ZeroAddress("treasury".into()));
        }
        self.staking = staking;
        self.treasury = treasury;
        self.total_gons = TOTAL_GONS;
        self.gons.insert(staking, TOTAL_GONS);
        self.initializer = None;
        Ok(())
    }

    fn require_initializer(&self, caller: Address) -> Result<()> {
        match self.initializer {
            None => Err(Error::AlreadyInitialized),
            Some(addr) if addr != caller => Err(Error::NotInitializer),
            Some(_) => Ok(()),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // INDEX CONVERSIONS
    // ═══════════════════════════════════════════════════════════════════════

    /// The authoritative rebase index. Set once, only grows.
    pub fn index(&self) -> u128 {
        self.index
    }

    /// Internal units equivalent to a displayed amount. Truncates down.
    pub fn gons_for_balance(&self, amount: u64) -> u128 {
        if self.index == 0 {
            return 0;
        }
        (amount as u128) * INDEX_ONE / self.index
    }

    /// Displayed amount equivalent to internal units. Truncates down.
    pub fn balance_for_gons(&self, gons: u128) -> u64 {
        (gons * self.index / INDEX_ONE) as u64
    }

    // ═══════════════════════════════════════════════════════════════════════
    // BALANCES AND SUPPLY
    // ═══════════════════════════════════════════════════════════════════════

    /// Displayed balance of an account
    pub fn balance_of(&self, owner: Address) -> u64 {
        self.balance_for_gons(self.gon_balance(owner))
    }

    /// Internal-unit balance of an account
    pub fn gon_balance(&self, owner: Address) -> u128 {
        self.gons.get(&owner).copied().unwrap_or(0)
    }

    /// Total displayed supply
    pub fn total_supply(&self) -> u64 {
        self.balance_for_gons(self.total_gons)
    }

    /// Externally observable circulating supply: everything not held by the
    /// staking engine, plus the amount pending in warmup, plus the supply
    /// represented by outstanding wrapped tokens. The warmup and wrapped
    /// figures are snapshots wired in by the orchestrator.
    pub fn circulating_supply(&self, supply_in_warmup: u64, wrapped_total_gons: u128) -> u64 {
        self.total_supply() - self.balance_of(self.staking)
            + supply_in_warmup
            + self.balance_for_gons(wrapped_total_gons)
    }

    /// Grow the index so circulating holders collectively gain `profit`.
    /// Zero profit or an empty circulating supply leaves the index alone.
    /// Returns the new total displayed supply.
    pub fn rebase(&mut self, profit: u64, circulating: u64) -> u64 {
        if profit > 0 && circulating > 0 {
            self.index += self.index * (profit as u128) / (circulating as u128);
        }
        self.total_supply()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // TRANSFERS AND ALLOWANCES
    // ═══════════════════════════════════════════════════════════════════════

    /// Move a displayed amount between accounts. The sender's debt-locked
    /// portion is not spendable.
    pub fn transfer(&mut self, from: Address, to: Address, amount: u64) -> Result<()> {
        let spendable = self.balance_of(from).saturating_sub(self.debt_of(from));
        if amount > spendable {
            return Err(Error::InsufficientBalance { required: amount, available: spendable });
        }
        if amount == 0 || from == to {
            return Ok(());
        }
        let gon_amount = self.gons_for_balance(amount);
        let from_gons = self.gon_balance(from);
        // spendable check above is in displayed units; gons can't go negative
        let remaining = from_gons.saturating_sub(gon_amount);
        if remaining == 0 {
            self.gons.remove(&from);
        } else {
            self.gons.insert(from, remaining);
        }
        *self.gons.entry(to).or_insert(0) += gon_amount;
        Ok(())
    }

    /// Transfer on behalf of `from`, spending `spender`'s allowance
    pub fn transfer_from(&mut self, spender: Address, from: Address, to: Address, amount: u64) -> Result<()> {
        let allowed = self.allowance(from, spender);
        if allowed < amount {
            return Err(Error::InsufficientAllowance { required: amount, allowed });
        }
        self.allowances.insert((from, spender), allowed - amount);
        self.transfer(from, to, amount)
    }

    /// Remaining allowance from `owner` to `spender`
    pub fn allowance(&self, owner: Address, spender: Address) -> u64 {
        self.allowances.get(&(owner, spender)).copied().unwrap_or(0)
    }

    /// Set the allowance from `owner` to `spender`
    pub fn approve(&mut self, owner: Address, spender: Address, amount: u64) {
        self.allowances.insert((owner, spender), amount);
    }

    /// Increase an allowance
    pub fn increase_allowance(&mut self, owner: Address, spender: Address, amount: u64) {
        let current = self.allowance(owner, spender);
        self.allowances.insert((owner, spender), current.saturating_add(amount));
    }

    /// Decrease an allowance, flooring at zero
    pub fn decrease_allowance(&mut self, owner: Address, spender: Address, amount: u64) {
        let current = self.allowance(owner, spender);
        self.allowances.insert((owner, spender), current.saturating_sub(amount));
    }

    // ═══════════════════════════════════════════════════════════════════════
    // DEBT LOCKS
    // ═══════════════════════════════════════════════════════════════════════

    /// Debt currently locking an account's balance
    pub fn debt_of(&self, account: Address) -> u64 {
        self.debts.get(&account).copied().unwrap_or(0)
    }

    /// Record or release debt against an account's balance. Treasury only.
    /// Increases fail when the new debt would exceed the account's balance.
    pub fn change_debt(&mut self, caller: Address, account: Address, amount: u64, add: bool) -> Result<()> {
        if self.treasury.is_zero() || caller != self.treasury {
            return Err(Error::Unauthorized { required: "treasury".into() });
        }
        let debt = self.debt_of(account);
        if add {
            let new_debt = debt.checked_add(amount).ok_or(Error::Overflow {
                operation: "debt balance".into(),
            })?;
            let balance = self.balance_of(account);
            if new_debt > balance {
                return Err(Error::InsufficientBalance { required: new_debt, available: balance });
            }
            self.debts.insert(account, new_debt);
        } else {
            let new_debt = debt.checked_sub(amount).ok_or(Error::RepayExceedsDebt {
                requested: amount,
                debt,
            })?;
            if new_debt == 0 {
                self.debts.remove(&account);
            } else {
                self.debts.insert(account, new_debt);
            }
        }
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // WIRING ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════

    /// The staking engine's address (zero before initialization)
    pub fn staking_address(&self) -> Address {
        self.staking
    }

    /// The treasury's address (zero before initialization)
    pub fn treasury_address(&self) -> Address {
        self.treasury
    }

    /// The wrapped token's address (zero until wired)
    pub fn wrapped_address(&self) -> Address {
        self.wrapped
    }

    /// Whether the one-time setup has completed
    pub fn is_initialized(&self) -> bool {
        self.initializer.is_none()
    }
}
