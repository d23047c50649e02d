//! gFISC, the index-wrapped non-rebasing token.
//!
//! A wrapped balance is a fixed claim on internal units: converting a
//! rebasing amount in divides by the current index, converting out
//! multiplies by it. Holding through a rebase therefore keeps the wrapped
//! balance constant while its redemption value grows.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::utils::address::Address;
use crate::utils::constants::INDEX_ONE;

/// The index-wrapped token ledger. Amounts are internal units (u128).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WrappedToken {
    /// Token name
    pub name: String,
    /// Token symbol
    pub symbol: String,
    staking: Address,
    total_supply: u128,
    balances: HashMap<Address, u128>,
    allowances: HashMap<(Address, Address), u128>,
}

impl WrappedToken {
    /// Create the ledger. Only the staking engine may mint and burn.
    pub fn new(staking: Address) -> Result<Self> {
        if staking.is_zero() {
            return Err(Error::ZeroAddress("staking".into()));
        }
        Ok(Self {
            name: "Governance FISC".to_string(),
            symbol: "gFISC".to_string(),
            staking,
            total_supply: 0,
            balances: HashMap::new(),
            allowances: HashMap::new(),
        })
    }

    /// Wrapped units for a rebasing amount at the given index. Truncates down.
    pub fn balance_to(rebasing: u64, index: u128) -> u128 {
        if index == 0 {
            return 0;
        }
        (rebasing as u128) * INDEX_ONE / index
    }

    /// Rebasing amount for wrapped units at the given index. Truncates down.
    pub fn balance_from(wrapped: u128, index: u128) -> u64 {
        (wrapped * index / INDEX_ONE) as u64
    }

    /// Total wrapped supply in internal units
    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    /// Wrapped balance of an account
    pub fn balance_of(&self, owner: Address) -> u128 {
        self.balances.get(&owner).copied().unwrap_or(0)
    }

    /// Mint wrapped units. Staking engine only.
    pub fn mint(&mut self, caller: Address, to: Address, amount: u128) -> Result<()> {
        if caller != self.staking {
            return Err(Error::Unauthorized { required: "staking".into() });
        }
        if to.is_zero() {
            return Err(Error::ZeroAddress("recipient".into()));
        }
        self.total_supply = self.total_supply.checked_add(amount).ok_or(Error::Overflow {
            operation: "wrapped supply".into(),
        })?;
        *self.balances.entry(to).or_insert(0) += amount;
        Ok(())
    }

    /// Burn wrapped units from an account. Staking engine only.
    pub fn burn(&mut self, caller: Address, from: Address, amount: u128) -> Result<()> {
        if caller != self.staking {
            return Err(Error::Unauthorized { required: "staking".into() });
        }
        let balance = self.balance_of(from);
        if balance < amount {
            return Err(Error::InsufficientBalance {
                required: Self::balance_from(amount, INDEX_ONE),
                available: Self::balance_from(balance, INDEX_ONE),
            });
        }
        if balance == amount {
            self.balances.remove(&from);
        } else {
            self.balances.insert(from, balance - amount);
        }
        self.total_supply -= amount;
        Ok(())
    }

    /// Move wrapped units between accounts
    pub fn transfer(&mut self, from: Address, to: Address, amount: u128) -> Result<()> {
        let balance = self.balance_of(from);
        if balance < amount {
            return Err(Error::InsufficientBalance {
                required: Self::balance_from(amount, INDEX_ONE),
                available: Self::balance_from(balance, INDEX_ONE),
            });
        }
        if amount == 0 || from == to {
            return Ok(());
        }
        if balance == amount {
            self.balances.remove(&from);
        } else {
            self.balances.insert(from, balance - amount);
        }
        *self.balances.entry(to).or_insert(0) += amount;
        Ok(())
    }

    /// Transfer on behalf of `from`, spending `spender`'s allowance
    pub fn transfer_from(&mut self, spender: Address, from: Address, to: Address, amount: u128) -> Result<()> {
        let allowed = self.allowance(from, spender);
        if allowed < amount {
            return Err(Error::InsufficientAllowance {
                required: Self::balance_from(amount, INDEX_ONE),
                allowed: Self::balance_from(allowed, INDEX_ONE),
            });
        }
        self.allowances.insert((from, spender), allowed - amount);
        self.transfer(from, to, amount)
    }

    /// Remaining allowance from `owner` to `spender`
    pub fn allowance(&self, owner: Address, spender: Address) -> u128 {
        self.allowances.get(&(owner, spender)).copied().unwrap_or(0)
    }

    /// Set the allowance from `owner` to `spender`
    pub fn approve(&mut self, owner: Address, spender: Address, amount: u128) {
        self.allowances.insert((owner, spender), amount);
    }
}
