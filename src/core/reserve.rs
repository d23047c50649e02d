//! Reserve-token ledgers.
//!
//! A reserve token is an 18-decimal asset the treasury accepts as backing
//! for base-asset minting. Amounts are `u128`; their base-asset value is
//! the amount aligned down to 9 decimals.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::utils::address::Address;
use crate::utils::constants::{RESERVE_DECIMALS, RESERVE_TO_BASE};

/// Convert an 18-decimal reserve amount to its 9-decimal base value
pub fn base_value(amount: u128) -> u64 {
    (amount / RESERVE_TO_BASE) as u64
}

/// An 18-decimal fungible ledger used as treasury collateral
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReserveToken {
    /// Token name
    pub name: String,
    /// Token symbol
    pub symbol: String,
    /// Decimal places
    pub decimals: u8,
    address: Address,
    total_supply: u128,
    balances: HashMap<Address, u128>,
    allowances: HashMap<(Address, Address), u128>,
}

impl ReserveToken {
    /// Create a reserve-token ledger
    pub fn new(address: Address, name: &str, symbol: &str) -> Result<Self> {
        if address.is_zero() {
            return Err(Error::ZeroAddress("reserve token".into()));
        }
        Ok(Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals: RESERVE_DECIMALS,
            address,
            total_supply: 0,
            balances: HashMap::new(),
            allowances: HashMap::new(),
        })
    }

    /// The token's address
    pub fn address(&self) -> Address {
        self.address
    }

    /// Total supply
    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    /// Balance of an account
    pub fn balance_of(&self, owner: Address) -> u128 {
        self.balances.get(&owner).copied().unwrap_or(0)
    }

    /// Remaining allowance from `owner` to `spender`
    pub fn allowance(&self, owner: Address, spender: Address) -> u128 {
        self.allowances.get(&(owner, spender)).copied().unwrap_or(0)
    }

    /// Mint supply to an account. Reserve tokens are external assets, so
    /// minting is unrestricted here; fixtures use it to fund depositors.
    pub fn mint(&mut self, to: Address, amount: u128) {
        self.total_supply += amount;
        *self.balances.entry(to).or_insert(0) += amount;
    }

    /// Move `amount` from `from` to `to`
    pub fn transfer(&mut self, from: Address, to: Address, amount: u128) -> Result<()> {
        let balance = self.balance_of(from);
        if balance < amount {
            return Err(Error::InsufficientBalance {
                required: base_value(amount),
                available: base_value(balance),
            });
        }
        if amount == 0 || from == to {
            return Ok(());
        }
        self.balances.insert(from, balance - amount);
        *self.balances.entry(to).or_insert(0) += amount;
        Ok(())
    }

    /// Transfer on behalf of `from`, spending `spender`'s allowance
    pub fn transfer_from(&mut self, spender: Address, from: Address, to: Address, amount: u128) -> Result<()> {
        let allowed = self.allowance(from, spender);
        if allowed < amount {
            return Err(Error::InsufficientAllowance {
                required: base_value(amount),
                allowed: base_value(allowed),
            });
        }
        self.allowances.insert((from, spender), allowed - amount);
        self.transfer(from, to, amount)
    }

    /// Set the allowance from `owner` to `spender`
    pub fn approve(&mut self, owner: Address, spender: Address, amount: u128) {
        self.allowances.insert((owner, spender), amount);
    }
}
