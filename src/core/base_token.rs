//! FISC, the base asset.
//!
//! A plain fungible ledger with one protocol-specific rule: minting is
//! gated by the vault role, which the treasury holds. Everything else is
//! ordinary balance/allowance bookkeeping with no protocol invariant of
//! its own.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::governance::{Authority, Role};
use crate::utils::address::Address;
use crate::utils::constants::BASE_DECIMALS;

/// The base-asset ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseToken {
    /// Token name
    pub name: String,
    /// Token symbol
    pub symbol: String,
    /// Decimal places
    pub decimals: u8,
    address: Address,
    total_supply: u64,
    balances: HashMap<Address, u64>,
    allowances: HashMap<(Address, Address), u64>,
}

impl BaseToken {
    /// Create the ledger. `address` identifies the token when it is passed
    /// as a collateral argument to the treasury.
    pub fn new(address: Address) -> Result<Self> {
        if address.is_zero() {
            return Err(Error::ZeroAddress("base token".into()));
        }
        Ok(Self {
            name: "Fiscus".to_string(),
            symbol: "FISC".to_string(),
            decimals: BASE_DECIMALS,
            address,
            total_supply: 0,
            balances: HashMap::new(),
            allowances: HashMap::new(),
        })
    }

    /// The token's own address
    pub fn address(&self) -> Address {
        self.address
    }

    /// Total minted supply
    pub fn total_supply(&self) -> u64 {
        self.total_supply
    }

    /// Balance of an account
    pub fn balance_of(&self, owner: Address) -> u64 {
        self.balances.get(&owner).copied().unwrap_or(0)
    }

    /// Remaining allowance from `owner` to `spender`
    pub fn allowance(&self, owner: Address, spender: Address) -> u64 {
        self.allowances.get(&(owner, spender)).copied().unwrap_or(0)
    }

    /// Mint new supply. Vault role only.
    pub fn mint(&mut self, caller: Address, to: Address, amount: u64, authority: &Authority) -> Result<()> {
        authority.require(caller, Role::Vault)?;
        if amount == 0 {
            return Ok(());
        }
        let supply = self.total_supply.checked_add(amount).ok_or(Error::Overflow {
            operation: "mint total supply".into(),
        })?;
        let balance = self.balance_of(to).checked_add(amount).ok_or(Error::Overflow {
            operation: "mint balance".into(),
        })?;
        self.total_supply = supply;
        self.balances.insert(to, balance);
        Ok(())
    }

    /// Burn from an account, spending allowance when the caller is not the
    /// account itself.
    pub fn burn_from(&mut self, caller: Address, from: Address, amount: u64) -> Result<()> {
        if caller != from {
            self.spend_allowance(from, caller, amount)?;
        }
        let balance = self.balance_of(from);
        if balance < amount {
            return Err(Error::InsufficientBalance { required: amount, available: balance });
        }
        self.set_balance(from, balance - amount);
        self.total_supply -= amount;
        Ok(())
    }

    /// Move `amount` from `from` to `to`. Zero amounts succeed with no effect.
    pub fn transfer(&mut self, from: Address, to: Address, amount: u64) -> Result<()> {
        let balance = self.balance_of(from);
        if balance < amount {
            return Err(Error::InsufficientBalance { required: amount, available: balance });
        }
        if amount == 0 || from == to {
            return Ok(());
        }
        self.set_balance(from, balance - amount);
        let to_balance = self.balance_of(to).checked_add(amount).ok_or(Error::Overflow {
            operation: "transfer balance".into(),
        })?;
        self.balances.insert(to, to_balance);
        Ok(())
    }

    /// Transfer on behalf of `from`, spending `spender`'s allowance
    pub fn transfer_from(&mut self, spender: Address, from: Address, to: Address, amount: u64) -> Result<()> {
        self.spend_allowance(from, spender, amount)?;
        self.transfer(from, to, amount)
    }

    /// Set the allowance from `owner` to `spender`
    pub fn approve(&mut self, owner: Address, spender: Address, amount: u64) {
        self.allowances.insert((owner, spender), amount);
    }

    fn spend_allowance(&mut self, owner: Address, spender: Address, amount: u64) -> Result<()> {
        let allowed = self.allowance(owner, spender);
        if allowed < amount {
            return Err(Error::InsufficientAllowance { required: amount, allowed });
        }
        self.allowances.insert((owner, spender), allowed - amount);
        Ok(())
    }

    fn set_balance(&mut self, owner: Address, value: u64) {
        if value == 0 {
            self.balances.remove(&owner);
        } else {
            self.balances.insert(owner, value);
        }
    }
}
