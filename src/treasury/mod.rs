//! The treasury: reserve bookkeeping, permissioning, and debt.
//!
//! The treasury tracks value in base-token terms. Deposited reserves back
//! the base supply one-for-one; anything above that backing is "excess"
//! and available for reward minting. Debt lets permitted accounts borrow
//! against their staked balance without moving the collateral.
//!
//! The treasury holds no token ledgers itself. It answers permission and
//! solvency questions and keeps the books; the orchestrator moves tokens.

pub mod permissions;

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::info;

use crate::error::{Error, Result};
use crate::utils::address::Address;

pub use permissions::{Permission, TimelockOrder};

/// Reserve and debt accounting plus the permission registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Treasury {
    address: Address,
    permissions: HashSet<(Permission, Address)>,
    orders: Vec<TimelockOrder>,
    timelock_blocks: u64,
    timelock_enabled: bool,
    debt_limits: HashMap<Address, u64>,
    debts: HashMap<Address, u64>,
    total_reserves: u64,
    total_debt: u64,
}

impl Treasury {
    /// Create the treasury. `timelock_blocks` is the delay queued
    /// permission changes must wait once the timelock is activated.
    pub fn new(address: Address, timelock_blocks: u64) -> Result<Self> {
        if address.is_zero() {
            return Err(Error::ZeroAddress("treasury".into()));
        }
        Ok(Self {
            address,
            permissions: HashSet::new(),
            orders: Vec::new(),
            timelock_blocks,
            timelock_enabled: false,
            debt_limits: HashMap::new(),
            debts: HashMap::new(),
            total_reserves: 0,
            total_debt: 0,
        })
    }

    /// The treasury's ledger address
    pub fn address(&self) -> Address {
        self.address
    }

    // ═══════════════════════════════════════════════════════════════════════
    // PERMISSIONS
    // ═══════════════════════════════════════════════════════════════════════

    /// Whether an address holds a permission category
    pub fn permitted(&self, permission: Permission, addr: Address) -> bool {
        self.permissions.contains(&(permission, addr))
    }

    fn require_permission(&self, permission: Permission, addr: Address) -> Result<()> {
        if !self.permitted(permission, addr) {
            return Err(Error::NotApproved(permission.name().to_string()));
        }
        Ok(())
    }

    /// Grant a permission directly. Fails once the timelock is active;
    /// changes must then go through the queue.
    pub fn enable(&mut self, permission: Permission, addr: Address) -> Result<()> {
        if self.timelock_enabled {
            return Err(Error::TimelockActive);
        }
        if addr.is_zero() {
            return Err(Error::ZeroAddress("permission target".into()));
        }
        self.permissions.insert((permission, addr));
        Ok(())
    }

    /// Revoke a permission. Always immediate.
    pub fn disable(&mut self, permission: Permission, addr: Address) {
        self.permissions.remove(&(permission, addr));
    }

    /// Switch permission changes to the timelocked queue. One-way.
    pub fn activate_timelock(&mut self) {
        self.timelock_enabled = true;
        info!("treasury timelock activated, delay {} blocks", self.timelock_blocks);
    }

    /// Whether grants must go through the queue
    pub fn timelock_enabled(&self) -> bool {
        self.timelock_enabled
    }

    /// Queue a permission grant. Returns the order's index.
    pub fn queue_timelock(&mut self, permission: Permission, addr: Address, current_block: u64) -> Result<usize> {
        if addr.is_zero() {
            return Err(Error::ZeroAddress("permission target".into()));
        }
        self.orders.push(TimelockOrder {
            permission,
            target: addr,
            timelock_end: current_block + self.timelock_blocks,
            nullified: false,
            executed: false,
        });
        Ok(self.orders.len() - 1)
    }

    /// Execute a matured order, granting its permission
    pub fn execute_order(&mut self, index: usize, current_block: u64) -> Result<(Permission, Address)> {
        let order = *self.orders.get(index).ok_or(Error::OrderNotFound(index))?;
        order.check_executable(current_block)?;
        self.permissions.insert((order.permission, order.target));
        self.orders[index].executed = true;
        Ok((order.permission, order.target))
    }

    /// Cancel a queued order before it executes
    pub fn nullify_order(&mut self, index: usize) -> Result<(Permission, Address)> {
        let order = self.orders.get_mut(index).ok_or(Error::OrderNotFound(index))?;
        if order.executed {
            return Err(Error::OrderNotExecutable("order already executed".into()));
        }
        order.nullified = true;
        Ok((order.permission, order.target))
    }

    /// Queued permission changes, executed and pending alike
    pub fn orders(&self) -> &[TimelockOrder] {
        &self.orders
    }

    // ═══════════════════════════════════════════════════════════════════════
    // RESERVES
    // ═══════════════════════════════════════════════════════════════════════

    /// Book a deposit: checks the depositor and token categories, credits
    /// `value` of reserves, and returns the base amount to mint
    /// (`value − profit`; profit stays as unbacked excess).
    pub fn book_deposit(&mut self, caller: Address, token: Address, value: u64, profit: u64) -> Result<u64> {
        if self.permitted(Permission::ReserveToken, token) {
            self.require_permission(Permission::ReserveDepositor, caller)?;
        } else if self.permitted(Permission::LiquidityToken, token) {
            self.require_permission(Permission::LiquidityDepositor, caller)?;
        } else {
            return Err(Error::TokenNotAccepted(token.to_hex()));
        }
        let mint = value.checked_sub(profit).ok_or(Error::InvalidParameter {
            name: "profit".into(),
            reason: "exceeds deposit value".into(),
        })?;
        self.total_reserves += value;
        info!(value, profit, "treasury deposit booked");
        Ok(mint)
    }

    /// Reserves above what the current base supply needs as backing
    pub fn excess_reserves(&self, base_supply: u64) -> u64 {
        let backed = base_supply.saturating_sub(self.total_debt);
        self.total_reserves.saturating_sub(backed)
    }

    /// Check a reward-manager mint against excess reserves
    pub fn check_mint(&self, caller: Address, amount: u64, base_supply: u64) -> Result<()> {
        self.require_permission(Permission::RewardManager, caller)?;
        let excess = self.excess_reserves(base_supply);
        if amount > excess {
            return Err(Error::InsufficientReserves { requested: amount, excess });
        }
        Ok(())
    }

    /// Total booked reserves, in base-token value
    pub fn total_reserves(&self) -> u64 {
        self.total_reserves
    }

    /// Remove value from the books when reserves leave the treasury
    pub fn withdraw_reserves(&mut self, value: u64) -> Result<()> {
        self.total_reserves = self.total_reserves.checked_sub(value).ok_or(Error::InsufficientReserves {
            requested: value,
            excess: self.total_reserves,
        })?;
        Ok(())
    }

    /// Add value to the books when reserves come back
    pub fn restore_reserves(&mut self, value: u64) {
        self.total_reserves += value;
    }

    // ═══════════════════════════════════════════════════════════════════════
    // DEBT
    // ═══════════════════════════════════════════════════════════════════════

    /// Check that the borrower holds the right debtor category for what
    /// they are borrowing
    pub fn check_debtor(&self, caller: Address, borrowing_base: bool) -> Result<()> {
        if borrowing_base {
            self.require_permission(Permission::BaseDebtor, caller)
        } else {
            self.require_permission(Permission::ReserveDebtor, caller)
        }
    }

    /// Check a new borrow against the account's debt limit. The
    /// collateral-balance check lives in the rebasing ledger.
    pub fn check_debt_limit(&self, account: Address, additional: u64) -> Result<()> {
        let limit = self.debt_limits.get(&account).copied().unwrap_or(0);
        let requested = self.debt_of(account) + additional;
        if requested > limit {
            return Err(Error::DebtLimitExceeded { requested, limit });
        }
        Ok(())
    }

    /// Record a borrow or a repayment against an account
    pub fn record_debt(&mut self, account: Address, value: u64, add: bool) -> Result<()> {
        let debt = self.debt_of(account);
        if add {
            self.debts.insert(account, debt + value);
            self.total_debt += value;
        } else {
            let remaining = debt.checked_sub(value).ok_or(Error::RepayExceedsDebt {
                requested: value,
                debt,
            })?;
            if remaining == 0 {
                self.debts.remove(&account);
            } else {
                self.debts.insert(account, remaining);
            }
            self.total_debt -= value;
        }
        Ok(())
    }

    /// Outstanding debt of an account, in base-token value
    pub fn debt_of(&self, account: Address) -> u64 {
        self.debts.get(&account).copied().unwrap_or(0)
    }

    /// Outstanding debt across all accounts
    pub fn total_debt(&self) -> u64 {
        self.total_debt
    }

    /// Set the maximum debt an account may carry
    pub fn set_debt_limit(&mut self, account: Address, limit: u64) {
        if limit == 0 {
            self.debt_limits.remove(&account);
        } else {
            self.debt_limits.insert(account, limit);
        }
    }

    /// Debt limit of an account
    pub fn debt_limit_of(&self, account: Address) -> u64 {
        self.debt_limits.get(&account).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::constants::BASE_UNIT;

    fn treasury() -> Treasury {
        Treasury::new(Address::from_label("treasury"), 10).unwrap()
    }

    #[test]
    fn test_deposit_requires_categories() {
        let mut t = treasury();
        let depositor = Address::from_label("depositor");
        let dai = Address::from_label("dai");

        // unknown token
        assert!(matches!(
            t.book_deposit(depositor, dai, 100, 0),
            Err(Error::TokenNotAccepted(_))
        ));

        t.enable(Permission::ReserveToken, dai).unwrap();
        // token known, caller not a depositor
        assert!(matches!(
            t.book_deposit(depositor, dai, 100, 0),
            Err(Error::NotApproved(_))
        ));

        t.enable(Permission::ReserveDepositor, depositor).unwrap();
        let mint = t.book_deposit(depositor, dai, 10_000 * BASE_UNIT, 9_000 * BASE_UNIT).unwrap();
        assert_eq!(mint, 1_000 * BASE_UNIT);
        assert_eq!(t.total_reserves(), 10_000 * BASE_UNIT);
    }

    #[test]
    fn test_profit_cannot_exceed_value() {
        let mut t = treasury();
        let depositor = Address::from_label("depositor");
        let dai = Address::from_label("dai");
        t.enable(Permission::ReserveToken, dai).unwrap();
        t.enable(Permission::ReserveDepositor, depositor).unwrap();
        assert!(t.book_deposit(depositor, dai, 100, 101).is_err());
    }

    #[test]
    fn test_mint_capped_by_excess_reserves() {
        let mut t = treasury();
        let manager = Address::from_label("manager");
        t.enable(Permission::RewardManager, manager).unwrap();
        t.restore_reserves(10_000 * BASE_UNIT);

        // 1000 already minted against these reserves
        let supply = 1_000 * BASE_UNIT;
        assert_eq!(t.excess_reserves(supply), 9_000 * BASE_UNIT);
        assert!(t.check_mint(manager, 9_000 * BASE_UNIT, supply).is_ok());
        assert!(matches!(
            t.check_mint(manager, 9_000 * BASE_UNIT + 1, supply),
            Err(Error::InsufficientReserves { .. })
        ));
    }

    #[test]
    fn test_timelock_queue_lifecycle() {
        let mut t = treasury();
        let addr = Address::from_label("new-depositor");

        t.activate_timelock();
        assert_eq!(
            t.enable(Permission::ReserveDepositor, addr),
            Err(Error::TimelockActive)
        );

        let idx = t.queue_timelock(Permission::ReserveDepositor, addr, 100).unwrap();
        assert!(matches!(
            t.execute_order(idx, 105),
            Err(Error::TimelockNotExpired { .. })
        ));
        t.execute_order(idx, 110).unwrap();
        assert!(t.permitted(Permission::ReserveDepositor, addr));

        // executed orders can be neither rerun nor nullified
        assert!(t.execute_order(idx, 120).is_err());
        assert!(t.nullify_order(idx).is_err());
    }

    #[test]
    fn test_nullified_order_never_executes() {
        let mut t = treasury();
        let addr = Address::from_label("new-depositor");
        let idx = t.queue_timelock(Permission::ReserveSpender, addr, 0).unwrap();
        t.nullify_order(idx).unwrap();
        assert!(t.execute_order(idx, 1_000).is_err());
        assert!(!t.permitted(Permission::ReserveSpender, addr));
    }

    #[test]
    fn test_debt_bookkeeping() {
        let mut t = treasury();
        let debtor = Address::from_label("debtor");

        assert!(matches!(
            t.check_debt_limit(debtor, 1),
            Err(Error::DebtLimitExceeded { .. })
        ));

        t.set_debt_limit(debtor, 10 * BASE_UNIT);
        assert!(t.check_debt_limit(debtor, 10 * BASE_UNIT).is_ok());
        assert!(t.check_debt_limit(debtor, 10 * BASE_UNIT + 1).is_err());

        t.record_debt(debtor, 4 * BASE_UNIT, true).unwrap();
        assert_eq!(t.debt_of(debtor), 4 * BASE_UNIT);
        assert_eq!(t.total_debt(), 4 * BASE_UNIT);

        assert!(t.record_debt(debtor, 5 * BASE_UNIT, false).is_err());
        t.record_debt(debtor, 4 * BASE_UNIT, false).unwrap();
        assert_eq!(t.debt_of(debtor), 0);
        assert_eq!(t.total_debt(), 0);
    }
}
