//! Protocol orchestration.
//!
//! `Protocol` owns every component and is the only place tokens actually
//! move. Entry points take the caller's address, run all fallible checks
//! before any mutation, and append events for what happened. The block
//! clock is explicit: nothing happens unless `advance_blocks` is called.

pub mod events;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};

use crate::core::{base_value, BaseToken, ReserveToken, StakedToken, WrappedToken};
use crate::error::{Error, Result};
use crate::governance::{Authority, Role};
use crate::staking::{Distributor, StakingEngine};
use crate::treasury::{Permission, Treasury};
use crate::utils::address::Address;

pub use events::{EventLog, ProtocolEvent};

/// Wiring and genesis parameters for a new deployment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Ledger address of the base token
    pub base_address: Address,
    /// Ledger address of the wrapped token
    pub wrapped_address: Address,
    /// Ledger address of the staking engine
    pub staking_address: Address,
    /// Ledger address of the treasury
    pub treasury_address: Address,
    /// Blocks per epoch
    pub epoch_length: u64,
    /// Number of the first epoch
    pub first_epoch_number: u64,
    /// Block at which the first epoch ends
    pub first_epoch_end: u64,
    /// Genesis rebase index
    pub initial_index: u128,
    /// Delay for queued treasury permission changes
    pub treasury_timelock_blocks: u64,
}

impl ProtocolConfig {
    /// Validate wiring addresses and genesis parameters
    pub fn validate(&self) -> Result<()> {
        for (addr, name) in [
            (self.base_address, "base token"),
            (self.wrapped_address, "wrapped token"),
            (self.staking_address, "staking"),
            (self.treasury_address, "treasury"),
        ] {
            if addr.is_zero() {
                return Err(Error::ZeroAddress(name.into()));
            }
        }
        if self.epoch_length == 0 {
            return Err(Error::InvalidParameter {
                name: "epoch_length".into(),
                reason: "must be non-zero".into(),
            });
        }
        if self.initial_index == 0 {
            return Err(Error::InvalidParameter {
                name: "initial_index".into(),
                reason: "must be non-zero".into(),
            });
        }
        Ok(())
    }
}

/// The assembled protocol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Protocol {
    /// Role registry
    pub authority: Authority,
    /// Base token ledger
    pub fisc: BaseToken,
    /// Rebasing ledger
    pub sfisc: StakedToken,
    /// Index-wrapped ledger
    pub gfisc: WrappedToken,
    /// Warmup accounting and epoch clock
    pub staking: StakingEngine,
    /// Reward policy, once installed
    pub distributor: Option<Distributor>,
    /// Reserve and debt books
    pub treasury: Treasury,
    /// External reserve-token ledgers by address
    pub reserves: HashMap<Address, ReserveToken>,
    block_height: u64,
    /// Everything that happened
    pub events: EventLog,
}

impl Protocol {
    /// Assemble and bootstrap a deployment: the initializer seeds the
    /// rebasing ledger (index, wrapped wiring, genesis supply) in one shot.
    pub fn new(config: ProtocolConfig, authority: Authority, initializer: Address) -> Result<Self> {
        config.validate()?;
        let fisc = BaseToken::new(config.base_address)?;
        let mut sfisc = StakedToken::new(initializer)?;
        let gfisc = WrappedToken::new(config.staking_address)?;
        let staking = StakingEngine::new(
            config.staking_address,
            config.epoch_length,
            config.first_epoch_number,
            config.first_epoch_end,
        )?;
        let treasury = Treasury::new(config.treasury_address, config.treasury_timelock_blocks)?;

        let mut events = EventLog::new();
        sfisc.set_index(initializer, config.initial_index)?;
        events.append(ProtocolEvent::IndexSet { index: config.initial_index });
        sfisc.set_wrapped_token(initializer, config.wrapped_address)?;
        events.append(ProtocolEvent::WrappedTokenSet { wrapped: config.wrapped_address });
        sfisc.initialize(initializer, config.staking_address, config.treasury_address)?;
        events.append(ProtocolEvent::Initialized {
            staking: config.staking_address,
            treasury: config.treasury_address,
        });

        info!(index = config.initial_index, "protocol bootstrapped");
        Ok(Self {
            authority,
            fisc,
            sfisc,
            gfisc,
            staking,
            distributor: None,
            treasury,
            reserves: HashMap::new(),
            block_height: 0,
            events,
        })
    }

    // ═══════════════════════════════════════════════════════════════════════
    // CLOCK AND VIEWS
    // ═══════════════════════════════════════════════════════════════════════

    /// Current block height
    pub fn block_height(&self) -> u64 {
        self.block_height
    }

    /// Move the clock forward
    pub fn advance_blocks(&mut self, n: u64) {
        self.block_height += n;
    }

    /// Current rebase index
    pub fn index(&self) -> u128 {
        self.sfisc.index()
    }

    /// Displayed supply currently waiting in warmup
    pub fn supply_in_warmup(&self) -> u64 {
        self.sfisc.balance_for_gons(self.staking.gons_in_warmup())
    }

    /// Circulating staked supply: everything outside the engine, plus
    /// warmup claims, plus the supply behind outstanding wrapped tokens
    pub fn circulating_supply(&self) -> u64 {
        self.sfisc
            .circulating_supply(self.supply_in_warmup(), self.gfisc.total_supply())
    }

    /// Register an external reserve-token ledger so the protocol can move it
    pub fn add_reserve_token(&mut self, token: ReserveToken) {
        self.reserves.insert(token.address(), token);
    }

    fn reserve(&self, token: Address) -> Result<&ReserveToken> {
        self.reserves.get(&token).ok_or_else(|| Error::TokenNotAccepted(token.to_hex()))
    }

    fn reserve_mut(&mut self, token: Address) -> Result<&mut ReserveToken> {
        self.reserves.get_mut(&token).ok_or_else(|| Error::TokenNotAccepted(token.to_hex()))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // STAKING
    // ═══════════════════════════════════════════════════════════════════════

    /// Stake base tokens for `to`. With `claim` and no warmup the payout is
    /// immediate; otherwise the deposit queues in warmup. Returns the
    /// staked amount.
    pub fn stake(&mut self, caller: Address, to: Address, amount: u64, rebasing: bool, claim: bool) -> Result<u64> {
        let engine = self.staking.address();
        let immediate = claim && self.staking.warmup_period() == 0;
        if !immediate {
            self.staking.check_deposit_lock(caller, to)?;
        }
        self.fisc.transfer_from(engine, caller, engine, amount)?;
        if immediate {
            self.send_staked(to, amount, rebasing)?;
        } else {
            let gons = self.sfisc.gons_for_balance(amount);
            self.staking.record_warmup(to, amount, gons);
        }
        self.events.append(ProtocolEvent::Staked { caller, to, amount, rebasing });
        Ok(amount)
    }

    /// Retrieve `to`'s matured warmup claim. Returns the amount paid;
    /// nothing owed or an unexpired warmup pays zero without erroring.
    pub fn claim(&mut self, caller: Address, to: Address, rebasing: bool) -> Result<u64> {
        self.staking.check_claim_lock(caller, to)?;
        let gons = self.staking.retrieve_claim(to);
        if gons == 0 {
            return Ok(0);
        }
        let amount = self.sfisc.balance_for_gons(gons);
        self.send_staked(to, amount, rebasing)?;
        self.events.append(ProtocolEvent::Claimed { to, amount, rebasing });
        Ok(amount)
    }

    /// Cancel the caller's pending warmup and refund the original deposit.
    /// Rebases earned while waiting stay with the pool.
    pub fn forfeit(&mut self, caller: Address) -> Result<u64> {
        let (deposit, _gons) = self.staking.forfeit(caller);
        self.fisc.transfer(self.staking.address(), caller, deposit)?;
        self.events.append(ProtocolEvent::Forfeited { account: caller, deposit });
        Ok(deposit)
    }

    /// Redeem staked tokens for base tokens. With `trigger`, runs a rebase
    /// first and adds its bounty to the payout. Pays out at most the
    /// engine's base-token balance. Returns the amount paid.
    pub fn unstake(&mut self, caller: Address, to: Address, amount: u64, trigger: bool) -> Result<u64> {
        let engine = self.staking.address();
        let bounty = if trigger { self.rebase(caller)? } else { 0 };
        self.sfisc.transfer_from(engine, caller, engine, amount)?;
        self.pay_unstake(caller, to, amount + bounty)
    }

    /// Redeem wrapped tokens for base tokens, converting through the
    /// current index. Same payout rule as `unstake`.
    pub fn unstake_wrapped(&mut self, caller: Address, to: Address, wrapped: u128, trigger: bool) -> Result<u64> {
        let engine = self.staking.address();
        let bounty = if trigger { self.rebase(caller)? } else { 0 };
        let amount = WrappedToken::balance_from(wrapped, self.sfisc.index());
        self.gfisc.burn(engine, caller, wrapped)?;
        self.pay_unstake(caller, to, amount + bounty)
    }

    fn pay_unstake(&mut self, caller: Address, to: Address, owed: u64) -> Result<u64> {
        let engine = self.staking.address();
        let available = self.fisc.balance_of(engine);
        let paid = owed.min(available);
        if paid < owed {
            warn!(owed, available, "unstake shortfall, paying engine balance");
        }
        self.fisc.transfer(engine, to, paid)?;
        self.events.append(ProtocolEvent::Unstaked { caller, to, amount: owed, paid });
        Ok(paid)
    }

    /// Convert a rebasing balance to wrapped tokens. Returns wrapped units.
    pub fn wrap(&mut self, caller: Address, to: Address, amount: u64) -> Result<u128> {
        let engine = self.staking.address();
        self.sfisc.transfer_from(engine, caller, engine, amount)?;
        let wrapped = WrappedToken::balance_to(amount, self.sfisc.index());
        self.gfisc.mint(engine, to, wrapped)?;
        self.events.append(ProtocolEvent::Wrapped { caller, to, rebasing: amount, wrapped });
        Ok(wrapped)
    }

    /// Convert wrapped tokens back to a rebasing balance. Returns the
    /// rebasing amount.
    pub fn unwrap(&mut self, caller: Address, to: Address, wrapped: u128) -> Result<u64> {
        let engine = self.staking.address();
        self.gfisc.burn(engine, caller, wrapped)?;
        let amount = WrappedToken::balance_from(wrapped, self.sfisc.index());
        self.sfisc.transfer(engine, to, amount)?;
        self.events.append(ProtocolEvent::Unwrapped { caller, to, wrapped, rebasing: amount });
        Ok(amount)
    }

    fn send_staked(&mut self, to: Address, amount: u64, rebasing: bool) -> Result<()> {
        let engine = self.staking.address();
        if rebasing {
            self.sfisc.transfer(engine, to, amount)
        } else {
            let wrapped = WrappedToken::balance_to(amount, self.sfisc.index());
            self.gfisc.mint(engine, to, wrapped)
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // REBASE
    // ═══════════════════════════════════════════════════════════════════════

    /// Turn the epoch over if it has ended: apply the planned reward to
    /// the index, mint the next round of rewards through the distributor,
    /// and plan the following epoch's distribution. Before the epoch end
    /// this is a silent no-op. Returns the trigger bounty minted to the
    /// engine (zero without a distributor).
    pub fn rebase(&mut self, caller: Address) -> Result<u64> {
        if !self.staking.epoch_over(self.block_height) {
            return Ok(0);
        }
        let engine = self.staking.address();
        let treasury = self.treasury.address();
        let profit = self.staking.epoch.distribute;

        // reward plan is computed and solvency-checked before anything moves
        let plan = match (&self.distributor, self.staking.distributor()) {
            (Some(d), Some(addr)) if d.address() == addr => {
                let base_supply = self.fisc.total_supply();
                let rewards = d.plan_rewards(base_supply);
                let bounty = d.bounty();
                let total: u64 = rewards.iter().map(|(_, a)| a).sum::<u64>() + bounty;
                if total > 0 {
                    self.treasury.check_mint(addr, total, base_supply)?;
                    self.authority.require(treasury, Role::Vault)?;
                }
                Some((rewards, bounty))
            }
            _ => None,
        };

        let circulating = self.circulating_supply();
        self.sfisc.rebase(profit, circulating);
        self.staking.advance_epoch();
        self.events.append(ProtocolEvent::Rebased {
            epoch: self.staking.epoch.number,
            distributed: profit,
            index: self.sfisc.index(),
        });

        let mut bounty = 0;
        if let Some((rewards, b)) = plan {
            for (recipient, reward) in rewards {
                self.fisc.mint(treasury, recipient, reward, &self.authority)?;
            }
            if b > 0 {
                self.fisc.mint(treasury, engine, b, &self.authority)?;
                self.events.append(ProtocolEvent::BountyRetrieved { caller, bounty: b });
            }
            bounty = b;
        }

        let staked = self.circulating_supply();
        self.staking.epoch.distribute = self
            .fisc
            .balance_of(engine)
            .saturating_sub(staked)
            .saturating_sub(bounty);

        info!(
            epoch = self.staking.epoch.number,
            distributed = profit,
            next = self.staking.epoch.distribute,
            "rebase"
        );
        Ok(bounty)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // STAKING ADMINISTRATION
    // ═══════════════════════════════════════════════════════════════════════

    /// Install the reward distributor at the given address. Governor only.
    pub fn install_distributor(&mut self, caller: Address, address: Address) -> Result<()> {
        self.authority.require(caller, Role::Governor)?;
        let distributor = Distributor::new(address)?;
        self.staking.set_distributor(address)?;
        self.distributor = Some(distributor);
        self.events.append(ProtocolEvent::DistributorSet { distributor: address });
        Ok(())
    }

    /// Change the warmup horizon for future deposits. Governor only.
    pub fn set_warmup_length(&mut self, caller: Address, period: u64) -> Result<()> {
        self.authority.require(caller, Role::Governor)?;
        self.staking.set_warmup_period(period);
        self.events.append(ProtocolEvent::WarmupSet { period });
        Ok(())
    }

    /// Flip the caller's own external deposit/claim lock
    pub fn toggle_lock(&mut self, caller: Address) -> bool {
        self.staking.toggle_lock(caller)
    }

    /// Register a reward recipient on the distributor. Governor only.
    pub fn add_distributor_recipient(&mut self, caller: Address, recipient: Address, rate: u64) -> Result<()> {
        self.authority.require(caller, Role::Governor)?;
        self.distributor_mut()?.add_recipient(recipient, rate)
    }

    /// Drop a reward recipient. Governor or guardian.
    pub fn remove_distributor_recipient(&mut self, caller: Address, index: usize) -> Result<()> {
        self.authority.require_any(caller, &[Role::Governor, Role::Guardian])?;
        self.distributor_mut()?.remove_recipient(index)
    }

    /// Set the rebase trigger bounty. Governor only.
    pub fn set_bounty(&mut self, caller: Address, amount: u64) -> Result<()> {
        self.authority.require(caller, Role::Governor)?;
        self.distributor_mut()?.set_bounty(amount)
    }

    fn distributor_mut(&mut self) -> Result<&mut Distributor> {
        self.distributor.as_mut().ok_or(Error::InvalidParameter {
            name: "distributor".into(),
            reason: "not installed".into(),
        })
    }

    // ═══════════════════════════════════════════════════════════════════════
    // GOVERNANCE
    // ═══════════════════════════════════════════════════════════════════════

    /// Hand a governance role to a new holder. Governor only.
    pub fn push_role(&mut self, caller: Address, role: Role, new_holder: Address) -> Result<()> {
        let from = self.authority.holder(role);
        self.authority.push_role(caller, role, new_holder)?;
        self.events.append(ProtocolEvent::RolePushed { role, from, to: new_holder });
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // TREASURY
    // ═══════════════════════════════════════════════════════════════════════

    /// Grant a treasury permission directly. Governor only; fails once the
    /// timelock is active.
    pub fn enable_permission(&mut self, caller: Address, permission: Permission, addr: Address) -> Result<()> {
        self.authority.require(caller, Role::Governor)?;
        self.treasury.enable(permission, addr)?;
        self.events.append(ProtocolEvent::Permissioned { permission, addr, granted: true });
        Ok(())
    }

    /// Revoke a treasury permission. Governor or guardian.
    pub fn disable_permission(&mut self, caller: Address, permission: Permission, addr: Address) -> Result<()> {
        self.authority.require_any(caller, &[Role::Governor, Role::Guardian])?;
        self.treasury.disable(permission, addr);
        self.events.append(ProtocolEvent::Permissioned { permission, addr, granted: false });
        Ok(())
    }

    /// Queue a permission grant behind the timelock. Governor only.
    /// Returns the order index.
    pub fn queue_permission(&mut self, caller: Address, permission: Permission, addr: Address) -> Result<usize> {
        self.authority.require(caller, Role::Governor)?;
        let index = self.treasury.queue_timelock(permission, addr, self.block_height)?;
        self.events.append(ProtocolEvent::PermissionQueued { permission, addr, index });
        Ok(index)
    }

    /// Execute a matured queued grant. Callable by anyone.
    pub fn execute_permission(&mut self, index: usize) -> Result<()> {
        let (permission, addr) = self.treasury.execute_order(index, self.block_height)?;
        self.events.append(ProtocolEvent::Permissioned { permission, addr, granted: true });
        Ok(())
    }

    /// Cancel a queued grant. Governor only.
    pub fn nullify_permission(&mut self, caller: Address, index: usize) -> Result<()> {
        self.authority.require(caller, Role::Governor)?;
        self.treasury.nullify_order(index)?;
        self.events.append(ProtocolEvent::PermissionNullified { index });
        Ok(())
    }

    /// Switch permission changes to the timelocked queue. Governor only;
    /// one-way.
    pub fn activate_treasury_timelock(&mut self, caller: Address) -> Result<()> {
        self.authority.require(caller, Role::Governor)?;
        self.treasury.activate_timelock();
        Ok(())
    }

    /// Deposit reserve tokens into the treasury. Mints `value − profit`
    /// base tokens to the caller; `profit` stays as unbacked excess.
    /// Returns the minted amount.
    pub fn deposit(&mut self, caller: Address, token: Address, amount: u128, profit: u64) -> Result<u64> {
        let treasury = self.treasury.address();
        {
            let reserve = self.reserve(token)?;
            let allowed = reserve.allowance(caller, treasury);
            if allowed < amount {
                return Err(Error::InsufficientAllowance {
                    required: base_value(amount),
                    allowed: base_value(allowed),
                });
            }
            let balance = reserve.balance_of(caller);
            if balance < amount {
                return Err(Error::InsufficientBalance {
                    required: base_value(amount),
                    available: base_value(balance),
                });
            }
        }
        self.authority.require(treasury, Role::Vault)?;
        let value = base_value(amount);
        let minted = self.treasury.book_deposit(caller, token, value, profit)?;
        self.reserve_mut(token)?.transfer_from(treasury, caller, treasury, amount)?;
        self.fisc.mint(treasury, caller, minted, &self.authority)?;
        self.events.append(ProtocolEvent::Deposited { caller, token, amount, value, minted });
        Ok(minted)
    }

    /// Mint base tokens against excess reserves. Reward manager only.
    pub fn treasury_mint(&mut self, caller: Address, to: Address, amount: u64) -> Result<()> {
        self.treasury.check_mint(caller, amount, self.fisc.total_supply())?;
        self.fisc.mint(self.treasury.address(), to, amount, &self.authority)?;
        self.events.append(ProtocolEvent::Minted { caller, to, amount });
        Ok(())
    }

    /// Borrow base tokens against staked collateral. Base debtor only;
    /// checks the debt limit, then locks collateral on the rebasing ledger.
    pub fn incur_debt_base(&mut self, caller: Address, amount: u64) -> Result<()> {
        let treasury = self.treasury.address();
        self.treasury.check_debtor(caller, true)?;
        self.treasury.check_debt_limit(caller, amount)?;
        self.authority.require(treasury, Role::Vault)?;
        self.sfisc.change_debt(treasury, caller, amount, true)?;
        self.treasury.record_debt(caller, amount, true)?;
        self.fisc.mint(treasury, caller, amount, &self.authority)?;
        self.events.append(ProtocolEvent::DebtIncurred { caller, token: self.fisc.address(), value: amount });
        Ok(())
    }

    /// Borrow reserve tokens against staked collateral. Reserve debtor
    /// only; the token must be an enabled reserve the treasury holds.
    pub fn incur_debt_reserve(&mut self, caller: Address, amount: u128, token: Address) -> Result<()> {
        let treasury = self.treasury.address();
        if !self.treasury.permitted(Permission::ReserveToken, token) {
            return Err(Error::TokenNotAccepted(token.to_hex()));
        }
        self.treasury.check_debtor(caller, false)?;
        let value = base_value(amount);
        self.treasury.check_debt_limit(caller, value)?;
        {
            let reserve = self.reserve(token)?;
            let held = reserve.balance_of(treasury);
            if held < amount {
                return Err(Error::InsufficientReserves {
                    requested: value,
                    excess: base_value(held),
                });
            }
        }
        if self.treasury.total_reserves() < value {
            return Err(Error::InsufficientReserves {
                requested: value,
                excess: self.treasury.total_reserves(),
            });
        }
        self.sfisc.change_debt(treasury, caller, value, true)?;
        self.treasury.record_debt(caller, value, true)?;
        self.treasury.withdraw_reserves(value)?;
        self.reserve_mut(token)?.transfer(treasury, caller, amount)?;
        self.events.append(ProtocolEvent::DebtIncurred { caller, token, value });
        Ok(())
    }

    /// Repay debt with reserve tokens, unlocking collateral
    pub fn repay_debt_with_reserve(&mut self, caller: Address, amount: u128, token: Address) -> Result<()> {
        let treasury = self.treasury.address();
        if !self.treasury.permitted(Permission::ReserveToken, token) {
            return Err(Error::TokenNotAccepted(token.to_hex()));
        }
        self.treasury.check_debtor(caller, false)?;
        let value = base_value(amount);
        {
            let reserve = self.reserve(token)?;
            let allowed = reserve.allowance(caller, treasury);
            if allowed < amount {
                return Err(Error::InsufficientAllowance {
                    required: value,
                    allowed: base_value(allowed),
                });
            }
            let held = reserve.balance_of(caller);
            if held < amount {
                return Err(Error::InsufficientBalance {
                    required: value,
                    available: base_value(held),
                });
            }
        }
        self.sfisc.change_debt(treasury, caller, value, false)?;
        self.treasury.record_debt(caller, value, false)?;
        self.treasury.restore_reserves(value);
        self.reserve_mut(token)?.transfer_from(treasury, caller, treasury, amount)?;
        self.events.append(ProtocolEvent::DebtRepaid { caller, token, value });
        Ok(())
    }

    /// Repay debt by burning base tokens, unlocking collateral
    pub fn repay_debt_with_base(&mut self, caller: Address, amount: u64) -> Result<()> {
        let treasury = self.treasury.address();
        self.treasury.check_debtor(caller, true)?;
        let held = self.fisc.balance_of(caller);
        if held < amount {
            return Err(Error::InsufficientBalance { required: amount, available: held });
        }
        self.sfisc.change_debt(treasury, caller, amount, false)?;
        self.treasury.record_debt(caller, amount, false)?;
        self.fisc.burn_from(caller, caller, amount)?;
        self.events.append(ProtocolEvent::DebtRepaid { caller, token: self.fisc.address(), value: amount });
        Ok(())
    }

    /// Set the maximum debt an account may carry. Governor or policy.
    pub fn set_debt_limit(&mut self, caller: Address, account: Address, limit: u64) -> Result<()> {
        self.authority.require_any(caller, &[Role::Governor, Role::Policy])?;
        self.treasury.set_debt_limit(account, limit);
        self.events.append(ProtocolEvent::DebtLimitSet { account, limit });
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // SERIALIZATION
    // ═══════════════════════════════════════════════════════════════════════

    /// Serialize the full protocol state
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Restore protocol state from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| Error::Deserialization(e.to_string()))
    }
}
