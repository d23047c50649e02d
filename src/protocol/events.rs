//! Protocol events: the record of every state change, appended by the
//! orchestrator and drained by whoever observes it (tests, indexers).

use serde::{Deserialize, Serialize};

use crate::governance::Role;
use crate::treasury::Permission;
use crate::utils::address::Address;

/// Everything the protocol announces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ProtocolEvent {
    /// Ledgers wired and genesis supply issued
    Initialized { staking: Address, treasury: Address },
    /// Genesis index set on the rebasing ledger
    IndexSet { index: u128 },
    /// Wrapped token wired to the rebasing ledger
    WrappedTokenSet { wrapped: Address },
    /// A governance role changed hands
    RolePushed { role: Role, from: Address, to: Address },
    /// Reward distributor installed or replaced
    DistributorSet { distributor: Address },
    /// Warmup horizon changed
    WarmupSet { period: u64 },
    /// Base tokens staked
    Staked { caller: Address, to: Address, amount: u64, rebasing: bool },
    /// Warmup claim paid out
    Claimed { to: Address, amount: u64, rebasing: bool },
    /// Warmup deposit cancelled and principal refunded
    Forfeited { account: Address, deposit: u64 },
    /// Staked tokens redeemed for base tokens
    Unstaked { caller: Address, to: Address, amount: u64, paid: u64 },
    /// Rebasing balance converted to wrapped
    Wrapped { caller: Address, to: Address, rebasing: u64, wrapped: u128 },
    /// Wrapped balance converted back to rebasing
    Unwrapped { caller: Address, to: Address, wrapped: u128, rebasing: u64 },
    /// Epoch rolled over and the index grew
    Rebased { epoch: u64, distributed: u64, index: u128 },
    /// Rebase trigger bounty paid
    BountyRetrieved { caller: Address, bounty: u64 },
    /// Reserves deposited and base tokens minted against them
    Deposited { caller: Address, token: Address, amount: u128, value: u64, minted: u64 },
    /// Base tokens minted against excess reserves
    Minted { caller: Address, to: Address, amount: u64 },
    /// Debt drawn against staked collateral
    DebtIncurred { caller: Address, token: Address, value: u64 },
    /// Debt repaid
    DebtRepaid { caller: Address, token: Address, value: u64 },
    /// Debt ceiling changed for an account
    DebtLimitSet { account: Address, limit: u64 },
    /// Permission granted or revoked
    Permissioned { permission: Permission, addr: Address, granted: bool },
    /// Permission grant queued behind the timelock
    PermissionQueued { permission: Permission, addr: Address, index: usize },
    /// Queued grant cancelled
    PermissionNullified { index: usize },
}

impl ProtocolEvent {
    /// Stable event name for filtering and display
    pub fn event_type(&self) -> &'static str {
        match self {
            ProtocolEvent::Initialized { .. } => "Initialized",
            ProtocolEvent::IndexSet { .. } => "IndexSet",
            ProtocolEvent::WrappedTokenSet { .. } => "WrappedTokenSet",
            ProtocolEvent::RolePushed { .. } => "RolePushed",
            ProtocolEvent::DistributorSet { .. } => "DistributorSet",
            ProtocolEvent::WarmupSet { .. } => "WarmupSet",
            ProtocolEvent::Staked { .. } => "Staked",
            ProtocolEvent::Claimed { .. } => "Claimed",
            ProtocolEvent::Forfeited { .. } => "Forfeited",
            ProtocolEvent::Unstaked { .. } => "Unstaked",
            ProtocolEvent::Wrapped { .. } => "Wrapped",
            ProtocolEvent::Unwrapped { .. } => "Unwrapped",
            ProtocolEvent::Rebased { .. } => "Rebased",
            ProtocolEvent::BountyRetrieved { .. } => "BountyRetrieved",
            ProtocolEvent::Deposited { .. } => "Deposited",
            ProtocolEvent::Minted { .. } => "Minted",
            ProtocolEvent::DebtIncurred { .. } => "DebtIncurred",
            ProtocolEvent::DebtRepaid { .. } => "DebtRepaid",
            ProtocolEvent::DebtLimitSet { .. } => "DebtLimitSet",
            ProtocolEvent::Permissioned { .. } => "Permissioned",
            ProtocolEvent::PermissionQueued { .. } => "PermissionQueued",
            ProtocolEvent::PermissionNullified { .. } => "PermissionNullified",
        }
    }
}

/// Append-only event buffer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<ProtocolEvent>,
}

impl EventLog {
    /// Empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event
    pub fn append(&mut self, event: ProtocolEvent) {
        self.events.push(event);
    }

    /// Everything recorded so far
    pub fn all(&self) -> &[ProtocolEvent] {
        &self.events
    }

    /// Drain the log, returning the recorded events
    pub fn take(&mut self) -> Vec<ProtocolEvent> {
        std::mem::take(&mut self.events)
    }

    /// Events of one type, newest last
    pub fn of_type(&self, event_type: &str) -> Vec<&ProtocolEvent> {
        self.events.iter().filter(|e| e.event_type() == event_type).collect()
    }

    /// Render the log as pretty JSON, for inspection and indexers
    pub fn to_json(&self) -> crate::error::Result<String> {
        serde_json::to_string_pretty(&self.events)
            .map_err(|e| crate::error::Error::Serialization(e.to_string()))
    }

    /// Number of recorded events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
