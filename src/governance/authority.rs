//! Role registry consulted by every privileged operation.
//!
//! Components never embed role logic: they receive an [`Authority`]
//! reference and ask "does this caller hold that role". Role holders are
//! reassigned by the governor, effective immediately.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::utils::address::Address;

// ═══════════════════════════════════════════════════════════════════════════════
// ROLES
// ═══════════════════════════════════════════════════════════════════════════════

/// Privileged roles recognized across the protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Controls setters, permissions, and role reassignment
    Governor,
    /// Can disable treasury permissions alongside the governor
    Guardian,
    /// Can tune policy parameters such as debt limits
    Policy,
    /// Authorized to mint the base asset (held by the treasury)
    Vault,
}

impl Role {
    /// Human-readable role name for error messages
    pub fn name(&self) -> &'static str {
        match self {
            Role::Governor => "governor",
            Role::Guardian => "guardian",
            Role::Policy => "policy",
            Role::Vault => "vault",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// AUTHORITY
// ═══════════════════════════════════════════════════════════════════════════════

/// The capability registry: one holder per role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authority {
    governor: Address,
    guardian: Address,
    policy: Address,
    vault: Address,
}

impl Authority {
    /// Create a registry with the four role holders. All addresses must be
    /// non-zero.
    pub fn new(governor: Address, guardian: Address, policy: Address, vault: Address) -> Result<Self> {
        for (addr, name) in [
            (governor, "governor"),
            (guardian, "guardian"),
            (policy, "policy"),
            (vault, "vault"),
        ] {
            if addr.is_zero() {
                return Err(Error::ZeroAddress(name.into()));
            }
        }
        Ok(Self { governor, guardian, policy, vault })
    }

    /// Check whether `who` holds `role`
    pub fn has_role(&self, who: Address, role: Role) -> bool {
        self.holder(role) == who
    }

    /// Require that `who` holds `role`, erroring otherwise
    pub fn require(&self, who: Address, role: Role) -> Result<()> {
        if self.has_role(who, role) {
            Ok(())
        } else {
            Err(Error::Unauthorized { required: role.name().into() })
        }
    }

    /// Require that `who` holds at least one of the given roles
    pub fn require_any(&self, who: Address, roles: &[Role]) -> Result<()> {
        if roles.iter().any(|r| self.has_role(who, *r)) {
            Ok(())
        } else {
            let names: Vec<&str> = roles.iter().map(|r| r.name()).collect();
            Err(Error::Unauthorized { required: names.join(" or ") })
        }
    }

    /// Reassign a role. Governor only; effective immediately.
    pub fn push_role(&mut self, caller: Address, role: Role, new_holder: Address) -> Result<()> {
        self.require(caller, Role::Governor)?;
        if new_holder.is_zero() {
            return Err(Error::ZeroAddress(role.name().into()));
        }
        match role {
            Role::Governor => self.governor = new_holder,
            Role::Guardian => self.guardian = new_holder,
            Role::Policy => self.policy = new_holder,
            Role::Vault => self.vault = new_holder,
        }
        Ok(())
    }

    /// Current holder of a role
    pub fn holder(&self, role: Role) -> Address {
        match role {
            Role::Governor => self.governor,
            Role::Guardian => self.guardian,
            Role::Policy => self.policy,
            Role::Vault => self.vault,
        }
    }
}
