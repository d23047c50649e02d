//! Error types for the fiscus protocol.
//!
//! One enum covers every failure the core can surface. Conditions the
//! protocol treats as silent no-ops (claiming before warmup expiry,
//! rebasing before the epoch end) are deliberately NOT represented here:
//! they succeed with zero effect.

use thiserror::Error;

/// Result type alias for fiscus operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the fiscus protocol
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // ═══════════════════════════════════════════════════════════════════
    // Construction Errors
    // ═══════════════════════════════════════════════════════════════════

    /// A required wiring address was zero
    #[error("zero address for {0}")]
    ZeroAddress(String),

    // ═══════════════════════════════════════════════════════════════════
    // Authorization Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Caller does not hold the required role
    #[error("unauthorized: requires {required}")]
    Unauthorized {
        /// The role or capability the caller lacks
        required: String,
    },

    /// Only the designated initializer may call this
    #[error("caller is not the initializer")]
    NotInitializer,

    /// Caller is not enabled for the required treasury permission
    #[error("not approved for {0}")]
    NotApproved(String),

    /// The token is not accepted by the treasury
    #[error("token not accepted: {0}")]
    TokenNotAccepted(String),

    // ═══════════════════════════════════════════════════════════════════
    // Lock Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Account has locked external deposits to itself
    #[error("external deposits for account are locked")]
    ExternalDepositsLocked,

    /// Account has locked external claims to itself
    #[error("external claims for account are locked")]
    ExternalClaimsLocked,

    // ═══════════════════════════════════════════════════════════════════
    // Limit / Balance Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Requested debt exceeds the account's debt limit
    #[error("debt exceeds limit: requested {requested}, limit {limit}")]
    DebtLimitExceeded {
        /// Total debt after the request
        requested: u64,
        /// Configured limit
        limit: u64,
    },

    /// Balance too small for the requested operation
    #[error("insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        /// Required amount
        required: u64,
        /// Available amount
        available: u64,
    },

    /// Allowance too small for the requested transfer
    #[error("insufficient allowance: required {required}, allowed {allowed}")]
    InsufficientAllowance {
        /// Required amount
        required: u64,
        /// Approved amount
        allowed: u64,
    },

    /// Treasury mint exceeds excess reserves
    #[error("insufficient reserves: requested {requested}, excess {excess}")]
    InsufficientReserves {
        /// Amount requested
        requested: u64,
        /// Excess reserves available
        excess: u64,
    },

    /// Repayment exceeds the account's outstanding debt
    #[error("repayment exceeds debt: requested {requested}, debt {debt}")]
    RepayExceedsDebt {
        /// Amount offered
        requested: u64,
        /// Outstanding debt
        debt: u64,
    },

    // ═══════════════════════════════════════════════════════════════════
    // State Errors
    // ═══════════════════════════════════════════════════════════════════

    /// The ledger has already been initialized
    #[error("already initialized")]
    AlreadyInitialized,

    /// The index can only be set once
    #[error("index already set")]
    IndexAlreadySet,

    /// Permission changes must go through the timelock queue
    #[error("timelock active: queue the change instead")]
    TimelockActive,

    /// The queued order's timelock has not expired yet
    #[error("timelock not expired: current {current}, ready at {eta}")]
    TimelockNotExpired {
        /// Current block height
        current: u64,
        /// Block at which the order becomes executable
        eta: u64,
    },

    /// The queued order was nullified or already executed
    #[error("order is not executable: {0}")]
    OrderNotExecutable(String),

    /// No order exists at the given queue index
    #[error("no queued order at index {0}")]
    OrderNotFound(usize),

    // ═══════════════════════════════════════════════════════════════════
    // Validation Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Invalid input parameter
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Arithmetic overflow
    #[error("arithmetic overflow in {operation}")]
    Overflow {
        /// Operation that overflowed
        operation: String,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Serialization Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Serialization failed
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization failed
    #[error("deserialization error: {0}")]
    Deserialization(String),
}

impl Error {
    /// Returns the stable error code for external systems
    pub fn code(&self) -> u32 {
        match self {
            // Construction errors: 1xxx
            Error::ZeroAddress(_) => 1001,

            // Authorization errors: 2xxx
            Error::Unauthorized { .. } => 2001,
            Error::NotInitializer => 2002,
            Error::NotApproved(_) => 2003,
            Error::TokenNotAccepted(_) => 2004,

            // Lock errors: 3xxx
            Error::ExternalDepositsLocked => 3001,
            Error::ExternalClaimsLocked => 3002,

            // Limit / balance errors: 4xxx
            Error::DebtLimitExceeded { .. } => 4001,
            Error::InsufficientBalance { .. } => 4002,
            Error::InsufficientAllowance { .. } => 4003,
            Error::InsufficientReserves { .. } => 4004,
            Error::RepayExceedsDebt { .. } => 4005,

            // State errors: 5xxx
            Error::AlreadyInitialized => 5001,
            Error::IndexAlreadySet => 5002,
            Error::TimelockActive => 5003,
            Error::TimelockNotExpired { .. } => 5004,
            Error::OrderNotExecutable(_) => 5005,
            Error::OrderNotFound(_) => 5006,

            // Validation errors: 6xxx
            Error::InvalidParameter { .. } => 6001,
            Error::Overflow { .. } => 6002,

            // Serialization errors: 7xxx
            Error::Serialization(_) => 7001,
            Error::Deserialization(_) => 7002,
        }
    }

    /// Returns true if this failure is a role/permission problem
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Error::Unauthorized { .. }
                | Error::NotInitializer
                | Error::NotApproved(_)
                | Error::TokenNotAccepted(_)
        )
    }
}
