//! Protocol constants and magic numbers.
//!
//! All protocol-wide constants are defined here for easy auditing and modification.

// ═══════════════════════════════════════════════════════════════════════════════
// BASE ASSET CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Decimals of the base asset and the rebasing ledger's displayed balance
pub const BASE_DECIMALS: u8 = 9;

/// One whole base-asset unit (10^9)
pub const BASE_UNIT: u64 = 1_000_000_000;

// ═══════════════════════════════════════════════════════════════════════════════
// RESERVE TOKEN CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Decimals of reserve tokens accepted by the treasury
pub const RESERVE_DECIMALS: u8 = 18;

/// Factor aligning an 18-decimal reserve amount to its 9-decimal base value
pub const RESERVE_TO_BASE: u128 = 1_000_000_000;

// ═══════════════════════════════════════════════════════════════════════════════
// REBASE INDEX CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Fixed-point unit of the rebase index (an index of exactly 1.0)
pub const INDEX_ONE: u128 = 1_000_000_000;

/// Internal units (gons) credited to the staking engine at genesis.
/// Constant for the life of the ledger.
pub const TOTAL_GONS: u128 = 5_000_000_000_000_000;

// ═══════════════════════════════════════════════════════════════════════════════
// DISTRIBUTOR CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Denominator for distributor reward rates (1_000 = 0.1%)
pub const RATE_DENOMINATOR: u64 = 1_000_000;

/// Upper bound for the rebase caller bounty (2 FISC)
pub const MAX_BOUNTY: u64 = 2 * BASE_UNIT;

// ═══════════════════════════════════════════════════════════════════════════════
// IDENTITY CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Address length in bytes
pub const ADDRESS_LENGTH: usize = 20;
