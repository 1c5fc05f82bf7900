//! Protocol constants
//!
//! Fixed-point units, weight schedule and capacity limits shared by the
//! AMM math and the account state.

/// 1.0 in 18-decimal fixed point
pub const WAD: u128 = 1_000_000_000_000_000_000;

/// Basis points denominator (10000 = 100%)
pub const BPS: u128 = 10_000;

/// Position-token weight at pool creation, in basis points
pub const START_WEIGHT: u128 = 9_091;

/// Seconds after which the token weight has halved
pub const DECAY_TIMESCALE: u128 = 86_400;

/// Liquidation price = initial price / LIQUIDATION_DIVISOR
pub const LIQUIDATION_DIVISOR: u128 = 10;

/// Id of the round opened by `initialize`
pub const FIRST_ROUND_ID: u64 = 1;

/// Must match `#[max_len]` on `Round::pools`. Settlement passes two
/// accounts per pool, so this is bounded by a transaction's account list.
pub const MAX_POOLS_PER_ROUND: usize = 12;

pub const MAX_NAME_LENGTH: usize = 32;
pub const MAX_SYMBOL_LENGTH: usize = 10;
pub const MAX_URI_LENGTH: usize = 200;

/// Upper bound on the swap fee an admin may configure (10%)
pub const MAX_FEE_BPS: u16 = 1_000;

pub const DEFAULT_FEE_BPS: u16 = 30;
pub const DEFAULT_BASE_PRICE: u128 = 1_000_000_000_000_000; // 0.001 funding per reward token
pub const DEFAULT_SLOPE: u128 = 1_000_000_000_000;
pub const DEFAULT_MIN_FUNDING: u64 = 1_000_000; // 1 token with 6 decimals
pub const DEFAULT_MAX_FUNDING: u64 = 1_000_000_000_000;
pub const DEFAULT_MIN_DURATION: i64 = 3_600;
pub const DEFAULT_MAX_DURATION: i64 = 30 * 86_400;
