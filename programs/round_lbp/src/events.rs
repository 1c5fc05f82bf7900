//! Program events
//!
//! Together these are enough to rebuild pool reserves, ledger balances and
//! round state off-chain.

use anchor_lang::prelude::*;

#[event]
pub struct ConfigUpdated {
    pub admin: Pubkey,
    pub fee_bps: u16,
    pub base_price: u128,
    pub slope: u128,
    pub min_funding: u64,
    pub max_funding: u64,
    pub min_duration: i64,
    pub max_duration: i64,
}

#[event]
pub struct PauseChanged {
    pub admin: Pubkey,
    pub paused: bool,
}

#[event]
pub struct RoundStarted {
    pub round_id: u64,
    pub reward_curve: Pubkey,
    pub start_time: i64,
    pub end_time: i64,
}

#[event]
pub struct RoundSettled {
    pub round_id: u64,
    pub winner: Option<Pubkey>,
    pub bonus: u128,
    pub pools_liquidated: u8,
    pub settled_at: i64,
}

#[event]
pub struct PoolCreated {
    pub round_id: u64,
    pub pool: Pubkey,
    pub pool_id: u64,
    pub creator: Pubkey,
    pub position_token: Pubkey,
    pub token_supply: u128,
    pub funding: u64,
    pub initial_price: u128,
    pub liquidation_price: u128,
    pub timestamp: i64,
}

#[event]
pub struct PoolLiquidated {
    pub round_id: u64,
    pub pool: Pubkey,
    /// Funding moved into the bonus pool
    pub released: u128,
    /// False when liquidated by settlement
    pub by_price: bool,
    pub timestamp: i64,
}

#[event]
pub struct SwapExecuted {
    pub round_id: u64,
    pub pool: Pubkey,
    pub trader: Pubkey,
    pub buy_token: bool,
    pub amount_in: u128,
    pub fee: u128,
    pub amount_out: u128,
    pub token_reserve: u128,
    pub funding_reserve: u128,
    pub weight_token: u128,
    pub timestamp: i64,
}

#[event]
pub struct PositionTransferred {
    pub pool: Pubkey,
    pub from: Pubkey,
    pub to: Pubkey,
    pub amount: u128,
}

#[event]
pub struct RewardMinted {
    pub round_id: u64,
    pub recipient: Pubkey,
    pub funding_in: u128,
    pub minted: u128,
    pub total_supply: u128,
}

#[event]
pub struct RewardBurned {
    pub round_id: u64,
    pub holder: Pubkey,
    pub amount: u128,
    pub funding_out: u64,
    pub total_supply: u128,
}

#[event]
pub struct BonusDeposited {
    pub round_id: u64,
    pub pool: Pubkey,
    pub amount: u128,
    pub bonus_pool: u128,
}

#[event]
pub struct BonusDistributed {
    pub round_id: u64,
    pub pool: Pubkey,
    pub bonus: u128,
    pub recipients: Vec<Pubkey>,
    pub amounts: Vec<u128>,
}

#[event]
pub struct RewardClaimed {
    pub round_id: u64,
    pub pool: Pubkey,
    pub owner: Pubkey,
    pub amount: u128,
}
