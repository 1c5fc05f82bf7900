//! # Round LBP: Competing Liquidity Bootstrapping Pools
//!
//! Pools compete inside fixed-length rounds. Each pool trades its own
//! position token against a shared funding asset on a weighted curve whose
//! token weight decays over time, so the price falls unless buyers hold it.
//!
//! ## How a round plays out
//! - Anyone creates a pool in the open round by seeding it with funding.
//! - Buyers pay funding for position tokens. Sellers return them and get
//!   the round's reward token, minted on a linear bonding curve.
//! - A pool whose price falls to a tenth of its start can be liquidated
//!   by anyone; its funding joins the round's bonus pool.
//! - At the end the pool with the most tokens in holders' hands wins. The
//!   others are liquidated and the whole bonus pool is minted as reward
//!   tokens for the winner's holders, pro rata.
//! - Reward tokens can be burned back into funding along the curve.

use anchor_lang::prelude::*;

pub mod amm;
pub mod constants;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod state;

pub use amm::*;
pub use instructions::*;
pub use state::ConfigParams;

// Replace with your deployed program ID
declare_id!("6xT66FfHKJNGDt1ZMZiKkiUmqnHqRDS9LfK553qrEJqo");

#[program]
pub mod round_lbp {
    use super::*;

    /// Create the orchestrator, funding vault and the first round
    pub fn initialize(
        ctx: Context<Initialize>,
        params: ConfigParams,
        first_round_duration: i64,
    ) -> Result<()> {
        ctx.accounts
            .initialize(params, first_round_duration, &ctx.bumps)
    }

    pub fn update_config(ctx: Context<AdminOnly>, params: ConfigParams) -> Result<()> {
        ctx.accounts.update_config(params)
    }

    pub fn set_pause(ctx: Context<AdminOnly>, paused: bool) -> Result<()> {
        ctx.accounts.set_pause(paused)
    }

    /// Open a pool in the current round, returning its id
    pub fn create_pool(
        ctx: Context<CreatePool>,
        token_amount: u128,
        funding_amount: u64,
        name: String,
        symbol: String,
        uri: String,
    ) -> Result<u64> {
        ctx.accounts
            .create_pool(token_amount, funding_amount, name, symbol, uri, &ctx.bumps)
    }

    /// Buy position tokens with funding, or sell them for reward tokens
    pub fn swap(
        ctx: Context<Swap>,
        amount_in: u128,
        buy_token: bool,
        min_amount_out: u128,
    ) -> Result<u128> {
        ctx.accounts
            .swap(amount_in, buy_token, min_amount_out, &ctx.bumps)
    }

    pub fn quote_swap(ctx: Context<QuoteSwap>, amount_in: u128, buy_token: bool) -> Result<u128> {
        ctx.accounts.quote_swap(amount_in, buy_token)
    }

    pub fn transfer_position(
        ctx: Context<TransferPosition>,
        to: Pubkey,
        amount: u128,
    ) -> Result<()> {
        ctx.accounts.transfer_position(to, amount)
    }

    /// Permissionless liquidation of a collapsed pool
    pub fn liquidate_pool(ctx: Context<LiquidatePool>) -> Result<()> {
        ctx.accounts.liquidate_pool()
    }

    /// Settle an ended round; remaining accounts are its (pool, position) pairs
    pub fn settle_round<'info>(ctx: Context<'_, '_, 'info, 'info, SettleRound<'info>>) -> Result<()> {
        ctx.accounts.settle_round(ctx.remaining_accounts, false)
    }

    /// Settle the round before its end (admin only)
    pub fn settle_round_early<'info>(
        ctx: Context<'_, '_, 'info, 'info, SettleRound<'info>>,
    ) -> Result<()> {
        ctx.accounts.settle_round(ctx.remaining_accounts, true)
    }

    /// Open the next round, settling the current one first if needed
    pub fn start_round<'info>(
        ctx: Context<'_, '_, 'info, 'info, StartRound<'info>>,
        duration: i64,
    ) -> Result<()> {
        ctx.accounts
            .start_round(duration, ctx.remaining_accounts, &ctx.bumps)
    }

    /// Burn reward tokens for funding along the curve
    pub fn burn_reward(ctx: Context<BurnReward>, amount: u128) -> Result<u64> {
        ctx.accounts.burn_reward(amount)
    }

    /// Move distributed bonus into the caller's reward account
    pub fn claim_reward(ctx: Context<ClaimReward>) -> Result<u128> {
        ctx.accounts.claim_reward(&ctx.bumps)
    }

    pub fn get_owned_supply(ctx: Context<PoolView>) -> Result<u128> {
        ctx.accounts.get_owned_supply()
    }

    pub fn get_round_pools(ctx: Context<RoundView>) -> Result<Vec<Pubkey>> {
        ctx.accounts.get_round_pools()
    }
}
