//! Read-only Queries
//!
//! Results are returned through Anchor return data, so clients can simulate
//! these instead of decoding accounts.

use anchor_lang::prelude::*;

use crate::errors::LbpError;
use crate::state::{Pool, RewardCurve, Round};

#[derive(Accounts)]
pub struct PoolView<'info> {
    pub pool: Account<'info, Pool>,
}

impl<'info> PoolView<'info> {
    pub fn get_owned_supply(&self) -> Result<u128> {
        Ok(self.pool.owned_supply())
    }
}

#[derive(Accounts)]
pub struct RoundView<'info> {
    pub round: Account<'info, Round>,
}

impl<'info> RoundView<'info> {
    pub fn get_round_pools(&self) -> Result<Vec<Pubkey>> {
        Ok(self.round.pools.clone())
    }
}

#[derive(Accounts)]
pub struct QuoteSwap<'info> {
    pub pool: Box<Account<'info, Pool>>,

    #[account(address = pool.reward_curve @ LbpError::PoolMismatch)]
    pub reward_curve: Box<Account<'info, RewardCurve>>,
}

impl<'info> QuoteSwap<'info> {
    /// What `swap` would return right now for the same input
    pub fn quote_swap(&self, amount_in: u128, buy_token: bool) -> Result<u128> {
        let now = Clock::get()?.unix_timestamp;
        let quote = self.pool.quote_swap(now, amount_in, buy_token)?;
        if buy_token {
            Ok(quote.amount_out)
        } else {
            self.reward_curve.quote_mint(quote.amount_out)
        }
    }
}
