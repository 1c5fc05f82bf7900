//! Pool Liquidation
//!
//! Permissionless: once a pool's spot price has fallen to a tenth of its
//! initial price, anyone may close it and move its funding into the round's
//! bonus pool.

use anchor_lang::prelude::*;

use crate::errors::LbpError;
use crate::events::{BonusDeposited, PoolLiquidated};
use crate::state::{Pool, RewardCurve, Round};

#[derive(Accounts)]
pub struct LiquidatePool<'info> {
    pub liquidator: Signer<'info>,

    #[account(
        mut,
        seeds = [Pool::SEED, pool.id.to_le_bytes().as_ref()],
        bump = pool.bump,
    )]
    pub pool: Box<Account<'info, Pool>>,

    #[account(
        seeds = [Round::SEED, pool.round_id.to_le_bytes().as_ref()],
        bump = round.bump,
        constraint = !round.settled @ LbpError::RoundSettled,
    )]
    pub round: Box<Account<'info, Round>>,

    #[account(mut, address = pool.reward_curve @ LbpError::PoolMismatch)]
    pub reward_curve: Box<Account<'info, RewardCurve>>,
}

impl<'info> LiquidatePool<'info> {
    pub fn liquidate_pool(&mut self) -> Result<()> {
        let now = Clock::get()?.unix_timestamp;
        let released = self.pool.liquidate(now, &mut self.reward_curve)?;

        emit!(PoolLiquidated {
            round_id: self.round.id,
            pool: self.pool.key(),
            released,
            by_price: true,
            timestamp: now,
        });
        emit!(BonusDeposited {
            round_id: self.round.id,
            pool: self.pool.key(),
            amount: released,
            bonus_pool: self.reward_curve.bonus_pool,
        });

        msg!(
            "Pool {} liquidated by {}, {} to bonus pool",
            self.pool.id,
            self.liquidator.key(),
            released
        );
        Ok(())
    }
}
