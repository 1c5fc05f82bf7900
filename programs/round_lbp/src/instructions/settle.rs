//! Round Settlement and Rollover
//!
//! Settlement walks every pool of the round. The pools and their position
//! ledgers are passed as remaining accounts, in round order:
//!
//! ```text
//!   remaining_accounts = [pool_0, position_0, pool_1, position_1, ...]
//! ```
//!
//! `start_round` takes the same remaining accounts and settles the current
//! round first when nobody has done so yet.

use anchor_lang::prelude::*;

use crate::errors::LbpError;
use crate::events::{BonusDeposited, BonusDistributed, PoolLiquidated, RoundSettled, RoundStarted};
use crate::state::{Config, Pool, PoolEntry, PositionToken, RewardCurve, Round, RoundSettlement};

#[derive(Accounts)]
pub struct SettleRound<'info> {
    pub caller: Signer<'info>,

    #[account(
        seeds = [Config::SEED],
        bump = config.bump,
    )]
    pub config: Box<Account<'info, Config>>,

    #[account(
        mut,
        seeds = [Round::SEED, round.id.to_le_bytes().as_ref()],
        bump = round.bump,
    )]
    pub round: Box<Account<'info, Round>>,

    #[account(mut, address = round.reward_curve @ LbpError::PoolMismatch)]
    pub reward_curve: Box<Account<'info, RewardCurve>>,
}

impl<'info> SettleRound<'info> {
    /// Settle after `end_time`, or at any time by the admin when `early`
    pub fn settle_round(&mut self, remaining: &'info [AccountInfo<'info>], early: bool) -> Result<()> {
        let now = Clock::get()?.unix_timestamp;

        if early {
            require_keys_eq!(self.caller.key(), self.config.admin, LbpError::Unauthorized);
        }
        self.round.ensure_settleable(now, early)?;

        settle_with_pools(&mut self.round, &mut self.reward_curve, remaining, now)?;
        Ok(())
    }
}

#[derive(Accounts)]
pub struct StartRound<'info> {
    #[account(mut)]
    pub admin: Signer<'info>,

    #[account(
        mut,
        seeds = [Config::SEED],
        bump = config.bump,
        has_one = admin @ LbpError::Unauthorized,
    )]
    pub config: Box<Account<'info, Config>>,

    #[account(
        mut,
        seeds = [Round::SEED, config.current_round.to_le_bytes().as_ref()],
        bump = current_round.bump,
    )]
    pub current_round: Box<Account<'info, Round>>,

    #[account(mut, address = current_round.reward_curve @ LbpError::PoolMismatch)]
    pub current_curve: Box<Account<'info, RewardCurve>>,

    /// Next round (created)
    #[account(
        init,
        payer = admin,
        space = 8 + Round::INIT_SPACE,
        seeds = [Round::SEED, config.next_round_id().to_le_bytes().as_ref()],
        bump,
    )]
    pub next_round: Box<Account<'info, Round>>,

    /// Reward curve of the next round (created)
    #[account(
        init,
        payer = admin,
        space = 8 + RewardCurve::INIT_SPACE,
        seeds = [RewardCurve::SEED, config.next_round_id().to_le_bytes().as_ref()],
        bump,
    )]
    pub next_curve: Box<Account<'info, RewardCurve>>,

    /// System program
    pub system_program: Program<'info, System>,
}

impl<'info> StartRound<'info> {
    pub fn start_round(
        &mut self,
        duration: i64,
        remaining: &'info [AccountInfo<'info>],
        bumps: &StartRoundBumps,
    ) -> Result<()> {
        let now = Clock::get()?.unix_timestamp;

        self.config.check_duration(duration)?;

        if self.current_round.settle_before_rollover(now)? {
            settle_with_pools(&mut self.current_round, &mut self.current_curve, remaining, now)?;
        }

        let round_id = self.config.next_round_id();
        self.next_curve
            .open(round_id, self.config.params().curve(), bumps.next_curve);
        self.next_round
            .open(round_id, now, duration, self.next_curve.key(), bumps.next_round)?;
        self.config.current_round = round_id;

        emit!(RoundStarted {
            round_id,
            reward_curve: self.next_curve.key(),
            start_time: now,
            end_time: self.next_round.end_time,
        });

        msg!("Round {} started, ends at {}", round_id, self.next_round.end_time);
        Ok(())
    }
}

/// Load the round's pools from `remaining`, settle, persist and log
fn settle_with_pools<'info>(
    round: &mut Account<'info, Round>,
    curve: &mut Account<'info, RewardCurve>,
    remaining: &'info [AccountInfo<'info>],
    now: i64,
) -> Result<RoundSettlement> {
    require!(!round.settled, LbpError::RoundSettled);
    require!(
        remaining.len() == round.pools.len() * 2,
        LbpError::PoolMismatch
    );

    let mut pools: Vec<Account<'info, Pool>> = Vec::with_capacity(round.pools.len());
    let mut positions: Vec<Account<'info, PositionToken>> = Vec::with_capacity(round.pools.len());
    for pair in remaining.chunks(2) {
        let (pool_info, position_info) = (&pair[0], &pair[1]);
        require!(
            pool_info.is_writable && position_info.is_writable,
            LbpError::PoolMismatch
        );

        let pool: Account<'info, Pool> = Account::try_from(pool_info)?;
        let position: Account<'info, PositionToken> = Account::try_from(position_info)?;
        require_keys_eq!(pool.position_token, position_info.key(), LbpError::PoolMismatch);
        require_keys_eq!(position.pool, pool_info.key(), LbpError::PoolMismatch);

        pools.push(pool);
        positions.push(position);
    }

    let settlement = {
        let mut entries: Vec<PoolEntry> = pools
            .iter_mut()
            .zip(positions.iter_mut())
            .map(|(pool, position)| {
                let key = pool.key();
                PoolEntry {
                    key,
                    pool: &mut **pool,
                    position: &mut **position,
                }
            })
            .collect();
        round.settle(now, &mut entries, curve)?
    };

    for pool in &pools {
        pool.exit(&crate::ID)?;
    }
    for position in &positions {
        position.exit(&crate::ID)?;
    }

    log_settlement(round, &settlement, now);
    Ok(settlement)
}

fn log_settlement(round: &Round, settlement: &RoundSettlement, now: i64) {
    let released: u128 = settlement.liquidated.iter().map(|(_, amount)| amount).sum();
    // Bonus already deposited by earlier permissionless liquidations
    let mut bonus_pool = settlement
        .bonus
        .saturating_sub(released)
        .saturating_sub(settlement.winner_released);

    if let Some(winner) = settlement.winner {
        bonus_pool += settlement.winner_released;
        emit!(BonusDeposited {
            round_id: round.id,
            pool: winner,
            amount: settlement.winner_released,
            bonus_pool,
        });
    }

    for (pool, amount) in &settlement.liquidated {
        bonus_pool += *amount;
        emit!(PoolLiquidated {
            round_id: round.id,
            pool: *pool,
            released: *amount,
            by_price: false,
            timestamp: now,
        });
        emit!(BonusDeposited {
            round_id: round.id,
            pool: *pool,
            amount: *amount,
            bonus_pool,
        });
    }

    match settlement.winner {
        Some(winner) => {
            if !settlement.recipients.is_empty() {
                emit!(BonusDistributed {
                    round_id: round.id,
                    pool: winner,
                    bonus: settlement.bonus,
                    recipients: settlement.recipients.clone(),
                    amounts: settlement.rewards.clone(),
                });
            }
            msg!("Round {} settled, winner: {}", round.id, winner);
        }
        None => msg!("Round {} settled without a winner", round.id),
    }

    emit!(RoundSettled {
        round_id: round.id,
        winner: settlement.winner,
        bonus: settlement.bonus,
        pools_liquidated: settlement.liquidated.len() as u8,
        settled_at: now,
    });
}
