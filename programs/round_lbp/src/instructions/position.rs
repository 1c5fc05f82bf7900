//! Position Transfers
//!
//! Moves position tokens between holders of an active pool. The recipient
//! is registered as a holder on first receipt; the sender pays for the
//! extra ledger space. The pool itself cannot receive position tokens.

use anchor_lang::prelude::*;

use crate::errors::LbpError;
use crate::events::PositionTransferred;
use crate::state::{Config, Pool, PositionToken};

#[derive(Accounts)]
#[instruction(to: Pubkey)]
pub struct TransferPosition<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        seeds = [Config::SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, Config>,

    #[account(
        seeds = [Pool::SEED, pool.id.to_le_bytes().as_ref()],
        bump = pool.bump,
    )]
    pub pool: Box<Account<'info, Pool>>,

    #[account(
        mut,
        address = pool.position_token @ LbpError::PoolMismatch,
        realloc = position_token.space_after_credit(&to),
        realloc::payer = owner,
        realloc::zero = false,
    )]
    pub position_token: Box<Account<'info, PositionToken>>,

    /// System program
    pub system_program: Program<'info, System>,
}

impl<'info> TransferPosition<'info> {
    pub fn transfer_position(&mut self, to: Pubkey, amount: u128) -> Result<()> {
        self.config.require_not_paused()?;
        self.pool.require_active()?;

        let from = self.owner.key();
        self.position_token.transfer(&from, to, amount)?;

        emit!(PositionTransferred {
            pool: self.pool.key(),
            from,
            to,
            amount,
        });

        msg!("Transferred {} of pool {} to {}", amount, self.pool.id, to);
        Ok(())
    }
}
