//! Pool Creation
//!
//! Anyone may open a pool in the current round by seeding it with funding.
//! The whole position token supply starts inside the pool:
//!
//! ```text
//!   creator funding ──► vault          (SPL transfer)
//!   token_reserve    =  token_amount   (all of the supply)
//!   funding_reserve  =  funding_amount
//! ```

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked,
};

use crate::errors::LbpError;
use crate::events::PoolCreated;
use crate::state::{Config, Pool, PoolInit, PositionToken, RewardCurve, Round};

#[derive(Accounts)]
pub struct CreatePool<'info> {
    /// Pool creator (pays funding and rent)
    #[account(mut)]
    pub creator: Signer<'info>,

    #[account(
        mut,
        seeds = [Config::SEED],
        bump = config.bump,
    )]
    pub config: Box<Account<'info, Config>>,

    /// Current round
    #[account(
        mut,
        seeds = [Round::SEED, config.current_round.to_le_bytes().as_ref()],
        bump = round.bump,
    )]
    pub round: Box<Account<'info, Round>>,

    #[account(address = round.reward_curve @ LbpError::PoolMismatch)]
    pub reward_curve: Box<Account<'info, RewardCurve>>,

    /// Pool account (created)
    #[account(
        init,
        payer = creator,
        space = 8 + Pool::INIT_SPACE,
        seeds = [Pool::SEED, config.pool_count.to_le_bytes().as_ref()],
        bump,
    )]
    pub pool: Box<Account<'info, Pool>>,

    /// Position token ledger of the pool (created)
    #[account(
        init,
        payer = creator,
        space = PositionToken::space(0),
        seeds = [PositionToken::SEED, pool.key().as_ref()],
        bump,
    )]
    pub position_token: Box<Account<'info, PositionToken>>,

    #[account(address = config.funding_mint)]
    pub funding_mint: Box<InterfaceAccount<'info, Mint>>,

    /// Creator's funding account
    #[account(
        mut,
        token::mint = funding_mint,
        token::authority = creator,
    )]
    pub creator_funding: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Program-wide funding vault
    #[account(mut, address = config.vault)]
    pub vault: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Token program
    pub token_program: Interface<'info, TokenInterface>,
    /// System program
    pub system_program: Program<'info, System>,
}

impl<'info> CreatePool<'info> {
    pub fn create_pool(
        &mut self,
        token_amount: u128,
        funding_amount: u64,
        name: String,
        symbol: String,
        uri: String,
        bumps: &CreatePoolBumps,
    ) -> Result<u64> {
        let now = Clock::get()?.unix_timestamp;

        self.config.require_not_paused()?;
        self.config.check_funding(funding_amount)?;
        require!(token_amount > 0, LbpError::ZeroAmount);
        PositionToken::validate_metadata(&name, &symbol, &uri)?;

        let pool_key = self.pool.key();
        self.round.register_pool(now, pool_key)?;

        // Funding goes to the shared vault
        transfer_checked(
            CpiContext::new(
                self.token_program.to_account_info(),
                TransferChecked {
                    from: self.creator_funding.to_account_info(),
                    mint: self.funding_mint.to_account_info(),
                    to: self.vault.to_account_info(),
                    authority: self.creator.to_account_info(),
                },
            ),
            funding_amount,
            self.funding_mint.decimals,
        )?;

        self.position_token.set_inner(PositionToken {
            pool: pool_key,
            total_supply: token_amount,
            name,
            symbol,
            uri,
            holders: Vec::new(),
            bump: bumps.position_token,
        });

        let pool_id = self.config.pool_count;
        self.pool.open(PoolInit {
            id: pool_id,
            round_id: self.round.id,
            creator: self.creator.key(),
            position_token: self.position_token.key(),
            reward_curve: self.reward_curve.key(),
            fee_bps: self.config.fee_bps,
            created_at: now,
            token_supply: token_amount,
            funding: funding_amount as u128,
            bump: bumps.pool,
        })?;

        self.config.pool_count = pool_id.checked_add(1).ok_or(LbpError::MathOverflow)?;

        emit!(PoolCreated {
            round_id: self.round.id,
            pool: pool_key,
            pool_id,
            creator: self.creator.key(),
            position_token: self.position_token.key(),
            token_supply: token_amount,
            funding: funding_amount,
            initial_price: self.pool.initial_price,
            liquidation_price: self.pool.liquidation_price,
            timestamp: now,
        });

        msg!("Pool {} created in round {}", pool_id, self.round.id);
        msg!("Supply: {}, funding: {}", token_amount, funding_amount);

        Ok(pool_id)
    }
}
