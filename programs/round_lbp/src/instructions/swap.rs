//! Swapping
//!
//! Buys pay funding into the vault and receive position tokens. Sells
//! return position tokens to the pool; the funding they release never
//! leaves the vault but is minted into the round's reward token for the
//! seller.
//!
//! ```text
//!   buy:   trader funding ──SPL──► vault      pool.funding_reserve += in
//!          pool tokens    ───────► trader     pool.token_reserve   -= out
//!
//!   sell:  trader tokens  ───────► pool       pool.token_reserve   += in
//!          pool funding   ──mint_for──► reward account of the trader
//! ```

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked,
};

use crate::errors::LbpError;
use crate::events::{RewardMinted, SwapExecuted};
use crate::state::{Config, Pool, PositionToken, RewardAccount, RewardCurve};

#[derive(Accounts)]
pub struct Swap<'info> {
    #[account(mut)]
    pub trader: Signer<'info>,

    #[account(
        seeds = [Config::SEED],
        bump = config.bump,
    )]
    pub config: Box<Account<'info, Config>>,

    #[account(
        mut,
        seeds = [Pool::SEED, pool.id.to_le_bytes().as_ref()],
        bump = pool.bump,
    )]
    pub pool: Box<Account<'info, Pool>>,

    /// Grows by one holder entry when the trader is new to the pool
    #[account(
        mut,
        address = pool.position_token @ LbpError::PoolMismatch,
        realloc = position_token.space_after_credit(&trader.key()),
        realloc::payer = trader,
        realloc::zero = false,
    )]
    pub position_token: Box<Account<'info, PositionToken>>,

    #[account(mut, address = pool.reward_curve @ LbpError::PoolMismatch)]
    pub reward_curve: Box<Account<'info, RewardCurve>>,

    /// Trader's reward balance in this round
    #[account(
        init_if_needed,
        payer = trader,
        space = 8 + RewardAccount::INIT_SPACE,
        seeds = [RewardAccount::SEED, reward_curve.key().as_ref(), trader.key().as_ref()],
        bump,
    )]
    pub reward_account: Box<Account<'info, RewardAccount>>,

    #[account(address = config.funding_mint)]
    pub funding_mint: Box<InterfaceAccount<'info, Mint>>,

    /// Trader's funding account
    #[account(
        mut,
        token::mint = funding_mint,
        token::authority = trader,
    )]
    pub trader_funding: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Program-wide funding vault
    #[account(mut, address = config.vault)]
    pub vault: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Token program
    pub token_program: Interface<'info, TokenInterface>,
    /// System program
    pub system_program: Program<'info, System>,
}

impl<'info> Swap<'info> {
    /// Swap `amount_in` (funding on a buy, position tokens on a sell)
    ///
    /// Returns position tokens received on a buy and reward tokens minted on
    /// a sell.
    pub fn swap(
        &mut self,
        amount_in: u128,
        buy_token: bool,
        min_amount_out: u128,
        bumps: &SwapBumps,
    ) -> Result<u128> {
        let now = Clock::get()?.unix_timestamp;
        self.config.require_not_paused()?;

        if self.reward_account.owner == Pubkey::default() {
            self.reward_account.curve = self.reward_curve.key();
            self.reward_account.owner = self.trader.key();
            self.reward_account.bump = bumps.reward_account;
        }

        let funding_in = if buy_token {
            let funding_in = u64::try_from(amount_in).map_err(|_| LbpError::MathOverflow)?;
            require!(
                self.trader_funding.amount >= funding_in,
                LbpError::InsufficientBalance
            );
            Some(funding_in)
        } else {
            None
        };

        let receipt = self.pool.swap(
            now,
            amount_in,
            buy_token,
            &mut self.position_token,
            &mut self.reward_curve,
            &mut self.reward_account,
        )?;
        let received = receipt.amount_received();
        require!(received >= min_amount_out, LbpError::SlippageExceeded);

        if let Some(funding_in) = funding_in {
            transfer_checked(
                CpiContext::new(
                    self.token_program.to_account_info(),
                    TransferChecked {
                        from: self.trader_funding.to_account_info(),
                        mint: self.funding_mint.to_account_info(),
                        to: self.vault.to_account_info(),
                        authority: self.trader.to_account_info(),
                    },
                ),
                funding_in,
                self.funding_mint.decimals,
            )?;
        } else {
            emit!(RewardMinted {
                round_id: self.reward_curve.round_id,
                recipient: receipt.trader,
                funding_in: receipt.quote.amount_out,
                minted: receipt.reward_minted,
                total_supply: self.reward_curve.total_supply,
            });
        }

        emit!(SwapExecuted {
            round_id: self.pool.round_id,
            pool: self.pool.key(),
            trader: receipt.trader,
            buy_token,
            amount_in,
            fee: receipt.quote.fee,
            amount_out: receipt.quote.amount_out,
            token_reserve: self.pool.token_reserve,
            funding_reserve: self.pool.funding_reserve,
            weight_token: receipt.quote.weights.token,
            timestamp: now,
        });

        msg!(
            "Swap on pool {}: {} in, {} received",
            self.pool.id,
            amount_in,
            received
        );

        Ok(received)
    }
}
