//! Reward Token Burning and Claiming
//!
//! ## Burning
//!
//! Reward tokens are redeemed against the curve they were minted on:
//!
//! ```text
//!   refund = amount · (price(s) + price(s − amount)) / 2
//! ```
//!
//! The refund is paid from the shared vault, signed by the orchestrator.
//!
//! ## Claiming
//!
//! Settlement records the bonus minted for each winning holder on the
//! pool's position ledger; `claim_reward` moves it into the holder's reward
//! account, after which it can be burned like any other reward balance.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked,
};

use crate::errors::LbpError;
use crate::events::{RewardBurned, RewardClaimed};
use crate::state::{Config, Pool, PositionToken, RewardAccount, RewardCurve};

#[derive(Accounts)]
pub struct BurnReward<'info> {
    #[account(mut)]
    pub holder: Signer<'info>,

    #[account(
        seeds = [Config::SEED],
        bump = config.bump,
    )]
    pub config: Box<Account<'info, Config>>,

    #[account(
        mut,
        seeds = [RewardCurve::SEED, reward_curve.round_id.to_le_bytes().as_ref()],
        bump = reward_curve.bump,
    )]
    pub reward_curve: Box<Account<'info, RewardCurve>>,

    #[account(
        mut,
        seeds = [RewardAccount::SEED, reward_curve.key().as_ref(), holder.key().as_ref()],
        bump = reward_account.bump,
    )]
    pub reward_account: Box<Account<'info, RewardAccount>>,

    #[account(address = config.funding_mint)]
    pub funding_mint: Box<InterfaceAccount<'info, Mint>>,

    /// Holder's funding account (receives the refund)
    #[account(
        mut,
        token::mint = funding_mint,
        token::authority = holder,
    )]
    pub holder_funding: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Program-wide funding vault
    #[account(mut, address = config.vault)]
    pub vault: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Token program
    pub token_program: Interface<'info, TokenInterface>,
}

impl<'info> BurnReward<'info> {
    /// Burn `amount` reward tokens and return the funding paid out
    pub fn burn_reward(&mut self, amount: u128) -> Result<u64> {
        let quoted = self.reward_curve.quote_burn(amount)?;
        let funding_out = u64::try_from(quoted).map_err(|_| LbpError::MathOverflow)?;

        self.reward_curve
            .burn_for(&mut self.reward_account, amount)?;

        let config_seeds = &[Config::SEED, &[self.config.bump]];
        let signer_seeds = &[&config_seeds[..]];

        transfer_checked(
            CpiContext::new_with_signer(
                self.token_program.to_account_info(),
                TransferChecked {
                    from: self.vault.to_account_info(),
                    mint: self.funding_mint.to_account_info(),
                    to: self.holder_funding.to_account_info(),
                    authority: self.config.to_account_info(),
                },
                signer_seeds,
            ),
            funding_out,
            self.funding_mint.decimals,
        )?;

        emit!(RewardBurned {
            round_id: self.reward_curve.round_id,
            holder: self.holder.key(),
            amount,
            funding_out,
            total_supply: self.reward_curve.total_supply,
        });

        msg!("Burned {} reward tokens for {}", amount, funding_out);
        Ok(funding_out)
    }
}

#[derive(Accounts)]
pub struct ClaimReward<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        seeds = [Pool::SEED, pool.id.to_le_bytes().as_ref()],
        bump = pool.bump,
    )]
    pub pool: Box<Account<'info, Pool>>,

    #[account(mut, address = pool.position_token @ LbpError::PoolMismatch)]
    pub position_token: Box<Account<'info, PositionToken>>,

    #[account(address = pool.reward_curve @ LbpError::PoolMismatch)]
    pub reward_curve: Box<Account<'info, RewardCurve>>,

    #[account(
        init_if_needed,
        payer = owner,
        space = 8 + RewardAccount::INIT_SPACE,
        seeds = [RewardAccount::SEED, reward_curve.key().as_ref(), owner.key().as_ref()],
        bump,
    )]
    pub reward_account: Box<Account<'info, RewardAccount>>,

    /// System program
    pub system_program: Program<'info, System>,
}

impl<'info> ClaimReward<'info> {
    pub fn claim_reward(&mut self, bumps: &ClaimRewardBumps) -> Result<u128> {
        let owner = self.owner.key();
        let amount = self.position_token.take_reward(&owner)?;

        if self.reward_account.owner == Pubkey::default() {
            self.reward_account.curve = self.reward_curve.key();
            self.reward_account.owner = owner;
            self.reward_account.bump = bumps.reward_account;
        }
        self.reward_account.credit(amount)?;

        emit!(RewardClaimed {
            round_id: self.reward_curve.round_id,
            pool: self.pool.key(),
            owner,
            amount,
        });

        msg!("Claimed {} reward tokens from pool {}", amount, self.pool.id);
        Ok(amount)
    }
}
