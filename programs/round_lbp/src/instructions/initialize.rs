//! Protocol Initialization
//!
//! Creates the orchestrator, its funding vault and the first round with its
//! reward curve. The first round starts immediately.

use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token_interface::{Mint, TokenAccount, TokenInterface},
};

use crate::constants::FIRST_ROUND_ID;
use crate::events::RoundStarted;
use crate::state::{Config, ConfigParams, RewardCurve, Round};

/// Accounts required for protocol initialization
#[derive(Accounts)]
pub struct Initialize<'info> {
    /// Protocol administrator (becomes the admin)
    #[account(mut)]
    pub admin: Signer<'info>,

    /// Orchestrator account (created)
    #[account(
        init,
        payer = admin,
        space = 8 + Config::INIT_SPACE,
        seeds = [Config::SEED],
        bump,
    )]
    pub config: Account<'info, Config>,

    /// Funding token mint (e.g., USDC)
    pub funding_mint: InterfaceAccount<'info, Mint>,

    /// Program-wide funding vault
    #[account(
        init,
        payer = admin,
        associated_token::mint = funding_mint,
        associated_token::authority = config,
        associated_token::token_program = token_program,
    )]
    pub vault: InterfaceAccount<'info, TokenAccount>,

    /// First round (created)
    #[account(
        init,
        payer = admin,
        space = 8 + Round::INIT_SPACE,
        seeds = [Round::SEED, &FIRST_ROUND_ID.to_le_bytes()],
        bump,
    )]
    pub round: Account<'info, Round>,

    /// Reward curve of the first round (created)
    #[account(
        init,
        payer = admin,
        space = 8 + RewardCurve::INIT_SPACE,
        seeds = [RewardCurve::SEED, &FIRST_ROUND_ID.to_le_bytes()],
        bump,
    )]
    pub reward_curve: Account<'info, RewardCurve>,

    /// Token program
    pub token_program: Interface<'info, TokenInterface>,
    /// Associated token program
    pub associated_token_program: Program<'info, AssociatedToken>,
    /// System program
    pub system_program: Program<'info, System>,
}

impl<'info> Initialize<'info> {
    pub fn initialize(
        &mut self,
        params: ConfigParams,
        first_round_duration: i64,
        bumps: &InitializeBumps,
    ) -> Result<()> {
        params.validate()?;

        let config = Config {
            admin: self.admin.key(),
            funding_mint: self.funding_mint.key(),
            vault: self.vault.key(),
            current_round: FIRST_ROUND_ID,
            pool_count: 0,
            fee_bps: params.fee_bps,
            base_price: params.base_price,
            slope: params.slope,
            min_funding: params.min_funding,
            max_funding: params.max_funding,
            min_duration: params.min_duration,
            max_duration: params.max_duration,
            paused: false,
            bump: bumps.config,
        };
        config.check_duration(first_round_duration)?;
        self.config.set_inner(config);

        let now = Clock::get()?.unix_timestamp;
        self.reward_curve
            .open(FIRST_ROUND_ID, params.curve(), bumps.reward_curve);
        self.round.open(
            FIRST_ROUND_ID,
            now,
            first_round_duration,
            self.reward_curve.key(),
            bumps.round,
        )?;

        emit!(RoundStarted {
            round_id: FIRST_ROUND_ID,
            reward_curve: self.reward_curve.key(),
            start_time: self.round.start_time,
            end_time: self.round.end_time,
        });

        msg!("Protocol initialized!");
        msg!("Admin: {}", self.admin.key());
        msg!("Funding mint: {}", self.funding_mint.key());
        msg!("Fee: {} bps", params.fee_bps);
        msg!("Round {} ends at {}", FIRST_ROUND_ID, self.round.end_time);

        Ok(())
    }
}
