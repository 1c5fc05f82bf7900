//! Admin Controls
//!
//! Parameter changes apply to pools and rounds created afterwards; live
//! pools keep the fee they were created with and live curves keep their
//! price line.

use anchor_lang::prelude::*;

use crate::errors::LbpError;
use crate::events::{ConfigUpdated, PauseChanged};
use crate::state::{Config, ConfigParams};

#[derive(Accounts)]
pub struct AdminOnly<'info> {
    pub admin: Signer<'info>,

    #[account(
        mut,
        seeds = [Config::SEED],
        bump = config.bump,
        has_one = admin @ LbpError::Unauthorized,
    )]
    pub config: Account<'info, Config>,
}

impl<'info> AdminOnly<'info> {
    pub fn update_config(&mut self, params: ConfigParams) -> Result<()> {
        self.config.apply(params)?;

        emit!(ConfigUpdated {
            admin: self.admin.key(),
            fee_bps: params.fee_bps,
            base_price: params.base_price,
            slope: params.slope,
            min_funding: params.min_funding,
            max_funding: params.max_funding,
            min_duration: params.min_duration,
            max_duration: params.max_duration,
        });

        msg!("Config updated: fee {} bps", params.fee_bps);
        Ok(())
    }

    pub fn set_pause(&mut self, paused: bool) -> Result<()> {
        self.config.paused = paused;

        emit!(PauseChanged {
            admin: self.admin.key(),
            paused,
        });

        msg!("Paused: {}", paused);
        Ok(())
    }
}
