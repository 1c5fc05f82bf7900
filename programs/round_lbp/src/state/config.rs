//! Orchestrator Configuration
//!
//! Singleton account that owns the round registry pointer, the funding
//! vault and the parameters applied to every new pool and round.

use anchor_lang::prelude::*;

use crate::amm::LinearCurve;
use crate::constants::*;
use crate::errors::LbpError;

/// Global orchestrator account (singleton PDA)
///
/// Seeds: ["orchestrator"]
#[account]
#[derive(InitSpace)]
pub struct Config {
    /// May settle early, start rounds and change parameters
    pub admin: Pubkey,

    /// Funding asset mint (e.g., USDC)
    pub funding_mint: Pubkey,

    /// Program-wide funding vault (ATA owned by this account)
    pub vault: Pubkey,

    /// Id of the round currently open
    pub current_round: u64,

    /// Pools ever created (used as incrementing pool id)
    pub pool_count: u64,

    /// Swap fee applied to pools created from now on
    pub fee_bps: u16,

    /// Reward curve parameters applied to rounds started from now on
    pub base_price: u128,
    pub slope: u128,

    /// Allowed initial funding per pool (inclusive)
    pub min_funding: u64,
    pub max_funding: u64,

    /// Allowed round duration in seconds (inclusive)
    pub min_duration: i64,
    pub max_duration: i64,

    pub paused: bool,

    /// PDA bump seed
    pub bump: u8,
}

/// Tunable parameters, supplied at initialization
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub struct ConfigParams {
    pub fee_bps: u16,
    pub base_price: u128,
    pub slope: u128,
    pub min_funding: u64,
    pub max_funding: u64,
    pub min_duration: i64,
    pub max_duration: i64,
}

impl Default for ConfigParams {
    fn default() -> Self {
        ConfigParams {
            fee_bps: DEFAULT_FEE_BPS,
            base_price: DEFAULT_BASE_PRICE,
            slope: DEFAULT_SLOPE,
            min_funding: DEFAULT_MIN_FUNDING,
            max_funding: DEFAULT_MAX_FUNDING,
            min_duration: DEFAULT_MIN_DURATION,
            max_duration: DEFAULT_MAX_DURATION,
        }
    }
}

impl ConfigParams {
    /// Reward curve for rounds started under these parameters
    pub fn curve(&self) -> LinearCurve {
        LinearCurve {
            base_price: self.base_price,
            slope: self.slope,
        }
    }

    pub fn validate(&self) -> Result<()> {
        require!(self.fee_bps <= MAX_FEE_BPS, LbpError::FeeTooHigh);
        require!(self.base_price > 0, LbpError::InvalidCurveParams);
        require!(
            self.min_funding > 0 && self.min_funding <= self.max_funding,
            LbpError::InvalidCurveParams
        );
        require!(
            self.min_duration > 0 && self.min_duration <= self.max_duration,
            LbpError::InvalidCurveParams
        );
        Ok(())
    }
}

impl Config {
    pub const SEED: &'static [u8] = b"orchestrator";

    pub fn params(&self) -> ConfigParams {
        ConfigParams {
            fee_bps: self.fee_bps,
            base_price: self.base_price,
            slope: self.slope,
            min_funding: self.min_funding,
            max_funding: self.max_funding,
            min_duration: self.min_duration,
            max_duration: self.max_duration,
        }
    }

    pub fn apply(&mut self, params: ConfigParams) -> Result<()> {
        params.validate()?;
        self.fee_bps = params.fee_bps;
        self.base_price = params.base_price;
        self.slope = params.slope;
        self.min_funding = params.min_funding;
        self.max_funding = params.max_funding;
        self.min_duration = params.min_duration;
        self.max_duration = params.max_duration;
        Ok(())
    }

    pub fn require_not_paused(&self) -> Result<()> {
        require!(!self.paused, LbpError::Paused);
        Ok(())
    }

    pub fn check_funding(&self, amount: u64) -> Result<()> {
        require!(
            amount >= self.min_funding && amount <= self.max_funding,
            LbpError::FundingOutOfRange
        );
        Ok(())
    }

    pub fn check_duration(&self, duration: i64) -> Result<()> {
        require!(
            duration >= self.min_duration && duration <= self.max_duration,
            LbpError::DurationOutOfRange
        );
        Ok(())
    }

    pub fn next_round_id(&self) -> u64 {
        self.current_round + 1
    }
}
