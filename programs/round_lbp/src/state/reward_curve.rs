//! Round Reward Curve
//!
//! One curve per round. Sell proceeds of every pool in the round are minted
//! into reward tokens here, and at settlement the bonus pool (funding of
//! liquidated pools and of the winner) is minted for the winner's holders.
//!
//! ```text
//!   sell proceeds ──mint_for──► reward tokens ◄──distribute── bonus_pool
//!                                    │                            ▲
//!                                burn_for                   deposit_bonus
//!                                    ▼                            │
//!                             funding refund               pool liquidation
//! ```
//!
//! `funding_balance` is the funding that backs minted supply and pays burns;
//! `bonus_pool` is kept apart until it is distributed.

use anchor_lang::prelude::*;

use crate::amm::fixed_point::mul_div;
use crate::amm::LinearCurve;
use crate::constants::BPS;
use crate::errors::LbpError;
use crate::state::NonReentrant;

/// Reward token curve of a round
///
/// Seeds: ["curve", round_id]
#[account]
#[derive(InitSpace)]
pub struct RewardCurve {
    pub round_id: u64,

    /// Price at zero supply (funding per whole token, WAD)
    pub base_price: u128,

    /// Price increase per whole token minted (WAD)
    pub slope: u128,

    pub total_supply: u128,

    /// Funding deposited by settling pools, not yet distributed
    pub bonus_pool: u128,

    /// Funding backing minted supply
    pub funding_balance: u128,

    pub locked: bool,

    /// PDA bump seed
    pub bump: u8,
}

/// A holder's balance of one round's reward token
///
/// Seeds: ["reward", curve, owner]
#[account]
#[derive(InitSpace)]
pub struct RewardAccount {
    pub curve: Pubkey,
    pub owner: Pubkey,
    pub balance: u128,
    pub bump: u8,
}

impl RewardAccount {
    pub const SEED: &'static [u8] = b"reward";

    pub fn credit(&mut self, amount: u128) -> Result<()> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(LbpError::MathOverflow)?;
        Ok(())
    }
}

impl NonReentrant for RewardCurve {
    fn lock_flag(&mut self) -> &mut bool {
        &mut self.locked
    }
}

impl RewardCurve {
    pub const SEED: &'static [u8] = b"curve";

    pub fn open(&mut self, round_id: u64, curve: LinearCurve, bump: u8) {
        self.round_id = round_id;
        self.base_price = curve.base_price;
        self.slope = curve.slope;
        self.total_supply = 0;
        self.bonus_pool = 0;
        self.funding_balance = 0;
        self.locked = false;
        self.bump = bump;
    }

    pub fn curve(&self) -> LinearCurve {
        LinearCurve {
            base_price: self.base_price,
            slope: self.slope,
        }
    }

    pub fn current_price(&self) -> Result<u128> {
        self.curve().price_at(self.total_supply)
    }

    /// Reward tokens `mint_for` would mint for `funding_in` right now
    pub fn quote_mint(&self, funding_in: u128) -> Result<u128> {
        let minted = self.curve().mint_amount(self.total_supply, funding_in)?;
        require!(minted > 0, LbpError::AmountTooSmall);
        Ok(minted)
    }

    /// Funding `burn_for` would release for `amount` right now
    pub fn quote_burn(&self, amount: u128) -> Result<u128> {
        require!(amount > 0, LbpError::ZeroAmount);
        require!(amount <= self.total_supply, LbpError::InsufficientBalance);
        let refund = self.curve().burn_refund(self.total_supply, amount)?;
        require!(refund > 0, LbpError::AmountTooSmall);
        require!(
            refund <= self.funding_balance,
            LbpError::InsufficientCurveFunding
        );
        Ok(refund)
    }

    /// Mint reward tokens to `recipient` against `funding_in`
    pub fn mint_for(&mut self, recipient: &mut RewardAccount, funding_in: u128) -> Result<u128> {
        self.non_reentrant(|curve| {
            let minted = curve.quote_mint(funding_in)?;
            let total_supply = curve
                .total_supply
                .checked_add(minted)
                .ok_or(LbpError::MathOverflow)?;
            let funding_balance = curve
                .funding_balance
                .checked_add(funding_in)
                .ok_or(LbpError::MathOverflow)?;

            recipient.credit(minted)?;
            curve.total_supply = total_supply;
            curve.funding_balance = funding_balance;
            Ok(minted)
        })
    }

    /// Burn `amount` from `holder`; the caller pays the returned funding out
    pub fn burn_for(&mut self, holder: &mut RewardAccount, amount: u128) -> Result<u128> {
        self.non_reentrant(|curve| {
            require!(amount > 0, LbpError::ZeroAmount);
            require!(holder.balance >= amount, LbpError::InsufficientBalance);
            let refund = curve.quote_burn(amount)?;

            holder.balance -= amount;
            curve.total_supply -= amount;
            curve.funding_balance -= refund;
            Ok(refund)
        })
    }

    pub fn deposit_bonus(&mut self, amount: u128) -> Result<()> {
        self.bonus_pool = self
            .bonus_pool
            .checked_add(amount)
            .ok_or(LbpError::MathOverflow)?;
        Ok(())
    }

    /// Mint the bonus pool for `winners` pro rata to `shares` (bps)
    ///
    /// Returns the amount minted for each winner, in order. Rounding dust
    /// stays unminted; the whole bonus moves into `funding_balance`.
    pub fn distribute(&mut self, winners: &[Pubkey], shares: &[u64]) -> Result<Vec<u128>> {
        self.non_reentrant(|curve| {
            require!(winners.len() == shares.len(), LbpError::LengthMismatch);
            require!(!winners.is_empty(), LbpError::EmptyWinners);
            require!(curve.bonus_pool > 0, LbpError::EmptyBonusPool);
            let share_sum: u128 = shares.iter().map(|s| *s as u128).sum();
            require!(share_sum == BPS, LbpError::InvalidShares);

            let total = curve
                .curve()
                .mint_amount(curve.total_supply, curve.bonus_pool)?;

            let mut minted = Vec::with_capacity(shares.len());
            let mut minted_sum: u128 = 0;
            for share in shares {
                let amount = mul_div(total, *share as u128, BPS)?;
                minted_sum += amount;
                minted.push(amount);
            }

            curve.total_supply = curve
                .total_supply
                .checked_add(minted_sum)
                .ok_or(LbpError::MathOverflow)?;
            curve.absorb_bonus()?;
            Ok(minted)
        })
    }

    /// Move the bonus pool into `funding_balance` without minting
    pub fn absorb_bonus(&mut self) -> Result<u128> {
        let bonus = self.bonus_pool;
        self.funding_balance = self
            .funding_balance
            .checked_add(bonus)
            .ok_or(LbpError::MathOverflow)?;
        self.bonus_pool = 0;
        Ok(bonus)
    }
}
