//! # Linear Reward Curve
//!
//! The round's reward token is priced on a straight line:
//!
//! ```text
//!   price(s) = base_price + slope · s / 1e18
//! ```
//!
//! ## Minting
//!
//! Depositing `F` funding at supply `s` mints `m` tokens such that the area
//! under the line between `s` and `s + m` equals `F`:
//!
//! ```text
//!   F = m · (b + slope · m / 2e18) / 1e18,      b = price(s)
//!
//!   m = 1e18 · (√(b² + 2·slope·F) − b) / slope
//! ```
//!
//! When the quadratic term vanishes at integer precision (zero slope, or a
//! slope so small that the root equals `b`) the curve is flat over the mint
//! and `m = F · 1e18 / b`.
//!
//! ## Burning
//!
//! Burning `m` tokens at supply `s` refunds the same area, i.e. `m` times
//! the average of `price(s)` and `price(s − m)`.

use anchor_lang::prelude::*;

use crate::amm::fixed_point::{mul_div, sqrt, to_u128, U256};
use crate::constants::WAD;
use crate::errors::LbpError;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub struct LinearCurve {
    pub base_price: u128,
    pub slope: u128,
}

impl LinearCurve {
    /// Marginal price at `supply`, in funding per whole reward token (WAD)
    pub fn price_at(&self, supply: u128) -> Result<u128> {
        let increment = mul_div(self.slope, supply, WAD)?;
        self.base_price
            .checked_add(increment)
            .ok_or_else(|| error!(LbpError::MathOverflow))
    }

    /// Reward tokens minted for `funding_in` at `supply`, rounded down
    pub fn mint_amount(&self, supply: u128, funding_in: u128) -> Result<u128> {
        require!(funding_in > 0, LbpError::ZeroAmount);
        let b = self.price_at(supply)?;

        if self.slope > 0 {
            let b_wide = U256::from(b);
            let linear_term = U256::from(self.slope)
                .checked_mul(U256::from(funding_in))
                .and_then(|v| v.checked_mul(U256::from(2u8)))
                .ok_or(LbpError::MathOverflow)?;
            let discriminant = b_wide
                .checked_mul(b_wide)
                .and_then(|v| v.checked_add(linear_term))
                .ok_or(LbpError::MathOverflow)?;
            let root = sqrt(discriminant);
            if root > b_wide {
                let minted = (root - b_wide) * U256::from(WAD) / U256::from(self.slope);
                return to_u128(minted);
            }
        }

        require!(b > 0, LbpError::DivisionByZero);
        mul_div(funding_in, WAD, b)
    }

    /// Funding released by burning `amount` at `supply`, rounded down
    pub fn burn_refund(&self, supply: u128, amount: u128) -> Result<u128> {
        require!(amount > 0, LbpError::ZeroAmount);
        require!(amount <= supply, LbpError::InsufficientBalance);

        let price_before = self.price_at(supply)?;
        let price_after = self.price_at(supply - amount)?;
        let price_sum = price_before
            .checked_add(price_after)
            .ok_or(LbpError::MathOverflow)?;

        mul_div(amount, price_sum, 2 * WAD)
    }
}

// ============================================================================
// TESTS
// ============================================================================
