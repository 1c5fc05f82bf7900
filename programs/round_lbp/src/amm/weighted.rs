//! # Weighted Pool Curve with Decaying Weights
//!
//! Each pool is a two-asset weighted constant-product market:
//!
//! ```text
//!   V = token_reserve^w_token · funding_reserve^w_funding
//!
//!   w_token(t)   = START_WEIGHT · T / (T + t)     clamped to [1, 10000] bps
//!   w_funding(t) = 10000 − w_token(t)
//! ```
//!
//! The token weight starts at 9091 bps and decays hyperbolically, so the
//! spot price of the position token drifts down unless buyers hold it up.
//!
//! ## Swap output
//!
//! ```text
//!   out = R_out · (1 − (R_in / (R_in + in_after_fee))^(W_in / W_out))
//! ```
//!
//! The power is a true power (see `fixed_point::pow_wad`). Quotes and
//! executed swaps share `quote`, so they always agree.

use anchor_lang::prelude::*;

use crate::amm::fixed_point::{mul_div, pow_wad, wad_div};
use crate::constants::{BPS, DECAY_TIMESCALE, START_WEIGHT, WAD};
use crate::errors::LbpError;

/// Pool weights in basis points; always sum to `BPS`
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub struct Weights {
    pub token: u128,
    pub funding: u128,
}

impl Weights {
    /// Weights after `elapsed` seconds since pool creation
    pub fn at(elapsed: u64) -> Self {
        let decayed = START_WEIGHT * DECAY_TIMESCALE / (DECAY_TIMESCALE + elapsed as u128);
        let token = decayed.clamp(1, BPS);
        Weights {
            token,
            funding: BPS - token,
        }
    }

    /// (input weight, output weight) for a swap direction
    pub fn for_direction(&self, buy_token: bool) -> (u128, u128) {
        if buy_token {
            (self.funding, self.token)
        } else {
            (self.token, self.funding)
        }
    }
}

/// Result of pricing a swap against a pool
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub struct SwapQuote {
    pub buy_token: bool,
    /// Full input, fee included
    pub amount_in: u128,
    /// Part of the input retained in the input reserve as fee
    pub fee: u128,
    /// Output in output-reserve units (tokens on buy, funding on sell)
    pub amount_out: u128,
    pub weights: Weights,
}

/// Funding per position token in WAD, weighted by the current weights
///
/// Returns 0 when the token reserve is empty.
pub fn spot_price(token_reserve: u128, funding_reserve: u128, weights: Weights) -> Result<u128> {
    if token_reserve == 0 {
        return Ok(0);
    }
    let unweighted = wad_div(funding_reserve, token_reserve)?;
    mul_div(unweighted, weights.token, weights.funding)
}

/// Split `amount_in` into (amount after fee, fee)
pub fn apply_fee(amount_in: u128, fee_bps: u16) -> Result<(u128, u128)> {
    let fee = mul_div(amount_in, fee_bps as u128, BPS)?;
    Ok((amount_in - fee, fee))
}

/// Weighted constant-product output for a given input after fee
pub fn out_given_in(
    reserve_in: u128,
    reserve_out: u128,
    weight_in: u128,
    weight_out: u128,
    amount_in_after_fee: u128,
) -> Result<u128> {
    require!(reserve_in > 0 && reserve_out > 0, LbpError::EmptyReserve);

    let new_reserve_in = reserve_in
        .checked_add(amount_in_after_fee)
        .ok_or(LbpError::MathOverflow)?;
    let ratio = mul_div(reserve_in, WAD, new_reserve_in)?;
    let weight_ratio = mul_div(weight_in, WAD, weight_out)?;
    let power = pow_wad(ratio, weight_ratio)?;

    mul_div(reserve_out, WAD - power, WAD)
}

/// Price a swap of `amount_in` against the given reserves
pub fn quote(
    token_reserve: u128,
    funding_reserve: u128,
    weights: Weights,
    fee_bps: u16,
    amount_in: u128,
    buy_token: bool,
) -> Result<SwapQuote> {
    require!(amount_in > 0, LbpError::ZeroAmount);
    require!(token_reserve > 0 && funding_reserve > 0, LbpError::EmptyReserve);

    let (amount_after_fee, fee) = apply_fee(amount_in, fee_bps)?;
    let (weight_in, weight_out) = weights.for_direction(buy_token);
    let (reserve_in, reserve_out) = if buy_token {
        (funding_reserve, token_reserve)
    } else {
        (token_reserve, funding_reserve)
    };

    let amount_out = out_given_in(reserve_in, reserve_out, weight_in, weight_out, amount_after_fee)?;

    require!(amount_out > 0, LbpError::ZeroOutput);
    require!(amount_out <= reserve_out, LbpError::InsufficientLiquidity);
    // reserve_in + amount_in is applied by the caller
    reserve_in.checked_add(amount_in).ok_or(LbpError::MathOverflow)?;

    Ok(SwapQuote {
        buy_token,
        amount_in,
        fee,
        amount_out,
        weights,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::error_code;

    #[test]
    fn test_weights_at_creation() {
        let w = Weights::at(0);
        assert_eq!(w.token, 9091);
        assert_eq!(w.funding, 909);
    }

    #[test]
    fn test_weights_decay_monotonically() {
        let mut previous = Weights::at(0);
        for elapsed in (0..=400u64).map(|i| i * 3_600) {
            let w = Weights::at(elapsed);
            assert_eq!(w.token + w.funding, BPS);
            assert!(w.token <= previous.token);
            assert!(w.token >= 1);
            previous = w;
        }
        // Halved after one timescale
        assert_eq!(Weights::at(86_400).token, 4545);
    }

    #[test]
    fn test_weights_floor_at_one_bp() {
        let w = Weights::at(u64::MAX);
        assert_eq!(w.token, 1);
        assert_eq!(w.funding, 9999);
    }

    #[test]
    fn test_spot_price() {
        let w = Weights::at(0);
        // (1 / 10000) · 9091 / 909
        let price = spot_price(10_000 * WAD, WAD, w).unwrap();
        assert_eq!(price, WAD / 10_000 * 9091 / 909);
        assert_eq!(spot_price(0, WAD, w).unwrap(), 0);
    }

    #[test]
    fn test_apply_fee() {
        assert_eq!(apply_fee(10_000, 30).unwrap(), (9_970, 30));
        assert_eq!(apply_fee(10_000, 0).unwrap(), (10_000, 0));
    }

    #[test]
    fn test_buy_quote() {
        let w = Weights::at(0);
        let q = quote(10_000 * WAD, WAD, w, 0, WAD / 2, true).unwrap();
        // 10000 · (1 − (2/3)^(909/9091)) ≈ 397
        assert!(q.amount_out > 396 * WAD && q.amount_out < 398 * WAD);
        assert_eq!(q.fee, 0);
    }

    #[test]
    fn test_sell_quote_is_bounded_by_funding() {
        let w = Weights::at(0);
        let q = quote(10_000 * WAD, WAD, w, 30, 100 * WAD, false).unwrap();
        assert!(q.amount_out > 0 && q.amount_out < WAD);
        assert_eq!(q.fee, 100 * WAD * 30 / 10_000);
    }

    #[test]
    fn test_quote_rejects_degenerate_input() {
        let w = Weights::at(0);
        assert_eq!(
            error_code(quote(10_000 * WAD, WAD, w, 0, 0, true)),
            u32::from(LbpError::ZeroAmount)
        );
        assert_eq!(
            error_code(quote(0, WAD, w, 0, WAD, true)),
            u32::from(LbpError::EmptyReserve)
        );
        // Dust input against a one-unit reserve rounds to zero output
        assert_eq!(
            error_code(quote(1, WAD, w, 0, 1, true)),
            u32::from(LbpError::ZeroOutput)
        );
    }
}
