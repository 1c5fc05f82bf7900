//! # Fixed-Point Math
//!
//! All prices, ratios and weights inside the engine are 18-decimal fixed
//! point (`WAD` = 1.0). Products go through a 256-bit intermediate so that
//! reserves in the 1e22 range can be scaled without overflow.
//!
//! The weighted swap needs `base^exponent` for `base ≤ 1`. It is evaluated
//! as `exp(exponent · ln(base))` with integer series, so every caller
//! (execution and quoting alike) gets the same bits.
//!
//! ```text
//! ln(x)  = ln(m) − k·ln2,     m = x·2^k ∈ [1, 2)
//! ln(m)  = 2·atanh(z),        z = (m − 1)/(m + 1) ∈ [0, 1/3)
//! exp(y) = exp(r) / 2^k,      y = r − k·ln2, r ∈ (−ln2, 0]
//! ```

use anchor_lang::prelude::*;

use crate::constants::WAD;
use crate::errors::LbpError;

// `construct_uint!` must not see the prelude's one-parameter `Result`
mod wide {
    use uint::construct_uint;

    construct_uint! {
        /// 256-bit unsigned integer for intermediate products.
        pub struct U256(4);
    }
}

pub use wide::U256;

const WAD_I: i128 = WAD as i128;

/// ln(2) in WAD
const LN2: i128 = 693_147_180_559_945_309;

/// exp(y) rounds to zero in WAD for any y below this bound (≈ −41.45)
const MIN_EXPONENT: i128 = -42 * WAD_I;

/// Narrow a 256-bit value back to u128
pub fn to_u128(value: U256) -> Result<u128> {
    require!(value <= U256::from(u128::MAX), LbpError::MathOverflow);
    Ok(value.low_u128())
}

/// floor(a · b / denominator) without intermediate overflow
pub fn mul_div(a: u128, b: u128, denominator: u128) -> Result<u128> {
    require!(denominator != 0, LbpError::DivisionByZero);
    let product = U256::from(a) * U256::from(b);
    to_u128(product / U256::from(denominator))
}

/// a · b in WAD, rounded down
pub fn wad_mul(a: u128, b: u128) -> Result<u128> {
    mul_div(a, b, WAD)
}

/// a / b in WAD, rounded down
pub fn wad_div(a: u128, b: u128) -> Result<u128> {
    mul_div(a, WAD, b)
}

/// Integer square root (Babylonian method)
///
/// Computes floor(√x).
pub fn sqrt(x: U256) -> U256 {
    if x.is_zero() {
        return U256::zero();
    }

    let mut y = x;
    let mut z = (x + U256::one()) >> 1;
    while z < y {
        y = z;
        z = (x / z + z) >> 1;
    }
    y
}

/// Natural logarithm of `x ∈ (0, WAD]`, result in WAD (≤ 0)
pub fn ln_wad(x: u128) -> Result<i128> {
    require!(x > 0, LbpError::DivisionByZero);
    require!(x <= WAD, LbpError::MathOverflow);

    // Normalize into [WAD, 2·WAD)
    let mut m = x;
    let mut k: i128 = 0;
    while m < WAD {
        m <<= 1;
        k += 1;
    }

    let z = ((m - WAD) * WAD / (m + WAD)) as i128;
    let z_squared = z * z / WAD_I;

    let mut term = z;
    let mut sum = z;
    let mut n: i128 = 1;
    loop {
        term = term * z_squared / WAD_I;
        n += 2;
        let next = term / n;
        if next == 0 {
            break;
        }
        sum += next;
    }

    Ok((2 * sum - k * LN2).min(0))
}

/// e^y for `y ≤ 0` in WAD
pub fn exp_wad(y: i128) -> Result<u128> {
    require!(y <= 0, LbpError::MathOverflow);
    if y == 0 {
        return Ok(WAD);
    }
    if y < MIN_EXPONENT {
        return Ok(0);
    }

    let k = -y / LN2;
    let r = y + k * LN2;

    // Taylor series of e^r, r ∈ (−ln2, 0]
    let mut term = WAD_I;
    let mut sum = WAD_I;
    let mut n: i128 = 1;
    loop {
        term = term * r / (WAD_I * n);
        if term == 0 {
            break;
        }
        sum += term;
        n += 1;
    }

    Ok((sum as u128) >> (k as u32))
}

/// base^exponent for `base ∈ [0, WAD]`, both in WAD
pub fn pow_wad(base: u128, exponent: u128) -> Result<u128> {
    require!(base <= WAD, LbpError::MathOverflow);
    if exponent == 0 || base == WAD {
        return Ok(WAD);
    }
    if base == 0 {
        return Ok(0);
    }

    let ln = ln_wad(base)?;
    let exponent = i128::try_from(exponent).map_err(|_| error!(LbpError::MathOverflow))?;

    // ln < 0 here, so an overflowing product is far below MIN_EXPONENT
    match ln.checked_mul(exponent) {
        Some(product) => exp_wad(product / WAD_I),
        None => Ok(0),
    }
}

// ============================================================================
// TESTS
// ============================================================================
