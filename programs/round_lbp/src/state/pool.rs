//! Competing Pool
//!
//! A weighted position-token/funding market whose token weight decays from
//! creation. Buys pay out position tokens; sells pay out reward tokens of the
//! round, minted from the funding the pool releases.
//!
//! ```text
//!   Active ──liquidate / force_liquidate──► Liquidated
//!     │
//!     └──────settle_as_winner─────────────► Settled
//! ```
//!
//! Both end states are terminal and release the whole funding reserve into
//! the round's bonus pool.

use anchor_lang::prelude::*;

use crate::amm::{self, SwapQuote, Weights};
use crate::constants::LIQUIDATION_DIVISOR;
use crate::errors::LbpError;
use crate::state::{NonReentrant, OrchestratorCap, PositionToken, RewardAccount, RewardCurve};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, InitSpace, Debug)]
pub enum PoolStatus {
    Active,
    Settled,
    Liquidated,
}

/// Pool account
///
/// Seeds: ["pool", pool_id]
#[account]
#[derive(InitSpace)]
pub struct Pool {
    /// Unique identifier (incrementing)
    pub id: u64,

    /// Round this pool competes in
    pub round_id: u64,

    pub creator: Pubkey,
    pub position_token: Pubkey,
    pub reward_curve: Pubkey,

    /// Swap fee, fixed at creation
    pub fee_bps: u16,

    /// Unix timestamp; weight decay runs from here
    pub created_at: i64,

    /// Position tokens ever issued (immutable)
    pub token_supply: u128,

    /// Position tokens held by the pool
    pub token_reserve: u128,

    /// Funding held by the pool, in vault base units
    pub funding_reserve: u128,

    /// Spot price at creation
    pub initial_price: u128,

    /// `initial_price / 10`; at or below it anyone may liquidate
    pub liquidation_price: u128,

    pub status: PoolStatus,

    pub locked: bool,

    /// PDA bump seed
    pub bump: u8,
}

/// Parameters of a freshly created pool
pub struct PoolInit {
    pub id: u64,
    pub round_id: u64,
    pub creator: Pubkey,
    pub position_token: Pubkey,
    pub reward_curve: Pubkey,
    pub fee_bps: u16,
    pub created_at: i64,
    pub token_supply: u128,
    pub funding: u128,
    pub bump: u8,
}

/// Outcome of an executed swap
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SwapReceipt {
    pub trader: Pubkey,
    pub quote: SwapQuote,
    /// Reward tokens minted on a sell, zero on a buy
    pub reward_minted: u128,
}

impl SwapReceipt {
    /// Position tokens received on a buy, reward tokens received on a sell
    pub fn amount_received(&self) -> u128 {
        if self.quote.buy_token {
            self.quote.amount_out
        } else {
            self.reward_minted
        }
    }
}

impl NonReentrant for Pool {
    fn lock_flag(&mut self) -> &mut bool {
        &mut self.locked
    }
}

impl Pool {
    pub const SEED: &'static [u8] = b"pool";

    pub fn open(&mut self, init: PoolInit) -> Result<()> {
        require!(init.token_supply > 0, LbpError::ZeroAmount);
        require!(init.funding > 0, LbpError::ZeroAmount);

        let initial_price = amm::spot_price(init.token_supply, init.funding, Weights::at(0))?;

        self.id = init.id;
        self.round_id = init.round_id;
        self.creator = init.creator;
        self.position_token = init.position_token;
        self.reward_curve = init.reward_curve;
        self.fee_bps = init.fee_bps;
        self.created_at = init.created_at;
        self.token_supply = init.token_supply;
        self.token_reserve = init.token_supply;
        self.funding_reserve = init.funding;
        self.initial_price = initial_price;
        self.liquidation_price = initial_price / LIQUIDATION_DIVISOR;
        self.status = PoolStatus::Active;
        self.locked = false;
        self.bump = init.bump;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.status == PoolStatus::Active
    }

    pub fn require_active(&self) -> Result<()> {
        require!(self.is_active(), LbpError::PoolNotActive);
        Ok(())
    }

    fn elapsed(&self, now: i64) -> u64 {
        now.saturating_sub(self.created_at).max(0) as u64
    }

    pub fn current_weights(&self, now: i64) -> Weights {
        Weights::at(self.elapsed(now))
    }

    pub fn current_price(&self, now: i64) -> Result<u128> {
        amm::spot_price(self.token_reserve, self.funding_reserve, self.current_weights(now))
    }

    /// Position tokens outside the pool; zero once liquidated
    pub fn owned_supply(&self) -> u128 {
        match self.status {
            PoolStatus::Liquidated => 0,
            _ => self.token_supply - self.token_reserve,
        }
    }

    /// Price a swap exactly as `swap` would execute it at `now`
    pub fn quote_swap(&self, now: i64, amount_in: u128, buy_token: bool) -> Result<SwapQuote> {
        self.require_active()?;
        amm::quote(
            self.token_reserve,
            self.funding_reserve,
            self.current_weights(now),
            self.fee_bps,
            amount_in,
            buy_token,
        )
    }

    /// Execute a swap for `reward.owner`
    ///
    /// A buy credits position tokens to the trader. A sell debits them and
    /// mints reward tokens into `reward` for the released funding.
    pub fn swap(
        &mut self,
        now: i64,
        amount_in: u128,
        buy_token: bool,
        position: &mut PositionToken,
        curve: &mut RewardCurve,
        reward: &mut RewardAccount,
    ) -> Result<SwapReceipt> {
        self.non_reentrant(|pool| {
            require!(curve.round_id == pool.round_id, LbpError::PoolMismatch);
            let trader = reward.owner;
            let quote = pool.quote_swap(now, amount_in, buy_token)?;

            let reward_minted = if buy_token {
                position.credit(trader, quote.amount_out)?;
                pool.funding_reserve += quote.amount_in;
                pool.token_reserve -= quote.amount_out;
                0
            } else {
                require!(
                    position.balance_of(&trader) >= amount_in,
                    LbpError::InsufficientBalance
                );
                curve.quote_mint(quote.amount_out)?;

                position.debit(&trader, amount_in)?;
                pool.token_reserve += quote.amount_in;
                pool.funding_reserve -= quote.amount_out;
                curve.mint_for(reward, quote.amount_out)?
            };

            Ok(SwapReceipt {
                trader,
                quote,
                reward_minted,
            })
        })
    }

    /// Permissionless liquidation once the price has fallen far enough
    ///
    /// Returns the funding moved into the bonus pool.
    pub fn liquidate(&mut self, now: i64, curve: &mut RewardCurve) -> Result<u128> {
        self.require_active()?;
        require!(
            self.current_price(now)? <= self.liquidation_price,
            LbpError::PriceAboveLiquidation
        );
        self.release_to_bonus(curve, PoolStatus::Liquidated)
    }

    /// Liquidation of a losing pool at settlement, regardless of price
    pub fn force_liquidate(&mut self, _cap: &OrchestratorCap, curve: &mut RewardCurve) -> Result<u128> {
        self.require_active()?;
        self.release_to_bonus(curve, PoolStatus::Liquidated)
    }

    /// Close the winning pool and return its winners with shares in bps
    pub fn settle_as_winner(
        &mut self,
        _cap: &OrchestratorCap,
        position: &PositionToken,
        curve: &mut RewardCurve,
    ) -> Result<(Vec<Pubkey>, Vec<u64>)> {
        self.require_active()?;
        let owned = self.owned_supply();
        require!(owned > 0, LbpError::NoOwnedSupply);
        require!(position.circulating() == owned, LbpError::PoolMismatch);

        let (winners, shares) = position.winner_shares(owned)?;
        self.release_to_bonus(curve, PoolStatus::Settled)?;
        Ok((winners, shares))
    }

    fn release_to_bonus(&mut self, curve: &mut RewardCurve, status: PoolStatus) -> Result<u128> {
        require!(curve.round_id == self.round_id, LbpError::PoolMismatch);
        let released = self.funding_reserve;
        curve.deposit_bonus(released)?;
        self.funding_reserve = 0;
        self.status = status;
        Ok(released)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amm::LinearCurve;
    use crate::constants::{DEFAULT_BASE_PRICE, DEFAULT_SLOPE, WAD};
    use crate::errors::error_code;

    const T0: i64 = 1_700_000_000;

    fn pool(token_supply: u128, funding: u128, fee_bps: u16) -> Pool {
        let mut pool = Pool {
            id: 0,
            round_id: 0,
            creator: Pubkey::default(),
            position_token: Pubkey::default(),
            reward_curve: Pubkey::default(),
            fee_bps: 0,
            created_at: 0,
            token_supply: 0,
            token_reserve: 0,
            funding_reserve: 0,
            initial_price: 0,
            liquidation_price: 0,
            status: PoolStatus::Active,
            locked: false,
            bump: 0,
        };
        pool.open(PoolInit {
            id: 7,
            round_id: 1,
            creator: Pubkey::new_unique(),
            position_token: Pubkey::new_unique(),
            reward_curve: Pubkey::new_unique(),
            fee_bps,
            created_at: T0,
            token_supply,
            funding,
            bump: 253,
        })
        .unwrap();
        pool
    }

    fn position() -> PositionToken {
        PositionToken {
            pool: Pubkey::new_unique(),
            total_supply: 10_000 * WAD,
            name: "Pool".to_string(),
            symbol: "P".to_string(),
            uri: String::new(),
            holders: Vec::new(),
            bump: 255,
        }
    }

    fn reward_curve() -> RewardCurve {
        let mut curve = RewardCurve {
            round_id: 0,
            base_price: 0,
            slope: 0,
            total_supply: 0,
            bonus_pool: 0,
            funding_balance: 0,
            locked: false,
            bump: 0,
        };
        curve.open(
            1,
            LinearCurve {
                base_price: DEFAULT_BASE_PRICE,
                slope: DEFAULT_SLOPE,
            },
            254,
        );
        curve
    }

    fn trader() -> RewardAccount {
        RewardAccount {
            curve: Pubkey::new_unique(),
            owner: Pubkey::new_unique(),
            balance: 0,
            bump: 255,
        }
    }

    #[test]
    fn test_open_sets_prices() {
        let p = pool(10_000 * WAD, WAD, 30);
        assert_eq!(p.token_reserve, p.token_supply);
        assert_eq!(p.initial_price, p.current_price(T0).unwrap());
        assert_eq!(p.liquidation_price, p.initial_price / 10);
        assert_eq!(p.owned_supply(), 0);
        assert_eq!(p.current_weights(T0), Weights { token: 9091, funding: 909 });
    }

    #[test]
    fn test_buy_moves_reserves() {
        let mut p = pool(10_000 * WAD, WAD, 0);
        let mut t = position();
        let mut c = reward_curve();
        let mut r = trader();

        let quoted = p.quote_swap(T0, WAD / 2, true).unwrap();
        let receipt = p.swap(T0, WAD / 2, true, &mut t, &mut c, &mut r).unwrap();

        assert_eq!(receipt.quote, quoted);
        assert_eq!(receipt.amount_received(), quoted.amount_out);
        assert_eq!(p.funding_reserve, WAD + WAD / 2);
        assert_eq!(p.token_reserve, 10_000 * WAD - quoted.amount_out);
        assert_eq!(t.balance_of(&r.owner), quoted.amount_out);
        assert_eq!(p.owned_supply(), quoted.amount_out);
        assert!(!p.locked);
    }

    #[test]
    fn test_fee_stays_in_input_reserve() {
        let mut p = pool(10_000 * WAD, WAD, 100);
        let mut t = position();
        let mut c = reward_curve();
        let mut r = trader();

        let receipt = p.swap(T0, WAD, true, &mut t, &mut c, &mut r).unwrap();
        assert_eq!(receipt.quote.fee, WAD / 100);
        assert_eq!(p.funding_reserve, 2 * WAD);
    }

    #[test]
    fn test_sell_mints_reward_tokens() {
        let mut p = pool(10_000 * WAD, WAD, 0);
        let mut t = position();
        let mut c = reward_curve();
        let mut r = trader();

        let bought = p
            .swap(T0, WAD / 2, true, &mut t, &mut c, &mut r)
            .unwrap()
            .quote
            .amount_out;
        let funding_before = p.funding_reserve;

        let sell = p.swap(T0 + 60, bought / 2, false, &mut t, &mut c, &mut r).unwrap();
        assert!(sell.reward_minted > 0);
        assert_eq!(sell.amount_received(), sell.reward_minted);
        assert_eq!(r.balance, sell.reward_minted);
        assert_eq!(c.total_supply, sell.reward_minted);
        assert_eq!(c.funding_balance, sell.quote.amount_out);
        assert_eq!(p.funding_reserve, funding_before - sell.quote.amount_out);
        assert_eq!(t.balance_of(&r.owner), bought - bought / 2);
    }

    #[test]
    fn test_sell_without_balance_changes_nothing() {
        let mut p = pool(10_000 * WAD, WAD, 0);
        let mut t = position();
        let mut c = reward_curve();
        let mut r = trader();

        assert_eq!(
            error_code(p.swap(T0, WAD, false, &mut t, &mut c, &mut r)),
            u32::from(LbpError::InsufficientBalance)
        );
        assert_eq!(p.token_reserve, 10_000 * WAD);
        assert_eq!(p.funding_reserve, WAD);
        assert_eq!(c.total_supply, 0);
    }

    #[test]
    fn test_swap_rejects_wrong_curve() {
        let mut p = pool(10_000 * WAD, WAD, 0);
        let mut t = position();
        let mut c = reward_curve();
        c.round_id = 2;
        let mut r = trader();
        assert_eq!(
            error_code(p.swap(T0, WAD, true, &mut t, &mut c, &mut r)),
            u32::from(LbpError::PoolMismatch)
        );
    }

    #[test]
    fn test_nested_swap_is_rejected() {
        let mut p = pool(10_000 * WAD, WAD, 0);
        let mut t = position();
        let mut c = reward_curve();
        let mut r = trader();

        let nested = p.non_reentrant(|p| p.swap(T0, WAD, true, &mut t, &mut c, &mut r));
        assert_eq!(error_code(nested), u32::from(LbpError::Reentrancy));
        assert_eq!(p.funding_reserve, WAD);
        assert!(!p.locked);
    }

    #[test]
    fn test_liquidate_requires_price_drop() {
        let mut p = pool(10_000 * WAD, WAD, 0);
        let mut c = reward_curve();
        assert_eq!(
            error_code(p.liquidate(T0, &mut c)),
            u32::from(LbpError::PriceAboveLiquidation)
        );

        // One timescale halves the token weight: 4545/5455 against 9091/909
        let later = T0 + 86_400;
        assert!(p.current_price(later).unwrap() <= p.liquidation_price);
        assert_eq!(p.liquidate(later, &mut c).unwrap(), WAD);
        assert_eq!(p.status, PoolStatus::Liquidated);
        assert_eq!(p.funding_reserve, 0);
        assert_eq!(p.owned_supply(), 0);
        assert_eq!(c.bonus_pool, WAD);

        assert_eq!(
            error_code(p.liquidate(later, &mut c)),
            u32::from(LbpError::PoolNotActive)
        );
    }

    #[test]
    fn test_terminal_pool_rejects_swaps() {
        let mut p = pool(10_000 * WAD, WAD, 0);
        let mut t = position();
        let mut c = reward_curve();
        let mut r = trader();
        p.force_liquidate(&OrchestratorCap::for_tests(), &mut c).unwrap();

        assert_eq!(
            error_code(p.swap(T0, WAD, true, &mut t, &mut c, &mut r)),
            u32::from(LbpError::PoolNotActive)
        );
        assert_eq!(
            error_code(p.quote_swap(T0, WAD, true)),
            u32::from(LbpError::PoolNotActive)
        );
    }

    #[test]
    fn test_settle_as_winner() {
        let mut p = pool(10_000 * WAD, WAD, 0);
        let mut t = position();
        let mut c = reward_curve();
        let mut alice = trader();
        let mut bob = trader();

        p.swap(T0, WAD / 4, true, &mut t, &mut c, &mut alice).unwrap();
        p.swap(T0, WAD / 4, true, &mut t, &mut c, &mut bob).unwrap();

        let cap = OrchestratorCap::for_tests();
        let (winners, shares) = p.settle_as_winner(&cap, &t, &mut c).unwrap();
        assert_eq!(winners, vec![alice.owner, bob.owner]);
        assert_eq!(shares.iter().sum::<u64>(), 10_000);
        // The first buyer got more tokens for the same funding
        assert!(shares[0] > shares[1]);
        assert_eq!(p.status, PoolStatus::Settled);
        assert_eq!(c.bonus_pool, WAD + WAD / 2);

        assert_eq!(
            error_code(p.force_liquidate(&cap, &mut c)),
            u32::from(LbpError::PoolNotActive)
        );
    }

    #[test]
    fn test_settle_without_owned_supply_fails() {
        let mut p = pool(10_000 * WAD, WAD, 0);
        let t = position();
        let mut c = reward_curve();
        assert_eq!(
            error_code(p.settle_as_winner(&OrchestratorCap::for_tests(), &t, &mut c)),
            u32::from(LbpError::NoOwnedSupply)
        );
        assert!(p.is_active());
    }

    #[test]
    fn test_settle_rejects_ledger_out_of_step() {
        let mut p = pool(10_000 * WAD, WAD, 0);
        let mut t = position();
        let mut c = reward_curve();
        t.credit(Pubkey::new_unique(), WAD).unwrap();
        p.token_reserve -= 2 * WAD;

        assert_eq!(
            error_code(p.settle_as_winner(&OrchestratorCap::for_tests(), &t, &mut c)),
            u32::from(LbpError::PoolMismatch)
        );
        assert!(p.is_active());
        assert_eq!(c.bonus_pool, 0);
    }
}
