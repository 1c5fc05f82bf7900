//! Round Lifecycle
//!
//! A round is a fixed time window in which pools compete for owned supply.
//! At settlement the pool with the strictly largest owned supply wins (ties
//! go to the pool created first), every other active pool is liquidated,
//! and the bonus pool is minted for the winner's holders.
//!
//! ```text
//!   Open ──settle──► Settled
//! ```
//!
//! Exactly one round is open at a time; `start_round` refuses to open the
//! next one before the current one has ended and is settled.

use anchor_lang::prelude::*;

use crate::constants::MAX_POOLS_PER_ROUND;
use crate::errors::LbpError;
use crate::state::{Pool, PositionToken, RewardCurve};

/// Permission to close pools on behalf of the round
///
/// Only `Round::settle` can construct one.
pub struct OrchestratorCap {
    _sealed: (),
}

impl OrchestratorCap {
    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        OrchestratorCap { _sealed: () }
    }
}

/// Round account
///
/// Seeds: ["round", round_id]
#[account]
#[derive(InitSpace)]
pub struct Round {
    pub id: u64,
    pub start_time: i64,
    pub duration: i64,
    pub end_time: i64,

    /// Pools in creation order
    #[max_len(12)]
    pub pools: Vec<Pubkey>,

    pub winner: Option<Pubkey>,
    pub settled: bool,
    pub settled_at: i64,

    pub reward_curve: Pubkey,

    /// PDA bump seed
    pub bump: u8,
}

/// A pool of the round with its position ledger, loaded for settlement
pub struct PoolEntry<'a> {
    pub key: Pubkey,
    pub pool: &'a mut Pool,
    pub position: &'a mut PositionToken,
}

/// What settlement did, for logging and events
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct RoundSettlement {
    pub winner: Option<Pubkey>,
    /// Funding the winning pool released into the bonus pool
    pub winner_released: u128,
    /// (pool, funding released) for each pool liquidated at settlement
    pub liquidated: Vec<(Pubkey, u128)>,
    /// Bonus pool at distribution time
    pub bonus: u128,
    /// Winning holders and the reward minted for each
    pub recipients: Vec<Pubkey>,
    pub rewards: Vec<u128>,
}

impl Round {
    pub const SEED: &'static [u8] = b"round";

    pub fn open(
        &mut self,
        id: u64,
        now: i64,
        duration: i64,
        reward_curve: Pubkey,
        bump: u8,
    ) -> Result<()> {
        self.id = id;
        self.start_time = now;
        self.duration = duration;
        self.end_time = now.checked_add(duration).ok_or(LbpError::MathOverflow)?;
        self.pools = Vec::new();
        self.winner = None;
        self.settled = false;
        self.settled_at = 0;
        self.reward_curve = reward_curve;
        self.bump = bump;
        Ok(())
    }

    pub fn has_ended(&self, now: i64) -> bool {
        now >= self.end_time
    }

    pub fn ensure_ended(&self, now: i64) -> Result<()> {
        require!(self.has_ended(now), LbpError::RoundNotEnded);
        Ok(())
    }

    /// Gate for `settle_round`; `early` lifts the end-time requirement
    pub fn ensure_settleable(&self, now: i64, early: bool) -> Result<()> {
        require!(!self.settled, LbpError::RoundSettled);
        if !early {
            self.ensure_ended(now)?;
        }
        Ok(())
    }

    /// Whether opening the next round has to settle this one first
    ///
    /// Fails while the round is still running.
    pub fn settle_before_rollover(&self, now: i64) -> Result<bool> {
        self.ensure_ended(now)?;
        Ok(!self.settled)
    }

    pub fn ensure_open(&self, now: i64) -> Result<()> {
        require!(!self.settled, LbpError::RoundSettled);
        require!(!self.has_ended(now), LbpError::RoundEnded);
        Ok(())
    }

    pub fn register_pool(&mut self, now: i64, pool: Pubkey) -> Result<()> {
        self.ensure_open(now)?;
        require!(self.pools.len() < MAX_POOLS_PER_ROUND, LbpError::RoundFull);
        self.pools.push(pool);
        Ok(())
    }

    /// Settle the round over its pools, given in registration order
    pub fn settle(
        &mut self,
        now: i64,
        entries: &mut [PoolEntry<'_>],
        curve: &mut RewardCurve,
    ) -> Result<RoundSettlement> {
        require!(!self.settled, LbpError::RoundSettled);
        require!(curve.round_id == self.id, LbpError::PoolMismatch);
        require!(entries.len() == self.pools.len(), LbpError::PoolMismatch);
        for (entry, key) in entries.iter().zip(self.pools.iter()) {
            require!(entry.key == *key, LbpError::PoolMismatch);
            require!(entry.pool.round_id == self.id, LbpError::PoolMismatch);
        }

        let cap = OrchestratorCap { _sealed: () };
        let owned: Vec<u128> = entries.iter().map(|e| e.pool.owned_supply()).collect();
        let winner_index = select_winner(&owned);

        let mut settlement = RoundSettlement::default();

        let shares = match winner_index {
            Some(w) => {
                let entry = &mut entries[w];
                settlement.winner = Some(entry.key);
                settlement.winner_released = entry.pool.funding_reserve;
                Some(entry.pool.settle_as_winner(&cap, &*entry.position, curve)?)
            }
            None => None,
        };

        for (i, entry) in entries.iter_mut().enumerate() {
            if Some(i) == winner_index || !entry.pool.is_active() {
                continue;
            }
            let released = entry.pool.force_liquidate(&cap, curve)?;
            settlement.liquidated.push((entry.key, released));
        }

        settlement.bonus = curve.bonus_pool;
        match (winner_index, shares) {
            (Some(w), Some((winners, shares))) if curve.bonus_pool > 0 => {
                let rewards = curve.distribute(&winners, &shares)?;
                let position = &mut *entries[w].position;
                for (holder, amount) in winners.iter().zip(rewards.iter()) {
                    position.credit_reward(holder, *amount)?;
                }
                settlement.recipients = winners;
                settlement.rewards = rewards;
            }
            _ => {
                curve.absorb_bonus()?;
            }
        }

        self.winner = settlement.winner;
        self.settled = true;
        self.settled_at = now;
        Ok(settlement)
    }
}

/// Index of the strictly largest positive owned supply, earliest on ties
pub fn select_winner(owned: &[u128]) -> Option<usize> {
    let mut best: Option<(usize, u128)> = None;
    for (i, supply) in owned.iter().enumerate() {
        if *supply == 0 {
            continue;
        }
        match best {
            Some((_, top)) if *supply <= top => {}
            _ => best = Some((i, *supply)),
        }
    }
    best.map(|(i, _)| i)
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
    use crate::state::{PoolInit, PoolStatus, RewardAccount};

    const T0: i64 = 1_700_000_000;
    const DURATION: i64 = 86_400;

    struct Fixture {
        round: Round,
        curve: RewardCurve,
        keys: Vec<Pubkey>,
        pools: Vec<Pool>,
        positions: Vec<PositionToken>,
    }

    impl Fixture {
        fn new(pool_count: usize) -> Self {
            let mut round = Round {
                id: 0,
                start_time: 0,
                duration: 0,
                end_time: 0,
                pools: Vec::new(),
                winner: None,
                settled: false,
                settled_at: 0,
                reward_curve: Pubkey::default(),
                bump: 0,
            };
            round.open(1, T0, DURATION, Pubkey::new_unique(), 250).unwrap();

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

            let mut fixture = Fixture {
                round,
                curve,
                keys: Vec::new(),
                pools: Vec::new(),
                positions: Vec::new(),
            };
            for id in 0..pool_count {
                fixture.add_pool(id as u64);
            }
            fixture
        }

        fn add_pool(&mut self, id: u64) {
            let key = Pubkey::new_unique();
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
                id,
                round_id: 1,
                creator: Pubkey::new_unique(),
                position_token: Pubkey::new_unique(),
                reward_curve: self.round.reward_curve,
                fee_bps: 0,
                created_at: T0,
                token_supply: 100_000 * WAD,
                funding: WAD,
                bump: 255,
            })
            .unwrap();
            self.round.register_pool(T0, key).unwrap();
            self.keys.push(key);
            self.pools.push(pool);
            self.positions.push(PositionToken {
                pool: key,
                total_supply: 100_000 * WAD,
                name: format!("Pool {}", id),
                symbol: "P".to_string(),
                uri: String::new(),
                holders: Vec::new(),
                bump: 255,
            });
        }

        /// Hand `amount` position tokens of pool `i` to `owner`
        fn hold(&mut self, i: usize, owner: Pubkey, amount: u128) {
            self.positions[i].credit(owner, amount).unwrap();
            self.pools[i].token_reserve -= amount;
        }

        fn settle(&mut self, now: i64) -> Result<RoundSettlement> {
            let mut entries: Vec<PoolEntry> = self
                .keys
                .iter()
                .zip(self.pools.iter_mut())
                .zip(self.positions.iter_mut())
                .map(|((key, pool), position)| PoolEntry {
                    key: *key,
                    pool,
                    position,
                })
                .collect();
            self.round.settle(now, &mut entries, &mut self.curve)
        }
    }

    #[test]
    fn test_select_winner() {
        assert_eq!(select_winner(&[2_000, 0, 8_000]), Some(2));
        assert_eq!(select_winner(&[5, 9, 9]), Some(1));
        assert_eq!(select_winner(&[0, 0]), None);
        assert_eq!(select_winner(&[]), None);
    }

    #[test]
    fn test_register_pool_bounds() {
        let mut f = Fixture::new(0);
        for _ in 0..MAX_POOLS_PER_ROUND {
            f.round.register_pool(T0, Pubkey::new_unique()).unwrap();
        }
        assert_eq!(
            error_code(f.round.register_pool(T0, Pubkey::new_unique())),
            u32::from(LbpError::RoundFull)
        );

        let mut f = Fixture::new(0);
        assert_eq!(
            error_code(f.round.register_pool(T0 + DURATION, Pubkey::new_unique())),
            u32::from(LbpError::RoundEnded)
        );
    }

    #[test]
    fn test_settle_window() {
        let mut f = Fixture::new(1);
        assert_eq!(
            error_code(f.round.ensure_settleable(T0 + DURATION - 1, false)),
            u32::from(LbpError::RoundNotEnded)
        );
        assert!(f.round.ensure_settleable(T0 + 1, true).is_ok());
        assert!(f.round.ensure_settleable(T0 + DURATION, false).is_ok());

        f.settle(T0 + DURATION).unwrap();
        assert_eq!(
            error_code(f.round.ensure_settleable(T0 + DURATION, false)),
            u32::from(LbpError::RoundSettled)
        );
        assert_eq!(
            error_code(f.round.ensure_settleable(T0 + DURATION, true)),
            u32::from(LbpError::RoundSettled)
        );
    }

    #[test]
    fn test_rollover_settles_ended_round_first() {
        let mut f = Fixture::new(2);
        let holder = Pubkey::new_unique();
        f.hold(1, holder, WAD);

        assert_eq!(
            error_code(f.round.settle_before_rollover(T0 + DURATION - 1)),
            u32::from(LbpError::RoundNotEnded)
        );
        assert!(!f.round.settled);

        // Exactly at end_time
        let now = T0 + DURATION;
        if f.round.settle_before_rollover(now).unwrap() {
            f.settle(now).unwrap();
        }
        assert!(f.round.settled);
        assert_eq!(f.round.winner, Some(f.keys[1]));
        assert_eq!(f.pools[0].status, PoolStatus::Liquidated);
        assert_eq!(f.pools[1].status, PoolStatus::Settled);

        // Already settled: the next rollover goes straight ahead
        assert!(!f.round.settle_before_rollover(now + 1).unwrap());
    }

    #[test]
    fn test_three_pool_settlement() {
        let mut f = Fixture::new(3);
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        let c = Pubkey::new_unique();
        let d = Pubkey::new_unique();
        f.hold(0, a, 2_000 * WAD);
        f.hold(2, b, 6_000 * WAD);
        f.hold(2, c, 2_000 * WAD);

        let settlement = f.settle(T0 + DURATION).unwrap();

        assert_eq!(settlement.winner, Some(f.keys[2]));
        assert_eq!(f.round.winner, Some(f.keys[2]));
        assert!(f.round.settled);
        assert_eq!(f.round.settled_at, T0 + DURATION);

        assert_eq!(f.pools[0].status, PoolStatus::Liquidated);
        assert_eq!(f.pools[1].status, PoolStatus::Liquidated);
        assert_eq!(f.pools[2].status, PoolStatus::Settled);
        assert_eq!(
            settlement.liquidated,
            vec![(f.keys[0], WAD), (f.keys[1], WAD)]
        );

        // All three pools' funding was minted for the winner's holders
        assert_eq!(settlement.bonus, 3 * WAD);
        assert_eq!(f.curve.bonus_pool, 0);
        assert_eq!(f.curve.funding_balance, 3 * WAD);
        assert_eq!(settlement.recipients, vec![b, c]);

        let total = settlement.rewards.iter().sum::<u128>();
        assert_eq!(f.curve.total_supply, total);
        assert_eq!(f.positions[2].reward_of(&b), settlement.rewards[0]);
        assert_eq!(f.positions[2].reward_of(&c), settlement.rewards[1]);
        // 7500 / 2500 bps
        assert_eq!(settlement.rewards[0] / 3, settlement.rewards[1]);
        assert_eq!(f.positions[0].reward_of(&a), 0);
        assert_eq!(f.positions[2].reward_of(&d), 0);
    }

    #[test]
    fn test_second_settlement_fails_without_changes() {
        let mut f = Fixture::new(2);
        f.hold(1, Pubkey::new_unique(), WAD);
        f.settle(T0 + DURATION).unwrap();

        let supply = f.curve.total_supply;
        assert_eq!(
            error_code(f.settle(T0 + DURATION + 1)),
            u32::from(LbpError::RoundSettled)
        );
        assert_eq!(f.round.settled_at, T0 + DURATION);
        assert_eq!(f.curve.total_supply, supply);
    }

    #[test]
    fn test_zero_winner_round() {
        let mut f = Fixture::new(2);
        let settlement = f.settle(T0 + DURATION).unwrap();

        assert_eq!(settlement.winner, None);
        assert_eq!(f.round.winner, None);
        assert!(f.round.settled);
        assert!(f.pools.iter().all(|p| p.status == PoolStatus::Liquidated));
        assert_eq!(f.curve.bonus_pool, 0);
        assert_eq!(f.curve.funding_balance, 2 * WAD);
        assert_eq!(f.curve.total_supply, 0);
        assert!(settlement.rewards.is_empty());
    }

    #[test]
    fn test_empty_round_settles() {
        let mut f = Fixture::new(0);
        let settlement = f.settle(T0 + DURATION).unwrap();
        assert_eq!(settlement.winner, None);
        assert!(f.round.settled);
    }

    #[test]
    fn test_previously_liquidated_pool_is_skipped() {
        let mut f = Fixture::new(2);
        let holder = Pubkey::new_unique();
        f.hold(1, holder, WAD);
        f.pools[0]
            .force_liquidate(&OrchestratorCap::for_tests(), &mut f.curve)
            .unwrap();

        let settlement = f.settle(T0 + DURATION).unwrap();
        assert_eq!(settlement.winner, Some(f.keys[1]));
        assert_eq!(settlement.winner_released, WAD);
        assert!(settlement.liquidated.is_empty());
        assert_eq!(settlement.bonus, 2 * WAD);
        assert_eq!(settlement.recipients, vec![holder]);
    }

    #[test]
    fn test_settlement_rejects_mismatched_pools() {
        let mut f = Fixture::new(2);
        f.keys.swap(0, 1);
        assert_eq!(
            error_code(f.settle(T0 + DURATION)),
            u32::from(LbpError::PoolMismatch)
        );
        assert!(!f.round.settled);
        assert!(f.pools.iter().all(Pool::is_active));
    }

    #[test]
    fn test_rewards_flow_into_reward_account() {
        let mut f = Fixture::new(1);
        let holder = Pubkey::new_unique();
        f.hold(0, holder, WAD);
        f.settle(T0 + DURATION).unwrap();

        let mut account = RewardAccount {
            curve: Pubkey::new_unique(),
            owner: holder,
            balance: 0,
            bump: 255,
        };
        let claimed = f.positions[0].take_reward(&holder).unwrap();
        account.credit(claimed).unwrap();
        assert_eq!(account.balance, f.curve.total_supply);

        // Distributed rewards are fully backed and can be burned
        let refund = f.curve.burn_for(&mut account, claimed).unwrap();
        assert!(refund <= WAD);
    }
}
