//! Position Token Ledger
//!
//! Each pool's tradable asset is an internal fungible ledger rather than an
//! SPL mint: settlement must enumerate holders, and balances need 1e18
//! precision beyond the range of a u64 token amount.
//!
//! The pool's own balance is its `token_reserve`; the pool never appears in
//! the holder list.
//!
//! The account grows by one `Holder` entry whenever an instruction may
//! register a new holder (`realloc` in `Swap` and `TransferPosition`).

use anchor_lang::prelude::*;

use crate::amm::fixed_point::mul_div;
use crate::constants::{BPS, MAX_NAME_LENGTH, MAX_SYMBOL_LENGTH, MAX_URI_LENGTH};
use crate::errors::LbpError;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, InitSpace, Debug, Default)]
pub struct Holder {
    pub owner: Pubkey,
    pub balance: u128,
    /// Reward tokens distributed to this holder and not yet claimed
    pub reward: u128,
}

/// Position token of a single pool
///
/// Seeds: ["position", pool]
#[account]
pub struct PositionToken {
    pub pool: Pubkey,

    /// Fixed at creation; never minted or burned afterwards
    pub total_supply: u128,

    pub name: String,
    pub symbol: String,
    pub uri: String,

    /// Holders in order of first receipt
    pub holders: Vec<Holder>,

    /// PDA bump seed
    pub bump: u8,
}

impl PositionToken {
    pub const SEED: &'static [u8] = b"position";

    /// Account size, discriminator included, with room for `holders` entries
    pub const fn space(holders: usize) -> usize {
        8 + 32
            + 16
            + (4 + MAX_NAME_LENGTH)
            + (4 + MAX_SYMBOL_LENGTH)
            + (4 + MAX_URI_LENGTH)
            + 4
            + holders * Holder::INIT_SPACE
            + 1
    }

    /// Account size needed once `owner` has been credited
    pub fn space_after_credit(&self, owner: &Pubkey) -> usize {
        let registered = self.holders.len();
        if *owner == self.pool || self.find(owner).is_some() {
            Self::space(registered)
        } else {
            Self::space(registered + 1)
        }
    }

    pub fn validate_metadata(name: &str, symbol: &str, uri: &str) -> Result<()> {
        require!(name.len() <= MAX_NAME_LENGTH, LbpError::MetadataTooLong);
        require!(symbol.len() <= MAX_SYMBOL_LENGTH, LbpError::MetadataTooLong);
        require!(uri.len() <= MAX_URI_LENGTH, LbpError::MetadataTooLong);
        Ok(())
    }

    pub fn balance_of(&self, owner: &Pubkey) -> u128 {
        self.find(owner).map_or(0, |i| self.holders[i].balance)
    }

    pub fn reward_of(&self, owner: &Pubkey) -> u128 {
        self.find(owner).map_or(0, |i| self.holders[i].reward)
    }

    /// Holders in registration order, zero balances included
    pub fn holders(&self) -> &[Holder] {
        &self.holders
    }

    /// Sum of all holder balances; equals the pool's owned supply
    pub fn circulating(&self) -> u128 {
        self.holders.iter().map(|h| h.balance).sum()
    }

    fn find(&self, owner: &Pubkey) -> Option<usize> {
        self.holders.iter().position(|h| h.owner == *owner)
    }

    /// Add `amount` to `owner`, registering them on first receipt
    pub fn credit(&mut self, owner: Pubkey, amount: u128) -> Result<()> {
        require!(amount > 0, LbpError::ZeroAmount);
        require!(owner != self.pool, LbpError::InvalidRecipient);
        match self.find(&owner) {
            Some(i) => {
                let holder = &mut self.holders[i];
                holder.balance = holder
                    .balance
                    .checked_add(amount)
                    .ok_or(LbpError::MathOverflow)?;
            }
            None => self.holders.push(Holder {
                owner,
                balance: amount,
                reward: 0,
            }),
        }
        Ok(())
    }

    /// Remove `amount` from `owner`; the entry stays registered at zero
    pub fn debit(&mut self, owner: &Pubkey, amount: u128) -> Result<()> {
        require!(amount > 0, LbpError::ZeroAmount);
        let i = self.find(owner).ok_or(LbpError::InsufficientBalance)?;
        let holder = &mut self.holders[i];
        require!(holder.balance >= amount, LbpError::InsufficientBalance);
        holder.balance -= amount;
        Ok(())
    }

    pub fn transfer(&mut self, from: &Pubkey, to: Pubkey, amount: u128) -> Result<()> {
        require!(amount > 0, LbpError::ZeroAmount);
        require!(to != self.pool, LbpError::InvalidRecipient);
        require!(self.balance_of(from) >= amount, LbpError::InsufficientBalance);
        if *from == to {
            return Ok(());
        }
        self.debit(from, amount)?;
        self.credit(to, amount)
    }

    /// Winners and their share in bps of `owned_supply`
    ///
    /// Holders with a zero balance and the pool itself are skipped. The last
    /// winner absorbs the rounding remainder so the shares sum to exactly
    /// 10000.
    pub fn winner_shares(&self, owned_supply: u128) -> Result<(Vec<Pubkey>, Vec<u64>)> {
        require!(owned_supply > 0, LbpError::NoOwnedSupply);

        let winners: Vec<&Holder> = self
            .holders
            .iter()
            .filter(|h| h.balance > 0 && h.owner != self.pool)
            .collect();
        require!(!winners.is_empty(), LbpError::NoOwnedSupply);

        let mut shares = Vec::with_capacity(winners.len());
        let mut allocated: u64 = 0;
        for holder in &winners[..winners.len() - 1] {
            let share = mul_div(holder.balance, BPS, owned_supply)? as u64;
            allocated = allocated.checked_add(share).ok_or(LbpError::MathOverflow)?;
            shares.push(share);
        }
        let remainder = (BPS as u64)
            .checked_sub(allocated)
            .ok_or(LbpError::InvalidShares)?;
        shares.push(remainder);

        Ok((winners.iter().map(|h| h.owner).collect(), shares))
    }

    /// Record distributed reward for `owner`
    pub fn credit_reward(&mut self, owner: &Pubkey, amount: u128) -> Result<()> {
        let i = self.find(owner).ok_or(LbpError::PoolMismatch)?;
        let holder = &mut self.holders[i];
        holder.reward = holder
            .reward
            .checked_add(amount)
            .ok_or(LbpError::MathOverflow)?;
        Ok(())
    }

    /// Take the whole unclaimed reward of `owner`
    pub fn take_reward(&mut self, owner: &Pubkey) -> Result<u128> {
        let i = self.find(owner).ok_or(LbpError::NothingToClaim)?;
        let amount = self.holders[i].reward;
        require!(amount > 0, LbpError::NothingToClaim);
        self.holders[i].reward = 0;
        Ok(amount)
    }
}
