//! Per-instance reentrancy lock for pools and reward curves.

use anchor_lang::prelude::*;

use crate::errors::LbpError;

pub trait NonReentrant: Sized {
    fn lock_flag(&mut self) -> &mut bool;

    /// Run `f` with this instance locked; nested entry fails with `Reentrancy`
    fn non_reentrant<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        require!(!*self.lock_flag(), LbpError::Reentrancy);
        *self.lock_flag() = true;
        let result = f(self);
        *self.lock_flag() = false;
        result
    }
}
