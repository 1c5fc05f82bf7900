//! Instruction handlers for the round orchestrator
//!
//! - `initialize` - Create the orchestrator, vault and first round (once)
//! - `admin` - Update parameters, pause and unpause (admin only)
//! - `create_pool` - Open a pool in the current round (permissionless)
//! - `swap` - Buy position tokens or sell them into reward tokens
//! - `position` - Transfer position tokens between holders
//! - `liquidate` - Close a pool whose price collapsed (permissionless)
//! - `settle` - Settle a round and roll over to the next one
//! - `reward` - Burn reward tokens for funding, claim distributed bonus
//! - `views` - Read-only queries returned as return data

pub mod admin;
pub mod create_pool;
pub mod initialize;
pub mod liquidate;
pub mod position;
pub mod reward;
pub mod settle;
pub mod swap;
pub mod views;

pub use admin::*;
pub use create_pool::*;
pub use initialize::*;
pub use liquidate::*;
pub use position::*;
pub use reward::*;
pub use settle::*;
pub use swap::*;
pub use views::*;
