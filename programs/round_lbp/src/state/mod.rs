//! Account state and the transitions between states

pub mod config;
pub mod guard;
pub mod pool;
pub mod position_token;
pub mod reward_curve;
pub mod round;

pub use config::*;
pub use guard::*;
pub use pool::*;
pub use position_token::*;
pub use reward_curve::*;
pub use round::*;
