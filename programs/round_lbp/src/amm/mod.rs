//! # Pricing Math
//!
//! Pure functions behind the two markets of a round:
//!
//! ```text
//!   position token ⇄ funding        weighted pool, decaying weights
//!          │                              (weighted.rs)
//!          │ sell proceeds / bonus
//!          ▼
//!   funding → reward token           linear bonding curve
//!                                         (linear_curve.rs)
//! ```
//!
//! Both build on the 1e18 fixed-point helpers in `fixed_point.rs`. Nothing
//! here touches accounts, so quoting off-chain and executing on-chain run
//! the same code.

pub mod fixed_point;
pub mod linear_curve;
pub mod weighted;

pub use linear_curve::*;
pub use weighted::*;
