use anchor_lang::prelude::*;

#[error_code]
pub enum LbpError {
    // --- InvalidInput ---
    #[msg("Amount must be greater than zero")]
    ZeroAmount,
    #[msg("Funding amount outside the configured range")]
    FundingOutOfRange,
    #[msg("Round duration outside the configured range")]
    DurationOutOfRange,
    #[msg("Swap fee exceeds the protocol maximum")]
    FeeTooHigh,
    #[msg("Invalid reward curve or range parameters")]
    InvalidCurveParams,
    #[msg("Winners and shares lengths differ")]
    LengthMismatch,
    #[msg("No winners to distribute to")]
    EmptyWinners,
    #[msg("Shares must sum to 10000 bps")]
    InvalidShares,
    #[msg("Amount too small to mint any reward tokens")]
    AmountTooSmall,
    #[msg("Metadata exceeds maximum length")]
    MetadataTooLong,
    #[msg("A pool cannot hold its own position tokens")]
    InvalidRecipient,

    // --- InvalidState ---
    #[msg("Pool is already settled or liquidated")]
    PoolNotActive,
    #[msg("Round is already settled")]
    RoundSettled,
    #[msg("Round has not ended yet")]
    RoundNotEnded,
    #[msg("Round has already ended")]
    RoundEnded,
    #[msg("Pool has no owned supply")]
    NoOwnedSupply,
    #[msg("Bonus pool is empty")]
    EmptyBonusPool,
    #[msg("Pool price is above its liquidation price")]
    PriceAboveLiquidation,
    #[msg("Protocol is paused")]
    Paused,
    #[msg("Reentrant call into a locked pool or curve")]
    Reentrancy,
    #[msg("Account does not belong to this round or pool")]
    PoolMismatch,
    #[msg("No distributed reward to claim")]
    NothingToClaim,

    // --- InsufficientLiquidity ---
    #[msg("Output exceeds available reserve")]
    InsufficientLiquidity,
    #[msg("Swap output is zero")]
    ZeroOutput,
    #[msg("Pool reserve is empty")]
    EmptyReserve,
    #[msg("Reward curve does not hold enough funding")]
    InsufficientCurveFunding,
    #[msg("Output below the requested minimum")]
    SlippageExceeded,

    // --- InsufficientBalance ---
    #[msg("Balance too low")]
    InsufficientBalance,

    // --- Unauthorized ---
    #[msg("Caller is not authorized")]
    Unauthorized,

    // --- CapacityExceeded ---
    #[msg("Round has no room for more pools")]
    RoundFull,

    // --- ArithmeticGuard ---
    #[msg("Math operation overflow")]
    MathOverflow,
    #[msg("Division by zero")]
    DivisionByZero,
}

/// Failure category of an `LbpError`, for callers deciding whether to resubmit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    InvalidState,
    InsufficientLiquidity,
    InsufficientBalance,
    Unauthorized,
    CapacityExceeded,
    ArithmeticGuard,
}

impl LbpError {
    pub fn kind(&self) -> ErrorKind {
        use LbpError::*;
        match self {
            ZeroAmount | FundingOutOfRange | DurationOutOfRange | FeeTooHigh
            | InvalidCurveParams | LengthMismatch | EmptyWinners | InvalidShares
            | AmountTooSmall | MetadataTooLong | InvalidRecipient => ErrorKind::InvalidInput,
            PoolNotActive | RoundSettled | RoundNotEnded | RoundEnded | NoOwnedSupply
            | EmptyBonusPool | PriceAboveLiquidation | Paused | Reentrancy | PoolMismatch
            | NothingToClaim => ErrorKind::InvalidState,
            InsufficientLiquidity | ZeroOutput | EmptyReserve | InsufficientCurveFunding
            | SlippageExceeded => {
                ErrorKind::InsufficientLiquidity
            }
            InsufficientBalance => ErrorKind::InsufficientBalance,
            Unauthorized => ErrorKind::Unauthorized,
            RoundFull => ErrorKind::CapacityExceeded,
            MathOverflow | DivisionByZero => ErrorKind::ArithmeticGuard,
        }
    }
}

/// Anchor error code carried by a failed result, for asserting in tests.
#[cfg(test)]
pub(crate) fn error_code<T: std::fmt::Debug>(result: Result<T>) -> u32 {
    match result {
        Err(anchor_lang::error::Error::AnchorError(e)) => e.error_code_number,
        other => panic!("expected an anchor error, got {:?}", other),
    }
}
