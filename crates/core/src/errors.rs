//! # Core Error Types
//!
//! Error types for the fixed-point math, position math and swap-quote layers.

use thiserror::Error;

/// Errors raised by the math and single-pool quoting layers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub enum CoreError {
    // ========================================================================
    // Math errors
    // ========================================================================
    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    #[error("arithmetic underflow")]
    ArithmeticUnderflow,

    #[error("division by zero")]
    DivideByZero,

    #[error("conversion error")]
    ConversionError,

    // ========================================================================
    // Validation errors
    // ========================================================================
    #[error("tick {0} out of bounds [{1}, {2}]")]
    TickOutOfBounds(i32, i32, i32),

    #[error("sqrt price {0} out of bounds [{1}, {2}]")]
    SqrtPriceOutOfBounds(u128, u128, u128),

    #[error("invalid tick range: lower {0} must be less than upper {1}")]
    InvalidTickRange(i32, i32),

    #[error("input mint does not match either of the pool's mints")]
    InputMintMismatch,

    // ========================================================================
    // Swap and liquidity errors
    // ========================================================================
    #[error("insufficient tick arrays to satisfy the requested amount")]
    InsufficientTickArrays,

    #[error("zero liquidity")]
    ZeroLiquidity,

    #[error("price limit reached before the requested amount was filled")]
    PriceLimitReached,

    // ========================================================================
    // Fetch errors (surfaced when a route can't be completed, see CoreError::is_fatal)
    // ========================================================================
    #[error("pool not found: {0}")]
    PoolNotFound(String),

    #[error("tick array not found: {0}")]
    TickArrayNotFound(String),
}

/// Result type using core errors.
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Errors that should abort an entire `findBestRoutes` call rather than
    /// just drop the one route/percent that triggered them.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CoreError::ArithmeticOverflow | CoreError::ArithmeticUnderflow | CoreError::DivideByZero
        )
    }
}
