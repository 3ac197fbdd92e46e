//! # Router Error Types
//!
//! Errors raised while assembling and ranking split routes across hops.

use clamm_core::errors::CoreError;
use thiserror::Error;

/// Errors raised by the split-routing layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// A single-pool swap-quote call failed. Most variants of the wrapped
    /// [`CoreError`] just mean "this route/percent is infeasible" and are
    /// handled by dropping the affected entry, not by propagating the error —
    /// see [`RouterError::is_fatal`].
    #[error("swap quote failed: {0}")]
    Quote(#[from] CoreError),

    #[error("fetcher returned no pool for {0}")]
    PoolNotFound(String),

    #[error("fetcher returned no tick arrays for {0}")]
    TickArrayNotFound(String),

    #[error("no route connects the requested input and output mints")]
    NoRouteAvailable,

    #[error("percentIncrement {0} does not evenly divide 100")]
    InvalidPercentIncrement(u8),

    /// Every candidate route/percent was dropped *and* at least one of the
    /// drops was caused by a fatal arithmetic error rather than an ordinary
    /// infeasibility. Distinguishes "no route exists" (an empty, non-error
    /// result) from "computation failed" (this error).
    #[error("all candidate routes failed a fatal arithmetic check")]
    AllRoutesFailed,
}

/// Result type using router errors.
pub type RouterResult<T> = Result<T, RouterError>;

impl RouterError {
    /// Errors that should abort the whole `findBestRoutes` call rather than
    /// just drop the one route/percent that triggered them.
    pub fn is_fatal(&self) -> bool {
        match self {
            RouterError::Quote(inner) => inner.is_fatal(),
            RouterError::AllRoutesFailed => true,
            RouterError::InvalidPercentIncrement(_) => true,
            RouterError::PoolNotFound(_)
            | RouterError::TickArrayNotFound(_)
            | RouterError::NoRouteAvailable => false,
        }
    }
}
