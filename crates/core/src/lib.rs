//! # CLAMM Core - Off-Chain Quoting Math
//!
//! This crate contains the pure off-chain quoting and routing math for a
//! concentrated-liquidity AMM: fixed-point sqrt-price arithmetic, position
//! sizing, tick-array navigation, single-pool swap simulation and
//! add-liquidity quoting. It provides:
//!
//! - Type definitions for pool, tick-array and routing structures
//! - Q64.64 fixed-point and position math
//! - Constants and configuration values
//! - Pure validation logic
//!
//! ## Feature Flags
//!
//! - `client`: Enables `serde` serialization for off-chain use

pub mod constants;
pub mod errors;
pub mod liquidity_quote;
pub mod math;
pub mod swap_quote;
pub mod types;

pub use constants::*;
pub use errors::{CoreError, CoreResult};
pub use liquidity_quote::{increase_liquidity_quote_by_input_token, increase_liquidity_quote_by_liquidity, LiquidityQuote};
pub use swap_quote::{quote_swap, SwapQuote, SwapQuoteParams};
pub use types::*;
