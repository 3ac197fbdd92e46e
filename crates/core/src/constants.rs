//! # Core Constants
//!
//! Binding constants for the fixed-point math and tick-array layout.

// ============================================================================
// Mathematical constants
// ============================================================================

/// Q64.64 fixed-point scale factor: 2^64. A sqrt-price of `Q64_ONE` represents
/// price 1.0.
pub const Q64_ONE: u128 = 1u128 << 64;

/// Alias kept for call sites that read more naturally as "Q64" than
/// "Q64_ONE" (e.g. `Q64 + Q64 / 100` for "1.01").
pub const Q64: u128 = Q64_ONE;

// ============================================================================
// Tick bounds
// ============================================================================

/// Minimum supported tick index (inclusive).
pub const MIN_TICK: i32 = -443_636;

/// Maximum supported tick index (inclusive).
pub const MAX_TICK: i32 = 443_636;

/// Minimum tick spacing.
pub const MIN_TICK_SPACING: u16 = 1;

/// Maximum tick spacing.
pub const MAX_TICK_SPACING: u16 = 32_767;

// ============================================================================
// Sqrt-price bounds (Q64.64)
// ============================================================================

/// Minimum valid sqrt-price, corresponding to `tickIndexToSqrtPriceX64(MIN_TICK)`.
pub const MIN_SQRT_PRICE_X64: u128 = 4_295_048_016;

/// Maximum valid sqrt-price, corresponding to `tickIndexToSqrtPriceX64(MAX_TICK)`.
pub const MAX_SQRT_PRICE_X64: u128 = 79_226_673_515_401_279_963_822_778_343;

// ============================================================================
// Tick array layout
// ============================================================================

/// Number of tick slots in one tick array.
pub const TICK_ARRAY_SIZE: i32 = 88;

/// Number of tick arrays a swap quote is given to traverse in one direction.
pub const MAX_SWAP_TICK_ARRAYS: usize = 3;

// ============================================================================
// Fee format
// ============================================================================

/// Denominator for a pool's fee rate, expressed as parts-per-million.
pub const FEE_RATE_DENOMINATOR: u32 = 1_000_000;

// ============================================================================
// Router defaults (see `crate::types::route::RouterOptions`)
// ============================================================================

/// Default split granularity, in percent. Must evenly divide 100.
pub const DEFAULT_PERCENT_INCREMENT: u8 = 20;

/// Default number of split sets returned by `findBestRoutes`.
pub const DEFAULT_NUM_TOP_ROUTES: usize = 50;

/// Default per-percent pruning width before combining splits.
pub const DEFAULT_NUM_TOP_PARTIAL_QUOTES: usize = 10;

/// Default maximum number of routes combined into one split set.
pub const DEFAULT_MAX_SPLITS: usize = 3;
