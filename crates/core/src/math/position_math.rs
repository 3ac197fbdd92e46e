//! # Position Math (component B)
//!
//! Classifies a position's tick range against the pool's current tick and
//! converts between token amounts and liquidity for that classification.

use crate::constants::Q64_ONE;
use crate::errors::{CoreError, CoreResult};
use crate::math::big_int::{mul_div, mul_div_wide, mul_u128_to_u256, Rounding, U256};
use crate::math::fixed_point_math::{get_amount_a_delta, get_amount_b_delta};
use crate::math::tick_math::tick_index_to_sqrt_price_x64;
use crate::types::pool::PositionStatus;

pub use crate::types::pool::classify_position as classify;

fn rounding(round_up: bool) -> Rounding {
    if round_up {
        Rounding::Up
    } else {
        Rounding::Down
    }
}

/// Inverse of [`get_amount_a_delta`]: the liquidity that would produce
/// `amount` of token A across `[sqrt_price_lo, sqrt_price_hi]`.
pub fn get_liquidity_from_token_a(
    amount: u64,
    sqrt_price_lo: u128,
    sqrt_price_hi: u128,
    round_up: bool,
) -> CoreResult<u128> {
    if sqrt_price_lo > sqrt_price_hi {
        return get_liquidity_from_token_a(amount, sqrt_price_hi, sqrt_price_lo, round_up);
    }
    if amount == 0 || sqrt_price_lo == sqrt_price_hi {
        return Ok(0);
    }

    // amount * sqrtP_lo already exceeds u128 for realistic Q64.64 prices, so
    // combine those two raw factors via the exact widening multiply first,
    // then scale by the remaining sqrtP_hi factor.
    let amount_times_lo = mul_u128_to_u256(amount as u128, sqrt_price_lo);
    let denominator = mul_u128_to_u256(Q64_ONE, sqrt_price_hi - sqrt_price_lo);

    let result = mul_div_wide(amount_times_lo, sqrt_price_hi, denominator, rounding(round_up))?;
    result.to_u128().ok_or(CoreError::ConversionError)
}

/// Inverse of [`get_amount_b_delta`]: the liquidity that would produce
/// `amount` of token B across `[sqrt_price_lo, sqrt_price_hi]`.
pub fn get_liquidity_from_token_b(
    amount: u64,
    sqrt_price_lo: u128,
    sqrt_price_hi: u128,
    round_up: bool,
) -> CoreResult<u128> {
    if sqrt_price_lo > sqrt_price_hi {
        return get_liquidity_from_token_b(amount, sqrt_price_hi, sqrt_price_lo, round_up);
    }
    if amount == 0 || sqrt_price_lo == sqrt_price_hi {
        return Ok(0);
    }

    let result = mul_div(
        U256::from_u128(amount as u128),
        U256::from_u128(Q64_ONE),
        U256::from_u128(sqrt_price_hi - sqrt_price_lo),
        rounding(round_up),
    )?;
    result.to_u128().ok_or(CoreError::ConversionError)
}

pub fn get_token_a_from_liquidity(
    liquidity: u128,
    sqrt_price_lo: u128,
    sqrt_price_hi: u128,
    round_up: bool,
) -> CoreResult<u64> {
    get_amount_a_delta(sqrt_price_lo, sqrt_price_hi, liquidity, round_up)
}

pub fn get_token_b_from_liquidity(
    liquidity: u128,
    sqrt_price_lo: u128,
    sqrt_price_hi: u128,
    round_up: bool,
) -> CoreResult<u64> {
    get_amount_b_delta(sqrt_price_lo, sqrt_price_hi, liquidity, round_up)
}

/// Which token is specified as the add-liquidity input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputToken {
    A,
    B,
}

/// Result of sizing a position against a given `sqrt_price`/classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionAmounts {
    pub liquidity: u128,
    pub token_a: u64,
    pub token_b: u64,
}

/// The 4.B per-classification table: given where the position sits relative
/// to `sqrt_price_current` and which token the caller specified, compute the
/// liquidity and both token amounts (estimates are always rounded up, which
/// is the "tokens required to deposit" direction).
pub fn quote_for_classification(
    tick_current: i32,
    tick_lower: i32,
    tick_upper: i32,
    sqrt_price_current: u128,
    input_amount: u64,
    input_token: InputToken,
) -> CoreResult<PositionAmounts> {
    let sqrt_price_lower = tick_index_to_sqrt_price_x64(tick_lower)?;
    let sqrt_price_upper = tick_index_to_sqrt_price_x64(tick_upper)?;
    let status = classify(tick_current, tick_lower, tick_upper);

    let zero = PositionAmounts { liquidity: 0, token_a: 0, token_b: 0 };

    match (status, input_token) {
        (PositionStatus::Below, InputToken::A) => {
            let liquidity = get_liquidity_from_token_a(input_amount, sqrt_price_lower, sqrt_price_upper, false)?;
            let token_a = get_token_a_from_liquidity(liquidity, sqrt_price_lower, sqrt_price_upper, true)?;
            Ok(PositionAmounts { liquidity, token_a, token_b: 0 })
        }
        (PositionStatus::Below, InputToken::B) => Ok(zero),
        (PositionStatus::Above, InputToken::B) => {
            let liquidity = get_liquidity_from_token_b(input_amount, sqrt_price_lower, sqrt_price_upper, false)?;
            let token_b = get_token_b_from_liquidity(liquidity, sqrt_price_lower, sqrt_price_upper, true)?;
            Ok(PositionAmounts { liquidity, token_a: 0, token_b })
        }
        (PositionStatus::Above, InputToken::A) => Ok(zero),
        (PositionStatus::In, InputToken::A) => {
            let liquidity = get_liquidity_from_token_a(input_amount, sqrt_price_current, sqrt_price_upper, false)?;
            let token_a = get_token_a_from_liquidity(liquidity, sqrt_price_current, sqrt_price_upper, true)?;
            let token_b = get_token_b_from_liquidity(liquidity, sqrt_price_lower, sqrt_price_current, true)?;
            Ok(PositionAmounts { liquidity, token_a, token_b })
        }
        (PositionStatus::In, InputToken::B) => {
            let liquidity = get_liquidity_from_token_b(input_amount, sqrt_price_lower, sqrt_price_current, false)?;
            let token_a = get_token_a_from_liquidity(liquidity, sqrt_price_current, sqrt_price_upper, true)?;
            let token_b = get_token_b_from_liquidity(liquidity, sqrt_price_lower, sqrt_price_current, true)?;
            Ok(PositionAmounts { liquidity, token_a, token_b })
        }
    }
}

/// Forward token estimate for an already-known liquidity value, at whatever
/// classification `tick_current` implies — used by `increaseLiquidityQuoteByLiquidity`.
pub fn tokens_for_liquidity(
    tick_current: i32,
    tick_lower: i32,
    tick_upper: i32,
    sqrt_price_current: u128,
    liquidity: u128,
    round_up: bool,
) -> CoreResult<(u64, u64)> {
    let sqrt_price_lower = tick_index_to_sqrt_price_x64(tick_lower)?;
    let sqrt_price_upper = tick_index_to_sqrt_price_x64(tick_upper)?;

    match classify(tick_current, tick_lower, tick_upper) {
        PositionStatus::Below => {
            let token_a = get_token_a_from_liquidity(liquidity, sqrt_price_lower, sqrt_price_upper, round_up)?;
            Ok((token_a, 0))
        }
        PositionStatus::Above => {
            let token_b = get_token_b_from_liquidity(liquidity, sqrt_price_lower, sqrt_price_upper, round_up)?;
            Ok((0, token_b))
        }
        PositionStatus::In => {
            let token_a = get_token_a_from_liquidity(liquidity, sqrt_price_current, sqrt_price_upper, round_up)?;
            let token_b = get_token_b_from_liquidity(liquidity, sqrt_price_lower, sqrt_price_current, round_up)?;
            Ok((token_a, token_b))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Q64_ONE;

    #[test]
    fn test_liquidity_from_token_a_handles_near_u64_max_amount() {
        // amount * sqrtP_lo alone overflows u128 near the top of sqrt-price's
        // range; this must not spuriously error.
        let lo = Q64_ONE;
        let hi = Q64_ONE + Q64_ONE / 1000;
        let liquidity = get_liquidity_from_token_a(u64::MAX, lo, hi, false).unwrap();
        assert!(liquidity > 0);
    }

    #[test]
    fn test_liquidity_round_trip_a() {
        let lo = Q64_ONE;
        let hi = Q64_ONE + Q64_ONE / 50;
        let liquidity = get_liquidity_from_token_a(1_000_000, lo, hi, false).unwrap();
        let amount = get_token_a_from_liquidity(liquidity, lo, hi, true).unwrap();
        // Rounding down then up must never overshoot the original input by more
        // than the rounding error introduced by a single ceil.
        assert!(amount <= 1_000_000 + 1);
        assert!(amount > 0);
    }

    #[test]
    fn test_liquidity_round_trip_b() {
        let lo = Q64_ONE;
        let hi = Q64_ONE + Q64_ONE / 50;
        let liquidity = get_liquidity_from_token_b(1_000_000, lo, hi, false).unwrap();
        let amount = get_token_b_from_liquidity(liquidity, lo, hi, true).unwrap();
        assert!(amount <= 1_000_000 + 1);
        assert!(amount > 0);
    }

    #[test]
    fn test_quote_below_range_only_uses_token_a() {
        let result =
            quote_for_classification(0, 128, 256, Q64_ONE, 1_000, InputToken::A).unwrap();
        assert!(result.token_a > 0);
        assert_eq!(result.token_b, 0);
    }

    #[test]
    fn test_quote_below_range_token_b_input_is_noop() {
        let result =
            quote_for_classification(0, 128, 256, Q64_ONE, 1_000, InputToken::B).unwrap();
        assert_eq!(result.liquidity, 0);
        assert_eq!(result.token_a, 0);
        assert_eq!(result.token_b, 0);
    }

    #[test]
    fn test_quote_in_range_uses_both_tokens() {
        let result = quote_for_classification(0, -64, 64, Q64_ONE, 1_000, InputToken::A).unwrap();
        assert!(result.token_a > 0);
        assert!(result.token_b > 0);
    }

    #[test]
    fn test_quote_above_range_only_uses_token_b() {
        let result =
            quote_for_classification(300, 128, 256, Q64_ONE, 1_000, InputToken::B).unwrap();
        assert!(result.token_b > 0);
        assert_eq!(result.token_a, 0);
    }
}
