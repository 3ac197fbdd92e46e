//! # Fixed-Point Math (component A)
//!
//! Amount-delta and next-sqrt-price conversions used by the swap and
//! liquidity-quote layers, plus the price-based slippage bound (4.A).
//!
//! Rounding policy: round up when estimating tokens required to deposit or
//! to fulfil a swap input; round down when estimating tokens received. Every
//! intermediate product goes through [`crate::math::big_int::U256`] so a
//! u128 overflow never silently truncates.

use crate::constants::{MAX_SQRT_PRICE_X64, MIN_SQRT_PRICE_X64, Q64_ONE};
use crate::errors::{CoreError, CoreResult};
use crate::math::big_int::{mul_div, mul_div_wide, mul_u128_to_u256, Rounding, U256};
use crate::math::tick_math::sqrt_price_x64_to_tick_index;

fn rounding(round_up: bool) -> Rounding {
    if round_up {
        Rounding::Up
    } else {
        Rounding::Down
    }
}

/// `ceil_or_floor(L * (sqrtP_hi - sqrtP_lo) * 2^64 / (sqrtP_hi * sqrtP_lo))`.
pub fn get_amount_a_delta(
    sqrt_price_lo: u128,
    sqrt_price_hi: u128,
    liquidity: u128,
    round_up: bool,
) -> CoreResult<u64> {
    if sqrt_price_lo > sqrt_price_hi {
        return get_amount_a_delta(sqrt_price_hi, sqrt_price_lo, liquidity, round_up);
    }
    if liquidity == 0 || sqrt_price_lo == sqrt_price_hi {
        return Ok(0);
    }

    // L*(sqrtP_hi - sqrtP_lo) can already overflow u128 (liquidity alone can
    // exceed 2^64), so combine the two raw u128 factors first via the exact
    // widening multiply, then scale by the remaining Q64_ONE factor.
    let liquidity_times_delta = mul_u128_to_u256(liquidity, sqrt_price_hi - sqrt_price_lo);
    let denominator = mul_u128_to_u256(sqrt_price_hi, sqrt_price_lo);

    let result = mul_div_wide(liquidity_times_delta, Q64_ONE, denominator, rounding(round_up))?;
    result.to_u128().ok_or(CoreError::ConversionError)?.try_into().map_err(|_| CoreError::ConversionError)
}

/// `ceil_or_floor(L * (sqrtP_hi - sqrtP_lo) / 2^64)`.
pub fn get_amount_b_delta(
    sqrt_price_lo: u128,
    sqrt_price_hi: u128,
    liquidity: u128,
    round_up: bool,
) -> CoreResult<u64> {
    if sqrt_price_lo > sqrt_price_hi {
        return get_amount_b_delta(sqrt_price_hi, sqrt_price_lo, liquidity, round_up);
    }
    if liquidity == 0 || sqrt_price_lo == sqrt_price_hi {
        return Ok(0);
    }

    let result = mul_div(
        U256::from_u128(liquidity),
        U256::from_u128(sqrt_price_hi - sqrt_price_lo),
        U256::from_u128(Q64_ONE),
        rounding(round_up),
    )?;

    result.to_u128().ok_or(CoreError::ConversionError)?.try_into().map_err(|_| CoreError::ConversionError)
}

/// Next sqrt-price after trading `amount` of token A against `liquidity`,
/// rounding up (token A is the input and output-estimate-affecting side in
/// the invariant `L = x*y`, so the tighter rounding direction for this
/// formula is always "up" regardless of add/remove).
pub fn get_next_sqrt_price_from_amount_a(
    sqrt_price: u128,
    liquidity: u128,
    amount: u64,
    add: bool,
) -> CoreResult<u128> {
    if amount == 0 {
        return Ok(sqrt_price);
    }

    // Each of these is the exact product of two raw u128 factors, always
    // representable in 256 bits — no overflow check needed at this step.
    let numerator1 = mul_u128_to_u256(sqrt_price, liquidity);
    let product = mul_u128_to_u256(amount as u128, sqrt_price);
    let liquidity_q64 = mul_u128_to_u256(liquidity, Q64_ONE);

    let denominator = if add {
        liquidity_q64.add(&product).ok_or(CoreError::ArithmeticOverflow)?
    } else {
        if liquidity_q64.le(&product) {
            return Err(CoreError::ArithmeticUnderflow);
        }
        liquidity_q64.sub(&product).ok_or(CoreError::ArithmeticUnderflow)?
    };

    mul_div_wide(numerator1, Q64_ONE, denominator, Rounding::Up)
        .and_then(|result| result.to_u128().ok_or(CoreError::ConversionError))
}

/// Next sqrt-price after trading `amount` of token B against `liquidity`,
/// rounding down.
pub fn get_next_sqrt_price_from_amount_b(
    sqrt_price: u128,
    liquidity: u128,
    amount: u64,
    add: bool,
) -> CoreResult<u128> {
    if add {
        let quotient = mul_div(
            U256::from_u128(amount as u128),
            U256::from_u128(Q64_ONE),
            U256::from_u128(liquidity),
            Rounding::Down,
        )?;
        U256::from_u128(sqrt_price).add(&quotient).and_then(|r| r.to_u128()).ok_or(CoreError::ArithmeticOverflow)
    } else {
        let quotient = mul_div(
            U256::from_u128(amount as u128),
            U256::from_u128(Q64_ONE),
            U256::from_u128(liquidity),
            Rounding::Up,
        )?;
        if U256::from_u128(sqrt_price).lt(&quotient) {
            return Err(CoreError::ArithmeticUnderflow);
        }
        U256::from_u128(sqrt_price).sub(&quotient).and_then(|r| r.to_u128()).ok_or(CoreError::ArithmeticUnderflow)
    }
}

/// Inverse of [`get_next_sqrt_price_from_amount_a`] / `_b`, dispatched by
/// swap direction: given the amount actually specified at a price move, pick
/// the side that is changing.
pub fn get_next_sqrt_price_from_input(
    sqrt_price: u128,
    liquidity: u128,
    amount_in: u64,
    a_to_b: bool,
) -> CoreResult<u128> {
    if a_to_b {
        get_next_sqrt_price_from_amount_a(sqrt_price, liquidity, amount_in, true)
    } else {
        get_next_sqrt_price_from_amount_b(sqrt_price, liquidity, amount_in, true)
    }
}

pub fn get_next_sqrt_price_from_output(
    sqrt_price: u128,
    liquidity: u128,
    amount_out: u64,
    a_to_b: bool,
) -> CoreResult<u128> {
    if a_to_b {
        get_next_sqrt_price_from_amount_b(sqrt_price, liquidity, amount_out, false)
    } else {
        get_next_sqrt_price_from_amount_a(sqrt_price, liquidity, amount_out, false)
    }
}

/// Scale a sqrt-price by `sqrt(1 +/- slippage)`, i.e. scale the *price*
/// (`sqrt_price^2`) by `1 +/- slippage` and re-take the square root, per
/// 4.A's "Slippage bounds for sqrt-price". Returns `(sqrt_price, tick)` pairs
/// for the lower and upper bounds.
///
/// This is a protective bound, not pool accounting, so the scaling itself is
/// done in `f64`: `sqrt_price` can span close to 97 bits and a double's
/// 53-bit mantissa already gives far finer resolution than a single tick
/// (each tick moves the price by 1 basis point), and the result is snapped
/// back to an exact, tick-aligned sqrt-price before it's used anywhere else.
pub fn get_slippage_bound_for_sqrt_price(
    sqrt_price: u128,
    slippage: crate::types::Slippage,
) -> CoreResult<((u128, i32), (u128, i32))> {
    if slippage.denominator == 0 {
        return Err(CoreError::DivideByZero);
    }
    let fraction = slippage.numerator.min(slippage.denominator) as f64 / slippage.denominator as f64;

    let sqrt_price_f64 = sqrt_price as f64;
    let sqrt_lo_f64 = sqrt_price_f64 * (1.0 - fraction).max(0.0).sqrt();
    let sqrt_hi_f64 = sqrt_price_f64 * (1.0 + fraction).sqrt();

    let clamp = |x: f64| -> u128 {
        if x <= MIN_SQRT_PRICE_X64 as f64 {
            MIN_SQRT_PRICE_X64
        } else if x >= MAX_SQRT_PRICE_X64 as f64 {
            MAX_SQRT_PRICE_X64
        } else {
            x as u128
        }
    };

    let sqrt_lo = clamp(sqrt_lo_f64);
    let sqrt_hi = clamp(sqrt_hi_f64);

    let tick_lo = sqrt_price_x64_to_tick_index(sqrt_lo)?;
    let tick_hi = sqrt_price_x64_to_tick_index(sqrt_hi)?;

    Ok(((sqrt_lo, tick_lo), (sqrt_hi, tick_hi)))
}
