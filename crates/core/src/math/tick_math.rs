//! # Tick Math
//!
//! Conversions between tick indices and Q64.64 sqrt-prices, exact against the
//! on-chain reference layout.

use crate::constants::{MAX_SQRT_PRICE_X64, MAX_TICK, MIN_SQRT_PRICE_X64, MIN_TICK, Q64_ONE};
use crate::errors::{CoreError, CoreResult};
use crate::math::big_int::{mul_div, Rounding, U256};

/// Precomputed `floor(sqrt(1.0001)^(2^i) * 2^64)` for `i` in `0..19`. 19
/// entries are enough to decompose any tick up to `MAX_TICK` (`2^19 >
/// 443_636`).
const MAGIC_SQRT_1_0001_POW_2: [u128; 19] = [
    18_447_666_387_855_959_850,       // 2^0
    18_448_588_748_116_922_571,       // 2^1
    18_450_433_606_991_734_263,       // 2^2
    18_454_123_878_217_468_680,       // 2^3
    18_461_506_635_090_006_701,       // 2^4
    18_476_281_010_653_910_144,       // 2^5
    18_505_865_242_158_250_041,       // 2^6
    18_565_175_891_880_433_522,       // 2^7
    18_684_368_066_214_940_582,       // 2^8
    18_925_053_041_275_764_671,       // 2^9
    19_415_764_168_677_886_926,       // 2^10
    20_435_687_552_633_177_494,       // 2^11
    22_639_080_592_224_303_007,       // 2^12
    27_784_196_929_998_399_742,       // 2^13
    41_848_122_137_994_986_128,       // 2^14
    94_936_283_578_220_370_716,       // 2^15
    488_590_176_327_622_479_860,      // 2^16
    12_941_056_668_319_229_769_860,   // 2^17
    9_078_618_265_828_848_800_676_189, // 2^18
];

/// Get the Q64.64 sqrt-price for a tick index.
pub fn tick_index_to_sqrt_price_x64(tick: i32) -> CoreResult<u128> {
    if tick < MIN_TICK || tick > MAX_TICK {
        return Err(CoreError::TickOutOfBounds(tick, MIN_TICK, MAX_TICK));
    }

    let abs_tick = tick.unsigned_abs();
    let mut sqrt_ratio = Q64_ONE;

    for (i, magic) in MAGIC_SQRT_1_0001_POW_2.iter().enumerate() {
        if abs_tick & (1 << i) != 0 {
            sqrt_ratio = mul_shift(sqrt_ratio, *magic)?;
        }
    }

    if tick < 0 {
        sqrt_ratio = reciprocal(sqrt_ratio)?;
    }

    Ok(sqrt_ratio)
}

/// Get the greatest tick index `t` such that
/// `tick_index_to_sqrt_price_x64(t) <= sqrt_price`.
pub fn sqrt_price_x64_to_tick_index(sqrt_price: u128) -> CoreResult<i32> {
    if sqrt_price < MIN_SQRT_PRICE_X64 || sqrt_price > MAX_SQRT_PRICE_X64 {
        return Err(CoreError::SqrtPriceOutOfBounds(
            sqrt_price,
            MIN_SQRT_PRICE_X64,
            MAX_SQRT_PRICE_X64,
        ));
    }

    let mut low = MIN_TICK;
    let mut high = MAX_TICK;

    while low <= high {
        let mid = low + (high - low) / 2;
        let mid_sqrt_price = tick_index_to_sqrt_price_x64(mid)?;

        if mid_sqrt_price == sqrt_price {
            return Ok(mid);
        } else if mid_sqrt_price < sqrt_price {
            low = mid + 1;
        } else {
            high = mid - 1;
        }
    }

    Ok(high)
}

/// Multiply two Q64.64 values and shift right by 64 bits (i.e. divide by
/// `Q64_ONE`, rounding down).
fn mul_shift(a: u128, b: u128) -> CoreResult<u128> {
    mul_div(U256::from_u128(a), U256::from_u128(b), U256::from_u128(Q64_ONE), Rounding::Down)
        .and_then(|result| result.to_u128().ok_or(CoreError::ConversionError))
}

/// `Q64_ONE^2 / value`, used to invert the sqrt-price for negative ticks.
fn reciprocal(value: u128) -> CoreResult<u128> {
    if value == 0 {
        return Err(CoreError::DivideByZero);
    }

    let q64_squared =
        U256::from_u128(Q64_ONE).mul(&U256::from_u128(Q64_ONE)).ok_or(CoreError::ArithmeticOverflow)?;
    let result = q64_squared.div(&U256::from_u128(value)).ok_or(CoreError::DivideByZero)?;

    result.to_u128().ok_or(CoreError::ConversionError)
}

/// Whether a tick index lies within `[MIN_TICK, MAX_TICK]`.
pub fn is_tick_valid(tick: i32) -> bool {
    tick >= MIN_TICK && tick <= MAX_TICK
}

/// Whether a Q64.64 sqrt-price lies within `[MIN_SQRT_PRICE_X64, MAX_SQRT_PRICE_X64]`.
pub fn is_sqrt_price_x64_valid(sqrt_price: u128) -> bool {
    sqrt_price >= MIN_SQRT_PRICE_X64 && sqrt_price <= MAX_SQRT_PRICE_X64
}

/// Round a tick to the nearest initialisable multiple of `tick_spacing`.
///
/// `lte == true` rounds down (floor); `lte == false` rounds up (ceiling).
pub fn round_to_spacing(tick: i32, tick_spacing: i32, lte: bool) -> i32 {
    let compressed = if lte {
        tick.div_euclid(tick_spacing)
    } else {
        let compressed = tick.div_euclid(tick_spacing);
        if tick.rem_euclid(tick_spacing) != 0 {
            compressed + 1
        } else {
            compressed
        }
    };

    compressed * tick_spacing
}
