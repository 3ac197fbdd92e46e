//! Widening 256-bit arithmetic for Q64.64 intermediate products.
//!
//! `u128 * u128` can overflow a `u128`, which every `mul_div` in this crate
//! relies on (liquidity, Q64.64 sqrt-prices and amounts all live close to the
//! top of their ranges). `U256` is an explicit `(hi, lo)` pair rather than a
//! borrowed bignum crate, matching this workspace's existing fixed-point
//! helpers.

use crate::errors::{CoreError, CoreResult};

/// Rounding mode for division operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub enum Rounding {
    /// Round down (towards zero).
    Down,
    /// Round up (away from zero).
    Up,
}

/// 256-bit unsigned integer for intermediate calculations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct U256 {
    /// Low 128 bits.
    pub lo: u128,
    /// High 128 bits.
    pub hi: u128,
}

impl U256 {
    /// Create a new U256 from low and high parts.
    pub const fn new(lo: u128, hi: u128) -> Self {
        Self { lo, hi }
    }

    /// Create from a single u128 value.
    pub const fn from_u128(value: u128) -> Self {
        Self { lo: value, hi: 0 }
    }

    /// Create from a single u64 value.
    pub const fn from_u64(value: u64) -> Self {
        Self { lo: value as u128, hi: 0 }
    }

    /// Check if the value is zero.
    pub const fn is_zero(&self) -> bool {
        self.lo == 0 && self.hi == 0
    }

    /// Convert to u128, returning None on overflow.
    pub fn to_u128(&self) -> Option<u128> {
        if self.hi == 0 {
            Some(self.lo)
        } else {
            None
        }
    }

    /// Convert to u64, returning None on overflow.
    pub fn to_u64(&self) -> Option<u64> {
        if self.hi == 0 && self.lo <= u64::MAX as u128 {
            Some(self.lo as u64)
        } else {
            None
        }
    }

    /// Add two U256 values.
    pub fn add(&self, other: &U256) -> Option<U256> {
        let (lo, carry) = self.lo.overflowing_add(other.lo);
        let hi = self.hi.checked_add(other.hi)?.checked_add(carry as u128)?;
        Some(U256::new(lo, hi))
    }

    /// Subtract two U256 values.
    pub fn sub(&self, other: &U256) -> Option<U256> {
        let (lo, borrow) = self.lo.overflowing_sub(other.lo);
        let hi = self.hi.checked_sub(other.hi)?.checked_sub(borrow as u128)?;
        Some(U256::new(lo, hi))
    }

    /// Multiply two U256 values. Only the case where both operands fit in
    /// u128 is supported (the only case this crate ever needs) — anything
    /// wider returns `None`.
    pub fn mul(&self, other: &U256) -> Option<U256> {
        if self.hi != 0 || other.hi != 0 {
            return None;
        }
        Some(mul_u128_to_u256(self.lo, other.lo))
    }

    /// Divide U256 by U256, returning the quotient. Delegates to
    /// [`Self::div_rem`]; see there for the algorithm.
    pub fn div(&self, other: &U256) -> Option<U256> {
        self.div_rem(other).map(|(q, _)| q)
    }

    /// Divide U256 by U256, returning `(quotient, remainder)`. `sqrtP_hi *
    /// sqrtP_lo`-style denominators routinely exceed u128, so this is plain
    /// binary long division (shift-and-subtract) over the full 256 bits
    /// rather than the narrower u128-divisor special case it replaced.
    pub fn div_rem(&self, other: &U256) -> Option<(U256, U256)> {
        if other.is_zero() {
            return None;
        }
        if self.lt(other) {
            return Some((U256::new(0, 0), *self));
        }
        if other.hi == 0 && self.hi == 0 {
            return Some((U256::from_u128(self.lo / other.lo), U256::from_u128(self.lo % other.lo)));
        }

        let mut quotient = U256::new(0, 0);
        let mut remainder = U256::new(0, 0);

        for i in (0..256u32).rev() {
            remainder = shl1(remainder);
            if get_bit(self, i) {
                remainder.lo |= 1;
            }
            if remainder.ge(other) {
                remainder = remainder.sub(other)?;
                set_bit(&mut quotient, i);
            }
        }

        Some((quotient, remainder))
    }

    /// `self <= other`.
    pub fn le(&self, other: &U256) -> bool {
        self.hi < other.hi || (self.hi == other.hi && self.lo <= other.lo)
    }

    /// `self < other`.
    pub fn lt(&self, other: &U256) -> bool {
        self.hi < other.hi || (self.hi == other.hi && self.lo < other.lo)
    }

    /// `self >= other`.
    pub fn ge(&self, other: &U256) -> bool {
        self.hi > other.hi || (self.hi == other.hi && self.lo >= other.lo)
    }

    /// `self > other`.
    pub fn gt(&self, other: &U256) -> bool {
        self.hi > other.hi || (self.hi == other.hi && self.lo > other.lo)
    }
}

impl PartialOrd for U256 {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for U256 {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match self.hi.cmp(&other.hi) {
            std::cmp::Ordering::Equal => self.lo.cmp(&other.lo),
            ordering => ordering,
        }
    }
}

/// Shift a U256 left by one bit, discarding any bit that would overflow past
/// 256 bits. Only used inside [`U256::div_rem`], where the running remainder
/// never exceeds the divisor's bit width for this crate's values (denominators
/// top out around 2^225).
fn shl1(v: U256) -> U256 {
    let carry = v.lo >> 127;
    let lo = v.lo << 1;
    let hi = (v.hi << 1) | carry;
    U256::new(lo, hi)
}

fn get_bit(v: &U256, i: u32) -> bool {
    if i < 128 {
        (v.lo >> i) & 1 == 1
    } else {
        (v.hi >> (i - 128)) & 1 == 1
    }
}

fn set_bit(v: &mut U256, i: u32) {
    if i < 128 {
        v.lo |= 1u128 << i;
    } else {
        v.hi |= 1u128 << (i - 128);
    }
}

/// Multiply two u128 values and return the exact 256-bit product, splitting
/// each operand into 64-bit limbs and summing the four partial products.
pub fn mul_u128_to_u256(a: u128, b: u128) -> U256 {
    let a_lo = a as u64;
    let a_hi = (a >> 64) as u64;
    let b_lo = b as u64;
    let b_hi = (b >> 64) as u64;

    let lo_lo = (a_lo as u128) * (b_lo as u128);
    let lo_hi = (a_lo as u128) * (b_hi as u128);
    let hi_lo = (a_hi as u128) * (b_lo as u128);
    let hi_hi = (a_hi as u128) * (b_hi as u128);

    let mid = lo_hi + hi_lo;
    let lo = lo_lo + (mid << 64);
    let hi = hi_hi + (mid >> 64) + if lo < lo_lo { 1 } else { 0 };

    U256::new(lo, hi)
}

/// Multiply an already-wide `U256` by a further `u128` scalar, returning
/// `None` if the exact product would need more than 256 bits.
///
/// Schoolbook multiply over 64-bit limbs: `value` contributes four limbs,
/// `multiplier` two, so the raw product needs up to six limbs (384 bits)
/// before the top two are checked to be zero.
pub fn mul_u256_by_u128(value: U256, multiplier: u128) -> Option<U256> {
    let v = [
        value.lo as u64,
        (value.lo >> 64) as u64,
        value.hi as u64,
        (value.hi >> 64) as u64,
    ];
    let m = [multiplier as u64, (multiplier >> 64) as u64];

    let mut limbs = [0u128; 6];
    for (i, &mi) in m.iter().enumerate() {
        let mut carry: u128 = 0;
        for (j, &vj) in v.iter().enumerate() {
            let idx = i + j;
            let sum = (vj as u128) * (mi as u128) + limbs[idx] + carry;
            limbs[idx] = sum & (u64::MAX as u128);
            carry = sum >> 64;
        }
        let mut k = i + v.len();
        while carry > 0 {
            let sum = limbs[k] + carry;
            limbs[k] = sum & (u64::MAX as u128);
            carry = sum >> 64;
            k += 1;
        }
    }

    if limbs[4] != 0 || limbs[5] != 0 {
        return None;
    }

    let lo = (limbs[1] << 64) | limbs[0];
    let hi = (limbs[3] << 64) | limbs[2];
    Some(U256::new(lo, hi))
}

/// `(value * multiplier) / denominator`, rounded as specified, where `value`
/// is already a wide `U256` product (e.g. from [`mul_u128_to_u256`]) and
/// `multiplier` is a further `u128` scale factor. Use this instead of
/// [`mul_div`] whenever the numerator is the product of more than two u128
/// factors — `mul_div`'s own multiply only accepts operands that individually
/// fit in u128.
pub fn mul_div_wide(value: U256, multiplier: u128, denominator: U256, rounding: Rounding) -> CoreResult<U256> {
    if denominator.is_zero() {
        return Err(CoreError::DivideByZero);
    }

    let product = mul_u256_by_u128(value, multiplier).ok_or(CoreError::ArithmeticOverflow)?;
    let (quotient, remainder) = product.div_rem(&denominator).ok_or(CoreError::ArithmeticOverflow)?;

    if rounding == Rounding::Up && !remainder.is_zero() {
        return quotient.add(&U256::from_u64(1)).ok_or(CoreError::ArithmeticOverflow);
    }

    Ok(quotient)
}

/// `(a * b) / denominator`, rounded as specified. Both `a` and `b` must
/// individually fit in u128 (i.e. be a raw scalar wrapped via
/// [`U256::from_u128`]) — for a numerator that is itself already a wide
/// product, use [`mul_div_wide`] instead.
pub fn mul_div(a: U256, b: U256, denominator: U256, rounding: Rounding) -> CoreResult<U256> {
    if denominator.is_zero() {
        return Err(CoreError::DivideByZero);
    }

    let product = a.mul(&b).ok_or(CoreError::ArithmeticOverflow)?;
    let (quotient, remainder) = product.div_rem(&denominator).ok_or(CoreError::ArithmeticOverflow)?;

    if rounding == Rounding::Up && !remainder.is_zero() {
        return quotient.add(&U256::from_u64(1)).ok_or(CoreError::ArithmeticOverflow);
    }

    Ok(quotient)
}

/// `(a * b) / denominator` over u64 operands, rounded as specified.
pub fn mul_div_u64(a: u64, b: u64, denominator: u64, rounding: Rounding) -> CoreResult<u64> {
    if denominator == 0 {
        return Err(CoreError::DivideByZero);
    }

    let product = (a as u128) * (b as u128);
    let quotient = product / (denominator as u128);
    let remainder = product % (denominator as u128);

    let mut result = quotient;
    if rounding == Rounding::Up && remainder > 0 {
        result = result.checked_add(1).ok_or(CoreError::ArithmeticOverflow)?;
    }

    result.try_into().map_err(|_| CoreError::ArithmeticOverflow)
}

/// `(a * b) / denominator` over u128 operands, rounded as specified.
pub fn mul_div_u128(a: u128, b: u128, denominator: u128, rounding: Rounding) -> CoreResult<u128> {
    if denominator == 0 {
        return Err(CoreError::DivideByZero);
    }

    let result = mul_div(
        U256::from_u128(a),
        U256::from_u128(b),
        U256::from_u128(denominator),
        rounding,
    )?;

    result.to_u128().ok_or(CoreError::ArithmeticOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u256_basic_ops() {
        let a = U256::from_u128(100);
        let b = U256::from_u128(200);

        assert_eq!(a.add(&b).unwrap().to_u128().unwrap(), 300);
        assert_eq!(b.sub(&a).unwrap().to_u128().unwrap(), 100);
        assert_eq!(a.mul(&b).unwrap().to_u128().unwrap(), 20_000);
        assert_eq!(b.div(&a).unwrap().to_u128().unwrap(), 2);
    }

    #[test]
    fn test_mul_overflows_u128_but_not_u256() {
        // Both operands fit in u64 headroom above u128::MAX / u64::MAX, so the
        // product doesn't fit in u128 — this used to silently fail.
        let a = u128::MAX / 2 + 1;
        let b = 3u128;
        let product = U256::from_u128(a).mul(&U256::from_u128(b)).unwrap();
        assert!(product.hi > 0, "product should need the high limb");

        // Dividing back out recovers the original value exactly.
        let recovered = product.div(&U256::from_u128(b)).unwrap();
        assert_eq!(recovered.to_u128().unwrap(), a);
    }

    #[test]
    fn test_mul_div_rounding() {
        assert_eq!(mul_div_u64(10, 3, 4, Rounding::Down).unwrap(), 7);
        assert_eq!(mul_div_u64(10, 3, 4, Rounding::Up).unwrap(), 8);
        assert_eq!(mul_div_u64(10, 4, 5, Rounding::Up).unwrap(), 8);
    }

    #[test]
    fn test_mul_div_u128_large_numbers() {
        let a = u128::MAX / 2;
        let result = mul_div_u128(a, 2, 2, Rounding::Down).unwrap();
        assert_eq!(result, a);
    }

    #[test]
    fn test_mul_div_u128_wide_intermediate() {
        // a * b overflows u128 on its own; mul_div must still recover the
        // exact quotient via the U256 intermediate.
        let a = MAX_SQRT_PRICE_FOR_TEST;
        let result = mul_div_u128(a, a, a, Rounding::Down).unwrap();
        assert_eq!(result, a);
    }

    const MAX_SQRT_PRICE_FOR_TEST: u128 = 79_226_673_515_401_279_963_822_778_343;

    #[test]
    fn test_div_rem_with_wide_divisor() {
        // A denominator like sqrtP_hi * sqrtP_lo routinely needs the high
        // limb; the old div() only supported a u128 divisor and would have
        // rejected this outright.
        let hi = U256::from_u128(MAX_SQRT_PRICE_FOR_TEST);
        let lo = U256::from_u128(MAX_SQRT_PRICE_FOR_TEST / 2);
        let denominator = hi.mul(&lo).unwrap();
        assert!(denominator.hi > 0, "denominator should need the high limb");

        let numerator = mul_u256_by_u128(denominator, 7).unwrap();
        let (quotient, remainder) = numerator.div_rem(&denominator).unwrap();
        assert_eq!(quotient.to_u128().unwrap(), 7);
        assert!(remainder.is_zero());
    }

    #[test]
    fn test_mul_div_wide_matches_three_factor_product() {
        // (1000 * 123456789) * 7 / (123456789 * 3), computed via the wide
        // path, must match straightforward u128 arithmetic.
        let value = mul_u128_to_u256(1000, 123_456_789);
        let denominator = U256::from_u128(123_456_789u128 * 3);
        let result = mul_div_wide(value, 7, denominator, Rounding::Down).unwrap();
        assert_eq!(result.to_u128().unwrap(), (1000u128 * 7) / 3);
    }

    #[test]
    fn test_mul_div_wide_rounds_up() {
        let value = mul_u128_to_u256(10, 1);
        let result = mul_div_wide(value, 1, U256::from_u128(3), Rounding::Up).unwrap();
        assert_eq!(result.to_u128().unwrap(), 4); // ceil(10/3)
    }

    #[test]
    fn test_mul_u256_by_u128_overflow_is_detected() {
        let max = U256::new(u128::MAX, u128::MAX);
        assert!(mul_u256_by_u128(max, 2).is_none());
    }
}
