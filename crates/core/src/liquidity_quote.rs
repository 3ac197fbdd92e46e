//! # Liquidity Quote (component E)
//!
//! Public add-liquidity quoting API. Bounds token estimates against a
//! price-based slippage window (4.A) rather than scaling the token amounts
//! themselves — percentage slippage on tokens under-protects one side and
//! over-protects the other whenever the price can move inside the range,
//! while bounding the sqrt-price gives a symmetric, price-faithful worst case.

use crate::constants::{MAX_TICK, MIN_TICK};
use crate::errors::{CoreError, CoreResult};
use crate::math::fixed_point_math::get_slippage_bound_for_sqrt_price;
use crate::math::position_math::{self, InputToken};
use crate::math::tick_math::{is_tick_valid, round_to_spacing};
use crate::types::pool::Pool;
use crate::types::route::Slippage;
use solana_program::pubkey::Pubkey;

/// Result of an add-liquidity quote: how much of each token a deposit may
/// require in the worst case (`tokenMaxA`/`tokenMaxB`), and the unslipped
/// estimate at the pool's current price (`tokenEstA`/`tokenEstB`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LiquidityQuote {
    pub token_max_a: u64,
    pub token_max_b: u64,
    pub liquidity_amount: u128,
    pub token_est_a: u64,
    pub token_est_b: u64,
}

/// Size a position from a single input token and amount.
pub fn increase_liquidity_quote_by_input_token(
    pool: &Pool,
    input_mint: &Pubkey,
    input_amount: u64,
    tick_lower: i32,
    tick_upper: i32,
    slippage: Slippage,
) -> CoreResult<LiquidityQuote> {
    if !pool.has_mint(input_mint) {
        return Err(CoreError::InputMintMismatch);
    }
    let (tick_lower, tick_upper) = snap_tick_range(tick_lower, tick_upper, pool.tick_spacing as i32)?;

    let input_token = if *input_mint == pool.token_mint_a { InputToken::A } else { InputToken::B };

    let amounts = position_math::quote_for_classification(
        pool.tick_current_index,
        tick_lower,
        tick_upper,
        pool.sqrt_price,
        input_amount,
        input_token,
    )?;

    increase_liquidity_quote_by_liquidity(pool, amounts.liquidity, tick_lower, tick_upper, slippage)
}

/// Size a position from an already-known liquidity value.
pub fn increase_liquidity_quote_by_liquidity(
    pool: &Pool,
    liquidity: u128,
    tick_lower: i32,
    tick_upper: i32,
    slippage: Slippage,
) -> CoreResult<LiquidityQuote> {
    let (tick_lower, tick_upper) = snap_tick_range(tick_lower, tick_upper, pool.tick_spacing as i32)?;

    if liquidity == 0 {
        return Ok(LiquidityQuote::default());
    }

    let (token_est_a, token_est_b) = position_math::tokens_for_liquidity(
        pool.tick_current_index,
        tick_lower,
        tick_upper,
        pool.sqrt_price,
        liquidity,
        true,
    )?;

    let ((sqrt_lo, tick_at_lo), (sqrt_hi, tick_at_hi)) =
        get_slippage_bound_for_sqrt_price(pool.sqrt_price, slippage)?;

    let (token_a_lo, token_b_lo) =
        position_math::tokens_for_liquidity(tick_at_lo, tick_lower, tick_upper, sqrt_lo, liquidity, true)?;
    let (token_a_hi, token_b_hi) =
        position_math::tokens_for_liquidity(tick_at_hi, tick_lower, tick_upper, sqrt_hi, liquidity, true)?;

    Ok(LiquidityQuote {
        token_max_a: token_est_a.max(token_a_lo).max(token_a_hi),
        token_max_b: token_est_b.max(token_b_lo).max(token_b_hi),
        liquidity_amount: liquidity,
        token_est_a,
        token_est_b,
    })
}

/// Snap both ticks to initialisable multiples of `tick_spacing`, rounding
/// toward the interior of the range (lower rounds up, upper rounds down) so
/// the snapped range never exceeds what the caller asked for.
fn snap_tick_range(tick_lower: i32, tick_upper: i32, tick_spacing: i32) -> CoreResult<(i32, i32)> {
    let lower = round_to_spacing(tick_lower, tick_spacing, false);
    let upper = round_to_spacing(tick_upper, tick_spacing, true);

    if !is_tick_valid(lower) || !is_tick_valid(upper) {
        return Err(CoreError::TickOutOfBounds(
            if is_tick_valid(lower) { upper } else { lower },
            MIN_TICK,
            MAX_TICK,
        ));
    }
    if lower >= upper {
        return Err(CoreError::InvalidTickRange(lower, upper));
    }

    Ok((lower, upper))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Q64_ONE;

    fn test_pool(sqrt_price: u128, tick_current: i32) -> Pool {
        Pool {
            address: Pubkey::new_unique(),
            token_mint_a: Pubkey::new_unique(),
            token_mint_b: Pubkey::new_unique(),
            token_vault_a: Pubkey::new_unique(),
            token_vault_b: Pubkey::new_unique(),
            tick_spacing: 8,
            fee_rate: 3_000,
            sqrt_price,
            tick_current_index: tick_current,
            liquidity: 0,
        }
    }

    #[test]
    fn test_zero_liquidity_quote_is_all_zero() {
        let pool = test_pool(Q64_ONE, 0);
        let quote = increase_liquidity_quote_by_liquidity(&pool, 0, -64, 64, Slippage::default()).unwrap();
        assert_eq!(quote, LiquidityQuote::default());
    }

    #[test]
    fn test_by_input_token_rejects_foreign_mint() {
        let pool = test_pool(Q64_ONE, 0);
        let foreign = Pubkey::new_unique();
        let result = increase_liquidity_quote_by_input_token(&pool, &foreign, 1_000, -64, 64, Slippage::default());
        assert_eq!(result, Err(CoreError::InputMintMismatch));
    }

    #[test]
    fn test_by_input_token_in_range_uses_both_tokens_and_max_bounds_estimates() {
        let pool = test_pool(Q64_ONE, 0);
        let mint_a = pool.token_mint_a;
        let quote = increase_liquidity_quote_by_input_token(&pool, &mint_a, 1_000_000, -64, 64, Slippage::new(1, 100))
            .unwrap();

        assert!(quote.liquidity_amount > 0);
        assert!(quote.token_max_a >= quote.token_est_a);
        assert!(quote.token_max_b >= quote.token_est_b);
    }

    #[test]
    fn test_snap_tick_range_narrows_inward() {
        let (lower, upper) = snap_tick_range(5, 123, 10).unwrap();
        assert_eq!(lower, 10); // ceil(5/10)*10
        assert_eq!(upper, 120); // floor(123/10)*10
    }

    #[test]
    fn test_snap_tick_range_rejects_inverted_range() {
        let result = snap_tick_range(10, 12, 10);
        assert_eq!(result, Err(CoreError::InvalidTickRange(10, 10)));
    }
}
