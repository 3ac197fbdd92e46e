//! # Swap Quote (component D)
//!
//! Single-pool swap simulator. Steps across initialised ticks as an explicit
//! imperative state machine — no recursion — accumulating input, output and
//! fees until the requested amount is filled, a user-supplied price limit is
//! reached, or the provided tick arrays run out.

use crate::constants::{FEE_RATE_DENOMINATOR, MAX_SQRT_PRICE_X64, MIN_SQRT_PRICE_X64};
use crate::errors::{CoreError, CoreResult};
use crate::math::big_int::mul_div_u64;
use crate::math::fixed_point_math::{
    get_amount_a_delta, get_amount_b_delta, get_next_sqrt_price_from_input, get_next_sqrt_price_from_output,
};
use crate::math::tick_array::next_initialized_tick;
use crate::math::tick_math::tick_index_to_sqrt_price_x64;
use crate::types::pool::{Pool, TickArray};
use crate::types::route::Slippage;

/// Inputs for a single-pool swap simulation (4.D).
pub struct SwapQuoteParams<'a> {
    pub pool: &'a Pool,
    pub amount_specified: u64,
    pub a_to_b: bool,
    pub amount_specified_is_input: bool,
    /// Defaults to the pool's direction-appropriate bound when `None`.
    pub sqrt_price_limit: Option<u128>,
    /// Up to [`crate::constants::MAX_SWAP_TICK_ARRAYS`] consecutive arrays,
    /// ordered along the travel direction.
    pub tick_arrays: &'a [TickArray],
    pub slippage: Slippage,
}

/// Result of a single-pool swap simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub struct SwapQuote {
    pub estimated_amount_in: u64,
    pub estimated_amount_out: u64,
    pub estimated_fee_amount: u64,
    pub sqrt_price_end: u128,
    pub tick_end: i32,
    pub other_amount_threshold: u64,
}

struct StepResult {
    sqrt_price_next: u128,
    amount_in: u64,
    amount_out: u64,
    fee_amount: u64,
    reached_target: bool,
}

pub fn quote_swap(params: &SwapQuoteParams) -> CoreResult<SwapQuote> {
    let pool = params.pool;
    if params.amount_specified == 0 {
        return Ok(SwapQuote {
            estimated_amount_in: 0,
            estimated_amount_out: 0,
            estimated_fee_amount: 0,
            sqrt_price_end: pool.sqrt_price,
            tick_end: pool.tick_current_index,
            other_amount_threshold: 0,
        });
    }

    let sqrt_price_limit = params.sqrt_price_limit.unwrap_or(if params.a_to_b {
        MIN_SQRT_PRICE_X64
    } else {
        MAX_SQRT_PRICE_X64
    });

    let mut sqrt_price = pool.sqrt_price;
    let mut tick_current = pool.tick_current_index;
    let mut liquidity = pool.liquidity;
    let mut amount_remaining = params.amount_specified;
    let mut amount_calculated: u64 = 0;
    let mut fee_accum: u64 = 0;
    let mut steps_taken = 0u32;

    while amount_remaining > 0 && sqrt_price != sqrt_price_limit {
        let next_tick = next_initialized_tick(tick_current, pool.tick_spacing as i32, params.a_to_b, params.tick_arrays);

        let Some((tick_next, liquidity_net)) = next_tick else {
            if liquidity == 0 && steps_taken == 0 {
                return Err(CoreError::ZeroLiquidity);
            }
            return Err(CoreError::InsufficientTickArrays);
        };

        let sqrt_price_next_tick = tick_index_to_sqrt_price_x64(tick_next)?;
        let sqrt_price_target = if params.a_to_b {
            sqrt_price_next_tick.max(sqrt_price_limit)
        } else {
            sqrt_price_next_tick.min(sqrt_price_limit)
        };

        let step = compute_swap_step(
            sqrt_price,
            sqrt_price_target,
            liquidity,
            amount_remaining,
            pool.fee_rate,
            params.a_to_b,
            params.amount_specified_is_input,
        )?;

        let step_gross_in = step.amount_in.checked_add(step.fee_amount).ok_or(CoreError::ArithmeticOverflow)?;

        amount_remaining = amount_remaining
            .checked_sub(if params.amount_specified_is_input { step_gross_in } else { step.amount_out })
            .ok_or(CoreError::ArithmeticUnderflow)?;
        amount_calculated = amount_calculated
            .checked_add(if params.amount_specified_is_input { step.amount_out } else { step_gross_in })
            .ok_or(CoreError::ArithmeticOverflow)?;
        fee_accum = fee_accum.checked_add(step.fee_amount).ok_or(CoreError::ArithmeticOverflow)?;

        sqrt_price = step.sqrt_price_next;
        steps_taken += 1;

        if step.reached_target && sqrt_price_target == sqrt_price_next_tick {
            liquidity = if params.a_to_b {
                crate::math::safe_math::safe_sub_liquidity_delta(liquidity, liquidity_net)?
            } else {
                crate::math::safe_math::safe_add_liquidity_delta(liquidity, liquidity_net)?
            };
            tick_current = tick_next;
        } else {
            tick_current = crate::math::tick_math::sqrt_price_x64_to_tick_index(sqrt_price)?;
        }
    }

    // `amount_remaining` already tracks consumption of the whole gross
    // budget (net price-mover plus fee) each step, so the amount the trader
    // actually pays in is just what's left of the original budget — no
    // separate fee subtraction (§8 invariant 5: `estimatedAmountIn ==
    // amountSpecified` whenever the full input is consumed).
    let (estimated_amount_in, estimated_amount_out) = if params.amount_specified_is_input {
        (params.amount_specified - amount_remaining, amount_calculated)
    } else {
        (amount_calculated, params.amount_specified - amount_remaining)
    };

    let other_amount_threshold = if params.amount_specified_is_input {
        params.slippage.apply_down(estimated_amount_out)
    } else {
        params.slippage.apply_up(estimated_amount_in)
    };

    Ok(SwapQuote {
        estimated_amount_in,
        estimated_amount_out,
        estimated_fee_amount: fee_accum,
        sqrt_price_end: sqrt_price,
        tick_end: tick_current,
        other_amount_threshold,
    })
}

#[allow(clippy::too_many_arguments)]
fn compute_swap_step(
    sqrt_price_current: u128,
    sqrt_price_target: u128,
    liquidity: u128,
    amount_remaining: u64,
    fee_rate: u32,
    a_to_b: bool,
    amount_specified_is_input: bool,
) -> CoreResult<StepResult> {
    if amount_specified_is_input {
        let max_in_to_target = if a_to_b {
            get_amount_a_delta(sqrt_price_current, sqrt_price_target, liquidity, true)?
        } else {
            get_amount_b_delta(sqrt_price_current, sqrt_price_target, liquidity, true)?
        };
        let fee_for_full_cross = fee_from_gross_input(max_in_to_target, fee_rate)?;
        let total_needed_for_full_cross = max_in_to_target.checked_add(fee_for_full_cross).ok_or(CoreError::ArithmeticOverflow)?;

        if total_needed_for_full_cross <= amount_remaining {
            let amount_out = if a_to_b {
                get_amount_b_delta(sqrt_price_current, sqrt_price_target, liquidity, false)?
            } else {
                get_amount_a_delta(sqrt_price_current, sqrt_price_target, liquidity, false)?
            };
            Ok(StepResult {
                sqrt_price_next: sqrt_price_target,
                amount_in: max_in_to_target,
                amount_out,
                fee_amount: fee_for_full_cross,
                reached_target: true,
            })
        } else {
            let gross_in = amount_remaining;
            let fee_amount = fee_from_gross_input(gross_in, fee_rate)?;
            let net_in = gross_in.checked_sub(fee_amount).ok_or(CoreError::ArithmeticUnderflow)?;
            let sqrt_price_next = get_next_sqrt_price_from_input(sqrt_price_current, liquidity, net_in, a_to_b)?;
            let amount_out = if a_to_b {
                get_amount_b_delta(sqrt_price_current, sqrt_price_next, liquidity, false)?
            } else {
                get_amount_a_delta(sqrt_price_current, sqrt_price_next, liquidity, false)?
            };
            Ok(StepResult {
                sqrt_price_next,
                amount_in: net_in,
                amount_out,
                fee_amount,
                reached_target: false,
            })
        }
    } else {
        let max_out_to_target = if a_to_b {
            get_amount_b_delta(sqrt_price_current, sqrt_price_target, liquidity, false)?
        } else {
            get_amount_a_delta(sqrt_price_current, sqrt_price_target, liquidity, false)?
        };

        if max_out_to_target > 0 && max_out_to_target <= amount_remaining {
            let amount_in = if a_to_b {
                get_amount_a_delta(sqrt_price_current, sqrt_price_target, liquidity, true)?
            } else {
                get_amount_b_delta(sqrt_price_current, sqrt_price_target, liquidity, true)?
            };
            let fee_amount = fee_from_net_input_output_specified(amount_in, fee_rate)?;
            Ok(StepResult {
                sqrt_price_next: sqrt_price_target,
                amount_in,
                amount_out: max_out_to_target,
                fee_amount,
                reached_target: true,
            })
        } else {
            let amount_out = amount_remaining;
            let sqrt_price_next = get_next_sqrt_price_from_output(sqrt_price_current, liquidity, amount_out, a_to_b)?;
            let amount_in = if a_to_b {
                get_amount_a_delta(sqrt_price_current, sqrt_price_next, liquidity, true)?
            } else {
                get_amount_b_delta(sqrt_price_current, sqrt_price_next, liquidity, true)?
            };
            let fee_amount = fee_from_net_input_output_specified(amount_in, fee_rate)?;
            Ok(StepResult {
                sqrt_price_next,
                amount_in,
                amount_out,
                fee_amount,
                reached_target: false,
            })
        }
    }
}

/// `ceil(grossIn * feeRate / (ONE - feeRate))`, the input-specified fee
/// formula from 4.D step 3 — `grossIn` is the whole token amount consumed by
/// this step (capped at the remaining budget when the step doesn't fully
/// cross), fee comes out of it rather than on top.
fn fee_from_gross_input(gross_in: u64, fee_rate: u32) -> CoreResult<u64> {
    if fee_rate == 0 {
        return Ok(0);
    }
    let denom = FEE_RATE_DENOMINATOR.checked_sub(fee_rate).ok_or(CoreError::ArithmeticUnderflow)?;
    mul_div_u64(gross_in, fee_rate as u64, denom as u64, crate::math::big_int::Rounding::Up)
}

/// `ceil(amountIn * feeRate / ONE)`, the output-specified fee formula — an
/// additional cost on top of the already-exact `amountIn` needed to buy the
/// target output.
fn fee_from_net_input_output_specified(amount_in: u64, fee_rate: u32) -> CoreResult<u64> {
    mul_div_u64(amount_in, fee_rate as u64, FEE_RATE_DENOMINATOR as u64, crate::math::big_int::Rounding::Up)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Q64_ONE;
    use crate::types::pool::TickSlot;
    use solana_program::pubkey::Pubkey;

    fn test_pool(sqrt_price: u128, tick_current: i32, liquidity: u128, fee_rate: u32) -> Pool {
        Pool {
            address: Pubkey::new_unique(),
            token_mint_a: Pubkey::new_unique(),
            token_mint_b: Pubkey::new_unique(),
            token_vault_a: Pubkey::new_unique(),
            token_vault_b: Pubkey::new_unique(),
            tick_spacing: 8,
            fee_rate,
            sqrt_price,
            tick_current_index: tick_current,
            liquidity,
        }
    }

    fn wide_empty_array(start: i32) -> TickArray {
        TickArray { start_tick_index: start, ticks: vec![TickSlot::default(); 88] }
    }

    /// An array whose only initialised tick sits at its very first slot, far
    /// from tick 0 — enough for `next_initialized_tick` to find *something*
    /// without the simulated trade ever actually reaching it.
    fn array_with_far_boundary_tick(start: i32) -> TickArray {
        let mut ticks = vec![TickSlot::default(); 88];
        ticks[0] = TickSlot { initialized: true, liquidity_net: 0 };
        TickArray { start_tick_index: start, ticks }
    }

    #[test]
    fn test_fee_from_gross_input_matches_scenario_s4() {
        // S4: fee = ceil(1,000,000 * 3000 / 997000) = 3010.
        let fee = fee_from_gross_input(1_000_000, 3_000).unwrap();
        assert_eq!(fee, 3010);
    }

    #[test]
    fn test_swap_within_single_array_consumes_full_input() {
        let pool = test_pool(Q64_ONE, 0, 1_000_000_000_000u128, 3_000);
        let arrays = [array_with_far_boundary_tick(-88 * 8)];

        let result = quote_swap(&SwapQuoteParams {
            pool: &pool,
            amount_specified: 1_000_000,
            a_to_b: true,
            amount_specified_is_input: true,
            sqrt_price_limit: None,
            tick_arrays: &arrays,
            slippage: Slippage::default(),
        })
        .unwrap();

        assert_eq!(result.estimated_amount_in, 1_000_000);
        assert_eq!(result.estimated_fee_amount, 3010);
        assert!(result.estimated_amount_out > 0);
        assert!(result.sqrt_price_end < Q64_ONE);
    }

    #[test]
    fn test_zero_amount_specified_is_a_noop() {
        let pool = test_pool(Q64_ONE, 0, 1_000_000u128, 3_000);
        let arrays = [wide_empty_array(0)];
        let result = quote_swap(&SwapQuoteParams {
            pool: &pool,
            amount_specified: 0,
            a_to_b: true,
            amount_specified_is_input: true,
            sqrt_price_limit: None,
            tick_arrays: &arrays,
            slippage: Slippage::default(),
        })
        .unwrap();
        assert_eq!(result.estimated_amount_in, 0);
        assert_eq!(result.estimated_amount_out, 0);
    }

    #[test]
    fn test_zero_liquidity_at_start_with_no_ticks_errors() {
        let pool = test_pool(Q64_ONE, 0, 0u128, 3_000);
        let arrays = [wide_empty_array(-704), wide_empty_array(0), wide_empty_array(704)];
        let result = quote_swap(&SwapQuoteParams {
            pool: &pool,
            amount_specified: 1_000,
            a_to_b: false,
            amount_specified_is_input: true,
            sqrt_price_limit: None,
            tick_arrays: &arrays,
            slippage: Slippage::default(),
        });
        assert_eq!(result, Err(CoreError::ZeroLiquidity));
    }

    #[test]
    fn test_insufficient_tick_arrays_when_exhausted_mid_swap() {
        // Huge trade against tiny liquidity with no further arrays: the swap
        // never fills and must report InsufficientTickArrays, not silently
        // cap the fill.
        let pool = test_pool(Q64_ONE, 0, 1u128, 3_000);
        let arrays = [wide_empty_array(0)];
        let result = quote_swap(&SwapQuoteParams {
            pool: &pool,
            amount_specified: u64::MAX,
            a_to_b: true,
            amount_specified_is_input: true,
            sqrt_price_limit: None,
            tick_arrays: &arrays,
            slippage: Slippage::default(),
        });
        assert_eq!(result, Err(CoreError::InsufficientTickArrays));
    }

    #[test]
    fn test_output_specified_fee_uses_plain_fraction() {
        let fee = fee_from_net_input_output_specified(997_000, 3_000).unwrap();
        assert_eq!(fee, 2991); // ceil(997000*3000/1000000) = 2991
    }
}
