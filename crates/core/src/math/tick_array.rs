//! # Tick Array Index (component C)
//!
//! Navigates a contiguous slab of [`TickArray`]s to find the next
//! initialised tick in a swap direction.

use crate::types::pool::TickArray;

/// Find the next initialised tick strictly in the direction of travel from
/// `from_tick`, searching `tick_arrays` in order (the caller supplies them
/// already ordered along the travel direction — three consecutive arrays is
/// the common case per 4.C).
///
/// `a_to_b == true` searches downward (decreasing tick); `false` searches
/// upward. Returns `None` if the search runs off the end of the supplied
/// arrays without finding an initialised tick — the caller (the swap quote)
/// treats this as "need more arrays" and stops at the last price reached.
pub fn next_initialized_tick(
    from_tick: i32,
    tick_spacing: i32,
    a_to_b: bool,
    tick_arrays: &[TickArray],
) -> Option<(i32, i128)> {
    if a_to_b {
        search_down(from_tick, tick_spacing, tick_arrays)
    } else {
        search_up(from_tick, tick_spacing, tick_arrays)
    }
}

fn search_down(from_tick: i32, tick_spacing: i32, tick_arrays: &[TickArray]) -> Option<(i32, i128)> {
    let mut candidate = from_tick - tick_spacing;

    for array in tick_arrays {
        let array_end = array.start_tick_index;
        let array_last = array_end + (array.ticks.len() as i32 - 1) * tick_spacing;

        if candidate > array_last || candidate < array_end {
            continue;
        }

        while candidate >= array_end {
            if let Some(slot) = array.get(candidate, tick_spacing) {
                if slot.initialized {
                    return Some((candidate, slot.liquidity_net));
                }
            }
            candidate -= tick_spacing;
        }
    }

    None
}

fn search_up(from_tick: i32, tick_spacing: i32, tick_arrays: &[TickArray]) -> Option<(i32, i128)> {
    let mut candidate = from_tick + tick_spacing;

    for array in tick_arrays {
        let array_start = array.start_tick_index;
        let array_last = array_start + (array.ticks.len() as i32 - 1) * tick_spacing;

        if candidate < array_start || candidate > array_last {
            continue;
        }

        while candidate <= array_last {
            if let Some(slot) = array.get(candidate, tick_spacing) {
                if slot.initialized {
                    return Some((candidate, slot.liquidity_net));
                }
            }
            candidate += tick_spacing;
        }
    }

    None
}
