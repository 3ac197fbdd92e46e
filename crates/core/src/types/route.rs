//! Routing-facing types: slippage, routes, hops and quotes.
//!
//! These are data-only; the routing algorithm itself (component F) lives in
//! the `clamm-router` crate, which depends on this crate for these types plus
//! the single-pool [`crate::swap_quote::SwapQuote`].

use crate::swap_quote::SwapQuote;
use solana_program::pubkey::Pubkey;

/// A non-negative rational slippage tolerance, e.g. `{ numerator: 1, denominator: 100 }`
/// for 1%.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub struct Slippage {
    pub numerator: u64,
    pub denominator: u64,
}

impl Default for Slippage {
    fn default() -> Self {
        Self { numerator: 0, denominator: 100 }
    }
}

impl Slippage {
    pub fn new(numerator: u64, denominator: u64) -> Self {
        Self { numerator, denominator }
    }

    /// `amount * (1 - slippage)`, rounded down.
    pub fn apply_down(&self, amount: u64) -> u64 {
        if self.denominator == 0 {
            return amount;
        }
        let scaled = (amount as u128) * (self.denominator - self.numerator.min(self.denominator)) as u128;
        (scaled / self.denominator as u128) as u64
    }

    /// `amount * (1 + slippage)`, rounded up.
    pub fn apply_up(&self, amount: u64) -> u64 {
        if self.denominator == 0 {
            return amount;
        }
        let num = self.denominator as u128 + self.numerator as u128;
        let scaled = (amount as u128) * num;
        let denom = self.denominator as u128;
        ((scaled + denom - 1) / denom) as u64
    }

    pub fn as_fraction(&self) -> f64 {
        if self.denominator == 0 {
            0.0
        } else {
            self.numerator as f64 / self.denominator as f64
        }
    }
}

/// An ordered sequence of pool addresses connecting an input to an output
/// token. Oriented: `pools[0]` holds the input mint, `pools[last]` holds the
/// output mint.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    pub pools: Vec<Pubkey>,
}

impl Route {
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    pub fn first_pool(&self) -> Option<&Pubkey> {
        self.pools.first()
    }
}

/// One single-pool swap within a [`Route`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub struct Hop {
    pub pool: Pubkey,
    pub a_to_b: bool,
    pub amount_in: u64,
    pub amount_out: u64,
    pub input_mint: Pubkey,
    pub output_mint: Pubkey,
    /// The full single-pool quote this hop was built from (§3 `swapQuote`):
    /// carries the fee, end price/tick and slippage threshold that
    /// `amount_in`/`amount_out` alone don't.
    pub swap_quote: SwapQuote,
}

/// A single route's quote at one percentage of the total trade.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteQuote {
    pub route: Route,
    pub percent: u8,
    pub amount_in: u64,
    pub amount_out: u64,
    pub hops: Vec<Hop>,
}

impl RouteQuote {
    /// Every hop slot is filled and the totals agree with the endpoints
    /// (§3 invariant: `hops[0].amountIn == amountIn`, `hops[last].amountOut == amountOut`).
    pub fn is_complete(&self) -> bool {
        self.hops.len() == self.route.len()
            && self.hops.first().map(|h| h.amount_in) == Some(self.amount_in)
            && self.hops.last().map(|h| h.amount_out) == Some(self.amount_out)
    }
}

/// A combination of route quotes whose percents sum to 100.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub struct SplitResult {
    pub quotes: Vec<RouteQuote>,
    pub total_in: u64,
    pub total_out: u64,
}

impl SplitResult {
    pub fn percent_sum(&self) -> u32 {
        self.quotes.iter().map(|q| q.percent as u32).sum()
    }

    pub fn split_count(&self) -> usize {
        self.quotes.len()
    }

    pub fn total_route_length(&self) -> usize {
        self.quotes.iter().map(|q| q.route.len()).sum()
    }
}

/// Tunable parameters for [`crate`]'s liquidity quotes and, by re-export,
/// `clamm-router`'s split search (4.F "Options").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub struct RouterOptions {
    /// Granularity of splits in percent; must divide 100.
    pub percent_increment: u8,
    /// How many split sets `findBestRoutes` returns.
    pub num_top_routes: usize,
    /// Per-percent pruning width before combining splits.
    pub num_top_partial_quotes: usize,
    /// Maximum number of routes combined into one split set.
    pub max_splits: usize,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            percent_increment: crate::constants::DEFAULT_PERCENT_INCREMENT,
            num_top_routes: crate::constants::DEFAULT_NUM_TOP_ROUTES,
            num_top_partial_quotes: crate::constants::DEFAULT_NUM_TOP_PARTIAL_QUOTES,
            max_splits: crate::constants::DEFAULT_MAX_SPLITS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slippage_bounds() {
        let slippage = Slippage::new(1, 100); // 1%
        assert_eq!(slippage.apply_down(1000), 990);
        assert_eq!(slippage.apply_up(1000), 1010);
    }

    #[test]
    fn test_slippage_zero() {
        let slippage = Slippage::default();
        assert_eq!(slippage.apply_down(1000), 1000);
        assert_eq!(slippage.apply_up(1000), 1000);
    }

    #[test]
    fn test_router_options_default_divides_100() {
        let options = RouterOptions::default();
        assert_eq!(100 % options.percent_increment as u32, 0);
    }
}
