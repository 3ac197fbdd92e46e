//! # Split Router (component F)
//!
//! Multi-hop, percentage-split routing. Quotes every candidate route at a
//! grid of trade-size percentages against the single-pool swap simulator,
//! prunes each percentage's quotes, then combines disjoint per-percent
//! quotes into splits that together cover the whole trade.
//!
//! The only suspension point is the [`Fetcher`] used to pull pool and
//! tick-array state (§5); everything else here is pure and synchronous.

use crate::errors::{RouterError, RouterResult};
use crate::fetcher::{CacheMode, Fetcher};
use clamm_core::swap_quote::{quote_swap, SwapQuoteParams};
use clamm_core::types::pool::{Pool, TickArray};
use clamm_core::types::route::{Hop, Route, RouteQuote, RouterOptions, Slippage, SplitResult};
use solana_program::pubkey::Pubkey;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Inputs for one `findBestRoutes` call.
pub struct FindBestRoutesParams<'a> {
    pub input_mint: Pubkey,
    pub output_mint: Pubkey,
    pub trade_amount: u64,
    pub amount_specified_is_input: bool,
    /// Candidate pool-address sequences connecting `input_mint` to
    /// `output_mint` (one walk's route set; §6 `walks`).
    pub routes: &'a [Route],
    /// Each pool's ordered token mints (§6 `pools`).
    pub pool_mints: &'a HashMap<Pubkey, (Pubkey, Pubkey)>,
    pub slippage: Slippage,
    pub options: RouterOptions,
}

/// Multi-hop router over a fetcher-backed pool graph.
pub struct SplitRouter<F: Fetcher + ?Sized> {
    fetcher: Arc<F>,
}

impl<F: Fetcher + ?Sized> SplitRouter<F> {
    pub fn new(fetcher: Arc<F>) -> Self {
        Self { fetcher }
    }

    pub async fn find_best_routes(&self, params: &FindBestRoutesParams<'_>) -> RouterResult<Vec<SplitResult>> {
        if 100 % params.options.percent_increment as u32 != 0 {
            return Err(RouterError::InvalidPercentIncrement(params.options.percent_increment));
        }
        if params.routes.is_empty() {
            return Ok(Vec::new());
        }

        let canonical_routes: Vec<Route> =
            params.routes.iter().map(|r| canonicalize_route(r, params.pool_mints, &params.input_mint)).collect();

        let pool_addrs: Vec<Pubkey> = canonical_routes
            .iter()
            .flat_map(|r| r.pools.iter().copied())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        log::debug!("find_best_routes: fetching {} pools across {} candidate routes", pool_addrs.len(), canonical_routes.len());
        let fetched = self.fetcher.list_pools(&pool_addrs, CacheMode::UseCache).await;
        let pools: HashMap<Pubkey, Pool> =
            pool_addrs.iter().copied().zip(fetched).filter_map(|(addr, pool)| pool.map(|p| (addr, p))).collect();
        if pools.len() < pool_addrs.len() {
            log::warn!("find_best_routes: fetcher returned no pool for {} of {} addresses", pool_addrs.len() - pools.len(), pool_addrs.len());
        }

        let percents = percent_table(&params.options);
        let mut quote_map: HashMap<u8, Vec<RouteQuote>> = HashMap::new();
        let mut fatal_seen = false;
        let mut tick_cache: HashMap<(Pubkey, bool), Vec<TickArray>> = HashMap::new();

        for &percent in &percents {
            let amount = (params.trade_amount as u128 * percent as u128 / 100) as u64;
            let mut per_percent = Vec::new();
            for route in &canonical_routes {
                match self
                    .quote_route_at_percent(
                        route,
                        &pools,
                        &mut tick_cache,
                        params.input_mint,
                        params.output_mint,
                        amount,
                        params.amount_specified_is_input,
                        params.slippage,
                    )
                    .await
                {
                    Ok(hops) => {
                        let amount_in = hops.first().map(|h| h.amount_in).unwrap_or(0);
                        let amount_out = hops.last().map(|h| h.amount_out).unwrap_or(0);
                        per_percent.push(RouteQuote { route: route.clone(), percent, amount_in, amount_out, hops });
                    }
                    Err(e) => {
                        if e.is_fatal() {
                            log::warn!("find_best_routes: route {:?} at {}% failed fatally: {}", route.pools, percent, e);
                            fatal_seen = true;
                        } else {
                            log::debug!("find_best_routes: route {:?} at {}% dropped: {}", route.pools, percent, e);
                        }
                    }
                }
            }
            quote_map.insert(percent, per_percent);
        }

        // Baseline: every route's un-pruned 100% quote is always a candidate.
        let baseline: Vec<SplitResult> = quote_map
            .get(&100)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|q| SplitResult { total_in: q.amount_in, total_out: q.amount_out, quotes: vec![q] })
            .collect();

        let mut pruned_map: HashMap<u8, Vec<RouteQuote>> = HashMap::new();
        for (&percent, quotes) in quote_map.iter() {
            let mut sorted = quotes.clone();
            sorted.sort_by(|a, b| rank_quote(a, b, params.amount_specified_is_input));
            sorted.truncate(params.options.num_top_partial_quotes);
            pruned_map.insert(percent, sorted);
        }

        let percent_multisets = percent_combinations(&percents, params.options.max_splits);
        let candidates = build_candidate_subsets(&pruned_map, &percent_multisets, params.options.max_splits);

        let mut results: Vec<SplitResult> = candidates
            .into_iter()
            .map(|quotes| {
                let total_in = quotes.iter().map(|q| q.amount_in).sum();
                let total_out = quotes.iter().map(|q| q.amount_out).sum();
                SplitResult { quotes, total_in, total_out }
            })
            .chain(baseline)
            .collect();

        results.sort_by(|a, b| rank_split(a, b, params.amount_specified_is_input));
        results.dedup_by(|a, b| a.quotes == b.quotes);
        results.truncate(params.options.num_top_routes);

        if results.is_empty() && fatal_seen {
            log::warn!("find_best_routes: every candidate route failed a fatal arithmetic check");
            return Err(RouterError::AllRoutesFailed);
        }

        log::debug!("find_best_routes: returning {} split result(s)", results.len());
        Ok(results)
    }

    /// Quote every hop of `route` for a single percentage of the trade,
    /// threading each hop's carry amount/token into the next per the
    /// direction implied by `amount_specified_is_input`.
    #[allow(clippy::too_many_arguments)]
    async fn quote_route_at_percent(
        &self,
        route: &Route,
        pools: &HashMap<Pubkey, Pool>,
        tick_cache: &mut HashMap<(Pubkey, bool), Vec<TickArray>>,
        input_mint: Pubkey,
        output_mint: Pubkey,
        percent_amount: u64,
        amount_specified_is_input: bool,
        slippage: Slippage,
    ) -> RouterResult<Vec<Hop>> {
        if amount_specified_is_input {
            let mut hops = Vec::with_capacity(route.len());
            let mut current_mint = input_mint;
            let mut current_amount = percent_amount;

            for pool_addr in &route.pools {
                let pool = pools.get(pool_addr).ok_or_else(|| RouterError::PoolNotFound(pool_addr.to_string()))?;
                let a_to_b = current_mint == pool.token_mint_a;
                let hop_output_mint = pool.other_mint(&current_mint).map_err(RouterError::Quote)?;

                let tick_arrays = self.tick_arrays_cached(pool, a_to_b, tick_cache).await;
                let quote = quote_swap(&SwapQuoteParams {
                    pool,
                    amount_specified: current_amount,
                    a_to_b,
                    amount_specified_is_input: true,
                    sqrt_price_limit: None,
                    tick_arrays: &tick_arrays,
                    slippage,
                })?;

                hops.push(Hop {
                    pool: *pool_addr,
                    a_to_b,
                    amount_in: quote.estimated_amount_in,
                    amount_out: quote.estimated_amount_out,
                    input_mint: current_mint,
                    output_mint: hop_output_mint,
                    swap_quote: quote,
                });
                current_mint = hop_output_mint;
                current_amount = quote.estimated_amount_out;
            }
            Ok(hops)
        } else {
            let mut hops = Vec::with_capacity(route.len());
            let mut current_mint = output_mint;
            let mut current_amount = percent_amount;

            for pool_addr in route.pools.iter().rev() {
                let pool = pools.get(pool_addr).ok_or_else(|| RouterError::PoolNotFound(pool_addr.to_string()))?;
                let a_to_b = current_mint == pool.token_mint_b;
                let hop_input_mint = pool.other_mint(&current_mint).map_err(RouterError::Quote)?;

                let tick_arrays = self.tick_arrays_cached(pool, a_to_b, tick_cache).await;
                let quote = quote_swap(&SwapQuoteParams {
                    pool,
                    amount_specified: current_amount,
                    a_to_b,
                    amount_specified_is_input: false,
                    sqrt_price_limit: None,
                    tick_arrays: &tick_arrays,
                    slippage,
                })?;

                hops.push(Hop {
                    pool: *pool_addr,
                    a_to_b,
                    amount_in: quote.estimated_amount_in,
                    amount_out: quote.estimated_amount_out,
                    input_mint: hop_input_mint,
                    output_mint: current_mint,
                    swap_quote: quote,
                });
                current_mint = hop_input_mint;
                current_amount = quote.estimated_amount_in;
            }
            hops.reverse();
            Ok(hops)
        }
    }

    async fn tick_arrays_cached(
        &self,
        pool: &Pool,
        a_to_b: bool,
        cache: &mut HashMap<(Pubkey, bool), Vec<TickArray>>,
    ) -> Vec<TickArray> {
        if let Some(cached) = cache.get(&(pool.address, a_to_b)) {
            return cached.clone();
        }
        let arrays = self.fetcher.tick_arrays_for_swap(pool, a_to_b, CacheMode::UseCache).await;
        cache.insert((pool.address, a_to_b), arrays.clone());
        arrays
    }
}

/// Reverse `route` if its first pool's mints don't include `input_mint`, so
/// every downstream hop can assume `route.pools[0]` sits on the input side.
fn canonicalize_route(route: &Route, pool_mints: &HashMap<Pubkey, (Pubkey, Pubkey)>, input_mint: &Pubkey) -> Route {
    let needs_reverse = match route.pools.first().and_then(|addr| pool_mints.get(addr)) {
        Some((a, b)) => a != input_mint && b != input_mint,
        None => false,
    };
    if needs_reverse {
        let mut pools = route.pools.clone();
        pools.reverse();
        Route { pools }
    } else {
        route.clone()
    }
}

fn percent_table(options: &RouterOptions) -> Vec<u8> {
    let steps = 100 / options.percent_increment as u32;
    (1..=steps).map(|i| (i * options.percent_increment as u32) as u8).collect()
}

/// Sort key for pruning a single percent's quotes: best objective first.
fn rank_quote(a: &RouteQuote, b: &RouteQuote, amount_specified_is_input: bool) -> Ordering {
    if amount_specified_is_input {
        b.amount_out.cmp(&a.amount_out)
    } else {
        a.amount_in.cmp(&b.amount_in)
    }
}

/// Tie-break order for combined splits: strict objective, then fewer splits,
/// then shorter total route length, then lexicographic by pool addresses.
fn rank_split(a: &SplitResult, b: &SplitResult, amount_specified_is_input: bool) -> Ordering {
    let objective = if amount_specified_is_input { b.total_out.cmp(&a.total_out) } else { a.total_in.cmp(&b.total_in) };
    objective
        .then_with(|| a.split_count().cmp(&b.split_count()))
        .then_with(|| a.total_route_length().cmp(&b.total_route_length()))
        .then_with(|| {
            let a_pools: Vec<Pubkey> = a.quotes.iter().flat_map(|q| q.route.pools.iter().copied()).collect();
            let b_pools: Vec<Pubkey> = b.quotes.iter().flat_map(|q| q.route.pools.iter().copied()).collect();
            a_pools.cmp(&b_pools)
        })
}

/// All non-decreasing sequences of percents from `percents` (repetition
/// allowed) of length `1..=max_splits` that sum to exactly 100.
fn percent_combinations(percents: &[u8], max_splits: usize) -> Vec<Vec<u8>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    percent_combinations_rec(percents, 100, max_splits, 0, &mut current, &mut out);
    out
}

fn percent_combinations_rec(
    percents: &[u8],
    remaining: u32,
    max_splits: usize,
    start_idx: usize,
    current: &mut Vec<u8>,
    out: &mut Vec<Vec<u8>>,
) {
    if remaining == 0 {
        if !current.is_empty() {
            out.push(current.clone());
        }
        return;
    }
    if current.len() >= max_splits {
        return;
    }
    for i in start_idx..percents.len() {
        let p = percents[i] as u32;
        if p <= remaining {
            current.push(percents[i]);
            percent_combinations_rec(percents, remaining - p, max_splits, i, current, out);
            current.pop();
        }
    }
}

/// All `k`-element subsets of `items`, preserving relative order.
fn combinations<T: Clone>(items: &[T], k: usize) -> Vec<Vec<T>> {
    if k == 0 {
        return vec![Vec::new()];
    }
    if items.len() < k {
        return Vec::new();
    }
    let mut out = Vec::new();
    for i in 0..=(items.len() - k) {
        let rest = combinations(&items[i + 1..], k - 1);
        for mut tail in rest {
            let mut combo = vec![items[i].clone()];
            combo.append(&mut tail);
            out.push(combo);
        }
    }
    out
}

/// Expand each percent multiset into concrete route-quote subsets, dropping
/// any that can't be filled (too few surviving quotes at some percent) or
/// that reuse a route (detected by a repeated first pool) across members.
fn build_candidate_subsets(
    quote_map: &HashMap<u8, Vec<RouteQuote>>,
    percent_multisets: &[Vec<u8>],
    max_splits: usize,
) -> Vec<Vec<RouteQuote>> {
    let mut candidates = Vec::new();

    for multiset in percent_multisets {
        let mut counts: Vec<(u8, usize)> = Vec::new();
        for &p in multiset {
            if let Some(entry) = counts.iter_mut().find(|(pp, _)| *pp == p) {
                entry.1 += 1;
            } else {
                counts.push((p, 1));
            }
        }

        let mut per_percent_combos: Vec<Vec<Vec<RouteQuote>>> = Vec::new();
        let mut feasible = true;
        for (percent, count) in &counts {
            let list = quote_map.get(percent).cloned().unwrap_or_default();
            if list.len() < *count {
                feasible = false;
                break;
            }
            per_percent_combos.push(combinations(&list, *count));
        }
        if !feasible {
            continue;
        }

        let mut products: Vec<Vec<RouteQuote>> = vec![Vec::new()];
        for group in per_percent_combos {
            let mut next_products = Vec::with_capacity(products.len() * group.len());
            for existing in &products {
                for combo in &group {
                    let mut merged = existing.clone();
                    merged.extend(combo.iter().cloned());
                    next_products.push(merged);
                }
            }
            products = next_products;
        }

        for subset in products {
            if subset.len() > max_splits {
                continue;
            }
            let mut seen_first_pools = HashSet::new();
            let disjoint =
                subset.iter().all(|q| q.route.first_pool().map(|p| seen_first_pools.insert(*p)).unwrap_or(false));
            if disjoint {
                candidates.push(subset);
            }
        }
    }

    candidates
}
