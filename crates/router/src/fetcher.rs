//! # Fetcher (component F's only suspension point)
//!
//! [`SplitRouter`](crate::split_router::SplitRouter) is pure and synchronous
//! apart from calls through this trait (§5): listing pools and tick arrays
//! are the sole points where the router awaits external I/O, and cancelling
//! there is the sole cancellation point for a whole `findBestRoutes` call.

use clamm_core::types::pool::{Pool, TickArray};
use solana_program::pubkey::Pubkey;

/// Whether a fetch may be served from a local cache or must hit the source
/// of truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    UseCache,
    Bypass,
}

/// External read access to pool and tick-array state. Implementors decide
/// how caching, batching and RPC retries work; the router only needs the
/// array-aligned, `None`-on-miss contract below.
pub trait Fetcher: Send + Sync {
    /// Fetch pools by address. The result is aligned index-for-index with
    /// `addresses`; a miss is `None` rather than a shortened vector, so a
    /// caller never has to re-derive which address a result belongs to.
    async fn list_pools(&self, addresses: &[Pubkey], cache_mode: CacheMode) -> Vec<Option<Pool>>;

    /// Fetch tick arrays by address, same alignment contract as
    /// [`Fetcher::list_pools`].
    async fn list_tick_arrays(&self, addresses: &[Pubkey], cache_mode: CacheMode) -> Vec<Option<TickArray>>;

    /// Fetch a single pool.
    async fn get_pool(&self, address: &Pubkey, cache_mode: CacheMode) -> Option<Pool> {
        self.list_pools(std::slice::from_ref(address), cache_mode).await.into_iter().next().flatten()
    }

    /// Fetch the (up to [`clamm_core::MAX_SWAP_TICK_ARRAYS`]) tick arrays a
    /// swap against `pool` needs in direction `a_to_b`, already ordered along
    /// the direction of travel starting from the pool's current tick bucket.
    ///
    /// Tick-array addresses are derivable from the pool address and its
    /// current tick bucket; deriving and batching those addresses is the
    /// fetcher's job (§6), not the router's — implementors typically build
    /// this on top of [`Fetcher::list_tick_arrays`].
    async fn tick_arrays_for_swap(&self, pool: &Pool, a_to_b: bool, cache_mode: CacheMode) -> Vec<TickArray>;
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::collections::HashMap;

    /// An in-memory [`Fetcher`] backed by fixed maps, for exercising the
    /// router without any real I/O. `tick_arrays` holds, per pool, the
    /// arrays already ordered for both directions of travel.
    pub struct StaticFetcher {
        pub pools: HashMap<Pubkey, Pool>,
        pub tick_arrays: HashMap<Pubkey, TickArray>,
        pub swap_tick_arrays: HashMap<Pubkey, Vec<TickArray>>,
    }

    impl Fetcher for StaticFetcher {
        async fn list_pools(&self, addresses: &[Pubkey], _cache_mode: CacheMode) -> Vec<Option<Pool>> {
            addresses.iter().map(|a| self.pools.get(a).copied()).collect()
        }

        async fn list_tick_arrays(&self, addresses: &[Pubkey], _cache_mode: CacheMode) -> Vec<Option<TickArray>> {
            addresses.iter().map(|a| self.tick_arrays.get(a).cloned()).collect()
        }

        async fn tick_arrays_for_swap(&self, pool: &Pool, _a_to_b: bool, _cache_mode: CacheMode) -> Vec<TickArray> {
            self.swap_tick_arrays.get(&pool.address).cloned().unwrap_or_default()
        }
    }
}
