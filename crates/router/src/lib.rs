//! # CLAMM Router
//!
//! Multi-hop, percentage-split routing over concentrated-liquidity pools.
//! Builds on `clamm-core`'s single-pool swap simulator (component D) to
//! implement `findBestRoutes` (component F): quote every candidate route at
//! a grid of trade-size percentages, then combine disjoint per-percent
//! quotes into splits that cover the whole trade at the best price.
//!
//! ## Feature Flags
//!
//! - `client`: Enables `serde` serialization for off-chain use

pub mod errors;
pub mod fetcher;
pub mod split_router;

pub use errors::{RouterError, RouterResult};
pub use fetcher::{CacheMode, Fetcher};
pub use split_router::{FindBestRoutesParams, SplitRouter};

pub use clamm_core;
