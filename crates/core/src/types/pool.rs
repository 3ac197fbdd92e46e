//! Pool and tick-array state, and position-range classification.

use solana_program::pubkey::Pubkey;

use crate::constants::FEE_RATE_DENOMINATOR;
use crate::errors::{CoreError, CoreResult};

/// On-chain concentrated-liquidity pool state, as seen by the off-chain core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub struct Pool {
    pub address: Pubkey,
    /// Token mint with the smaller byte-lex value of the two.
    pub token_mint_a: Pubkey,
    pub token_mint_b: Pubkey,
    pub token_vault_a: Pubkey,
    pub token_vault_b: Pubkey,
    /// Spacing between initialisable ticks.
    pub tick_spacing: u16,
    /// Fee rate, parts-per-million of the input amount.
    pub fee_rate: u32,
    pub sqrt_price: u128,
    pub tick_current_index: i32,
    pub liquidity: u128,
}

impl Pool {
    /// Fee rate as a fraction of 1, e.g. `0.003` for 3000 ppm.
    pub fn fee_fraction(&self) -> f64 {
        self.fee_rate as f64 / FEE_RATE_DENOMINATOR as f64
    }

    /// `true` if `mint` is one of this pool's two token mints.
    pub fn has_mint(&self, mint: &Pubkey) -> bool {
        self.token_mint_a == *mint || self.token_mint_b == *mint
    }

    /// The mint on the other side of the pool from `mint`. Errors with
    /// `InputMintMismatch` if `mint` is neither of the pool's two mints.
    pub fn other_mint(&self, mint: &Pubkey) -> CoreResult<Pubkey> {
        if self.token_mint_a == *mint {
            Ok(self.token_mint_b)
        } else if self.token_mint_b == *mint {
            Ok(self.token_mint_a)
        } else {
            Err(CoreError::InputMintMismatch)
        }
    }
}

/// One slot in a [`TickArray`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub struct TickSlot {
    pub initialized: bool,
    pub liquidity_net: i128,
}

/// A dense, aligned slab of tick slots.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub struct TickArray {
    pub start_tick_index: i32,
    pub ticks: Vec<TickSlot>,
}

impl TickArray {
    /// Index of `tick` within `self.ticks`, if it falls inside this array's
    /// range (callers pass already-spacing-aligned ticks).
    pub fn slot_index(&self, tick: i32, tick_spacing: i32) -> Option<usize> {
        if tick < self.start_tick_index {
            return None;
        }
        let offset = (tick - self.start_tick_index) / tick_spacing;
        if offset < 0 || offset as usize >= self.ticks.len() {
            return None;
        }
        Some(offset as usize)
    }

    pub fn get(&self, tick: i32, tick_spacing: i32) -> Option<TickSlot> {
        self.slot_index(tick, tick_spacing).map(|i| self.ticks[i])
    }
}

/// Where a position's tick range sits relative to the pool's current tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionStatus {
    Below,
    In,
    Above,
}

/// Classify a position range relative to the pool's current tick (4.B `classify`).
pub fn classify_position(tick_current: i32, tick_lower: i32, tick_upper: i32) -> PositionStatus {
    if tick_current < tick_lower {
        PositionStatus::Below
    } else if tick_current < tick_upper {
        PositionStatus::In
    } else {
        PositionStatus::Above
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_position() {
        assert_eq!(classify_position(0, 128, 256), PositionStatus::Below);
        assert_eq!(classify_position(0, -64, 64), PositionStatus::In);
        assert_eq!(classify_position(300, 128, 256), PositionStatus::Above);
        // Boundary: tickCurrent == tickLower is "In", tickCurrent == tickUpper is "Above".
        assert_eq!(classify_position(128, 128, 256), PositionStatus::In);
        assert_eq!(classify_position(256, 128, 256), PositionStatus::Above);
    }

    #[test]
    fn test_tick_array_slot_lookup() {
        let array = TickArray {
            start_tick_index: 100,
            ticks: vec![TickSlot::default(); 4],
        };
        assert_eq!(array.slot_index(100, 10), Some(0));
        assert_eq!(array.slot_index(130, 10), Some(3));
        assert_eq!(array.slot_index(140, 10), None);
        assert_eq!(array.slot_index(90, 10), None);
    }

    fn test_pool() -> Pool {
        Pool {
            address: Pubkey::new_unique(),
            token_mint_a: Pubkey::new_unique(),
            token_mint_b: Pubkey::new_unique(),
            token_vault_a: Pubkey::new_unique(),
            token_vault_b: Pubkey::new_unique(),
            tick_spacing: 8,
            fee_rate: 3_000,
            sqrt_price: 0,
            tick_current_index: 0,
            liquidity: 0,
        }
    }

    #[test]
    fn test_other_mint_returns_the_opposite_side() {
        let pool = test_pool();
        assert_eq!(pool.other_mint(&pool.token_mint_a), Ok(pool.token_mint_b));
        assert_eq!(pool.other_mint(&pool.token_mint_b), Ok(pool.token_mint_a));
    }

    #[test]
    fn test_other_mint_rejects_a_foreign_mint() {
        let pool = test_pool();
        let foreign = Pubkey::new_unique();
        assert_eq!(pool.other_mint(&foreign), Err(CoreError::InputMintMismatch));
    }
}
