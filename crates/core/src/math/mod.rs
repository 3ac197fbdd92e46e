//! # Math Layer
//!
//! Fixed-point and position math used by the swap and liquidity quote APIs.

pub mod big_int;
pub mod fixed_point_math;
pub mod position_math;
pub mod safe_math;
pub mod tick_array;
pub mod tick_math;

pub use big_int::*;
pub use fixed_point_math::*;
pub use position_math::*;
pub use safe_math::*;
pub use tick_array::*;
pub use tick_math::*;
