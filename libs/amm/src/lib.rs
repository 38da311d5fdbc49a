//! Deterministic, side-effect-free AMM math and opportunity-sizing kernel.
//!
//! Every routine here is a pure function over 256-bit integer reserves and amounts —
//! no RPC calls, no clocks, no shared state. Strategies (C4) call these sweeps with
//! the amount ladders their behavior specifies and pick a winner from the result.

pub mod optimal_size;
pub mod pool_traits;
pub mod v2_math;

pub use optimal_size::{
    best_of_profit_sweep, gas_weighted_tip, price_impact_sweep, profit_per_amount_sweep,
    sandwich_optimum, PathHop,
};
pub use pool_traits::{AmmPool, PoolType};
pub use v2_math::{V2Math, V2PoolState};

use ethers::types::U256;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum KernelError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("intermediate calculation overflowed 256 bits")]
    Overflow,
    #[error("input vector must not be empty")]
    EmptyInput,
}

/// Newton's-method integer square root, floor(sqrt(value)). Shared by the optimal
/// arbitrage amount and sandwich optimum formulas, both of which need an exact
/// constant-product square root rather than a `Decimal` approximation.
pub(crate) fn integer_sqrt(value: U256) -> U256 {
    if value.is_zero() {
        return U256::zero();
    }
    let mut x = value;
    let mut y = (x + U256::one()) / U256::from(2u8);
    while y < x {
        x = y;
        y = (x + value / x) / U256::from(2u8);
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_sqrt_of_perfect_square() {
        assert_eq!(integer_sqrt(U256::from(144u64)), U256::from(12u64));
    }

    #[test]
    fn integer_sqrt_floors_non_perfect_square() {
        assert_eq!(integer_sqrt(U256::from(50u64)), U256::from(7u64));
    }
}
