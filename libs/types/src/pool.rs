//! AMM pool reserve snapshots.

use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolState {
    pub pool: Address,
    pub reserve0: U256,
    pub reserve1: U256,
    pub fee_bps: u32,
    pub last_change_block: u64,
}

impl PoolState {
    /// depth = sqrt(reserve0 * reserve1), recomputed on demand rather than cached —
    /// never allowed to go stale beyond the block that changed the reserves.
    pub fn depth(&self) -> U256 {
        match self.reserve0.checked_mul(self.reserve1) {
            Some(product) => integer_sqrt(product),
            // Real reserves never reach the ~2^128 magnitude needed to overflow here;
            // this path falls back to sqrt(r0) * sqrt(r1), a safe underestimate.
            None => integer_sqrt(self.reserve0).saturating_mul(integer_sqrt(self.reserve1)),
        }
    }
}

/// Newton's-method integer square root, floor(sqrt(value)). Mirrors the teacher's
/// `decimal_sqrt` iteration shape, adapted to integers so reserve magnitudes stay
/// exact rather than downcasting through `Decimal`.
fn integer_sqrt(value: U256) -> U256 {
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

    fn pool(r0: u64, r1: u64) -> PoolState {
        PoolState {
            pool: Address::from_low_u64_be(1),
            reserve0: U256::from(r0),
            reserve1: U256::from(r1),
            fee_bps: 30,
            last_change_block: 100,
        }
    }

    #[test]
    fn depth_of_perfect_square_product() {
        // 100 * 400 = 40000, sqrt = 200
        assert_eq!(pool(100, 400).depth(), U256::from(200u64));
    }

    #[test]
    fn depth_of_zero_reserve_is_zero() {
        assert_eq!(pool(0, 1_000_000).depth(), U256::zero());
    }

    #[test]
    fn depth_floors_non_perfect_squares() {
        // sqrt(50) ~= 7.07 -> floors to 7
        let d = pool(1, 50).depth();
        assert_eq!(d, U256::from(7u64));
    }

    #[test]
    fn depth_handles_large_reserves_without_overflow() {
        let big = U256::from(10u64).pow(U256::from(30u64));
        let p = PoolState {
            pool: Address::from_low_u64_be(1),
            reserve0: big,
            reserve1: big,
            fee_bps: 30,
            last_change_block: 1,
        };
        assert_eq!(p.depth(), big);
    }
}
