//! Unified pool interface for cross-protocol arbitrage path construction.

use crate::v2_math::{V2Math, V2PoolState};
use crate::KernelError;
use ethers::types::U256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolType {
    UniswapV2,
    SushiSwap,
    Curve,
    Balancer,
}

pub trait AmmPool {
    fn get_amount_out(&self, amount_in: U256) -> Result<U256, KernelError>;
    fn get_amount_in(&self, amount_out: U256) -> Result<U256, KernelError>;
    fn get_liquidity(&self) -> (U256, U256);
    fn get_fee_bps(&self) -> u32;
}

impl AmmPool for V2PoolState {
    fn get_amount_out(&self, amount_in: U256) -> Result<U256, KernelError> {
        V2Math::calculate_output_amount(amount_in, self.reserve_in, self.reserve_out, self.fee_bps)
    }

    fn get_amount_in(&self, amount_out: U256) -> Result<U256, KernelError> {
        V2Math::calculate_input_amount(amount_out, self.reserve_in, self.reserve_out, self.fee_bps)
    }

    fn get_liquidity(&self) -> (U256, U256) {
        (self.reserve_in, self.reserve_out)
    }

    fn get_fee_bps(&self) -> u32 {
        self.fee_bps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amm_pool_trait_matches_v2_math_directly() {
        let pool = V2PoolState {
            reserve_in: U256::from(1_000u64),
            reserve_out: U256::from(2_000u64),
            fee_bps: 30,
        };
        let via_trait = pool.get_amount_out(U256::from(100u64)).unwrap();
        let via_math =
            V2Math::calculate_output_amount(U256::from(100u64), U256::from(1_000u64), U256::from(2_000u64), 30)
                .unwrap();
        assert_eq!(via_trait, via_math);
    }
}
