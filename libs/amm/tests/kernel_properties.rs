//! Property tests for the numeric kernel's invariants: monotonicity of price impact,
//! and clamping bounds on the gas-weighted tip.

use ambush_amm::{gas_weighted_tip, price_impact_sweep};
use ethers::types::U256;
use proptest::prelude::*;

proptest! {
    #[test]
    fn price_impact_is_monotone_non_decreasing(
        reserve_in in 1_000u64..1_000_000_000u64,
        reserve_out in 1_000u64..1_000_000_000u64,
        fee_bps in 0u32..1_000u32,
        a in 1u64..10_000u64,
        b in 1u64..10_000u64,
    ) {
        let (small, large) = if a <= b { (a, b) } else { (b, a) };
        let amounts = [U256::from(small), U256::from(large)];
        let sweep = price_impact_sweep(
            U256::from(reserve_in),
            U256::from(reserve_out),
            fee_bps,
            &amounts,
        ).unwrap();
        prop_assert!(sweep[0] <= sweep[1]);
    }

    #[test]
    fn gas_weighted_tip_stays_within_bounds(
        gas_price in 1u64..10_000_000_000u64,
        weight_ppm in 0u32..=1_000_000u32,
    ) {
        let tip = gas_weighted_tip(&[U256::from(gas_price)], &[weight_ppm]).unwrap();
        prop_assert!(tip >= U256::from(21_000u64));
        prop_assert!(tip <= U256::from(500_000u64));
    }
}
