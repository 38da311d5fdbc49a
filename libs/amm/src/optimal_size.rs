//! The numeric kernel's vectorized sweeps: price impact, profit-per-amount, sandwich
//! optimum, and gas-weighted tip. Every routine is deterministic and side-effect-free,
//! and every routine accepting a vector rejects an empty one.

use crate::v2_math::{V2Math, V2PoolState};
use crate::KernelError;
use ethers::types::U256;

/// One hop of a multi-pool path: the pool state and which side of it is being entered.
#[derive(Debug, Clone, Copy)]
pub struct PathHop {
    pub pool: V2PoolState,
}

/// Slippage (parts-per-million of the pre-trade price) for each principal in `amounts`.
/// Monotone non-decreasing in `amounts` by construction of the underlying formula.
pub fn price_impact_sweep(
    reserve_in: U256,
    reserve_out: U256,
    fee_bps: u32,
    amounts: &[U256],
) -> Result<Vec<u32>, KernelError> {
    if amounts.is_empty() {
        return Err(KernelError::EmptyInput);
    }
    amounts
        .iter()
        .map(|&a| V2Math::calculate_slippage_ppm(a, reserve_in, reserve_out, fee_bps))
        .collect()
}

/// Net profit (output - principal - gas_cost) for each principal in `principals`, over
/// a path of hops. Cyclic paths (arbitrage) feed the output of the last hop back in as
/// the profit basis; linear paths (sandwich legs) do not.
pub fn profit_per_amount_sweep(
    path: &[PathHop],
    gas_cost: U256,
    principals: &[U256],
) -> Result<Vec<ethers::types::I256>, KernelError> {
    if principals.is_empty() {
        return Err(KernelError::EmptyInput);
    }
    if path.is_empty() {
        return Err(KernelError::InvalidInput("path must have at least one hop".into()));
    }

    principals
        .iter()
        .map(|&principal| {
            let mut amount = principal;
            for hop in path {
                amount = V2Math::calculate_output_amount(
                    amount,
                    hop.pool.reserve_in,
                    hop.pool.reserve_out,
                    hop.pool.fee_bps,
                )?;
            }
            let gross = ethers::types::I256::try_from(amount).map_err(|_| KernelError::Overflow)?;
            let cost = ethers::types::I256::try_from(principal)
                .map_err(|_| KernelError::Overflow)?
                + ethers::types::I256::try_from(gas_cost).map_err(|_| KernelError::Overflow)?;
            Ok(gross - cost)
        })
        .collect()
}

/// Picks the best (principal, profit) pair from a profit-per-amount sweep, breaking
/// ties on identical profit by preferring the smaller principal.
pub fn best_of_profit_sweep(
    principals: &[U256],
    profits: &[ethers::types::I256],
) -> Option<(U256, ethers::types::I256)> {
    principals
        .iter()
        .zip(profits.iter())
        .max_by(|(p_a, profit_a), (p_b, profit_b)| {
            profit_a.cmp(profit_b).then_with(|| p_b.cmp(p_a))
        })
        .map(|(&p, &profit)| (p, profit))
}

/// Front-run/sandwich amount that maximizes gross extraction against a victim trade of
/// size `victim_principal` moving through a pool of depth `pool_depth`, under the
/// standard no-fee constant-product closed form: front* = sqrt(depth * (depth +
/// victim_principal)) - depth. This is the limit of the exact maximizer as the pool's
/// two sides are assumed symmetric (`pool_depth` already folds reserve0/reserve1 into
/// one scalar via `PoolState::depth`), and is monotone increasing in victim_principal
/// for any positive depth — unlike `sqrt(depth * victim) - depth/2`, it never collapses
/// to zero merely because the victim is a small fraction of the pool. Returns
/// (front_amount, expected_gross); zero when the extraction would not clear twice the
/// gas cost of the two hops it costs to execute.
pub fn sandwich_optimum(
    victim_principal: U256,
    pool_depth: U256,
    gas_price: U256,
    gas_units_per_hop: U256,
) -> Result<(U256, U256), KernelError> {
    if pool_depth.is_zero() {
        return Err(KernelError::InvalidInput("pool depth must be positive".into()));
    }

    let depth_plus_victim = pool_depth
        .checked_add(victim_principal)
        .ok_or(KernelError::Overflow)?;
    let inner = pool_depth
        .checked_mul(depth_plus_victim)
        .ok_or(KernelError::Overflow)?;
    let sqrt_term = crate::integer_sqrt(inner);

    let front_amount = sqrt_term.saturating_sub(pool_depth);

    if front_amount.is_zero() {
        return Ok((U256::zero(), U256::zero()));
    }

    // Expected gross approximated as the share of the victim's price impact the
    // front-run captures: front_amount scaled by victim_principal over pool depth.
    let expected_gross = front_amount
        .checked_mul(victim_principal)
        .ok_or(KernelError::Overflow)?
        / pool_depth;

    let floor = gas_price
        .checked_mul(gas_units_per_hop)
        .and_then(|v| v.checked_mul(U256::from(2u8)))
        .ok_or(KernelError::Overflow)?;

    if expected_gross <= floor {
        return Ok((U256::zero(), U256::zero()));
    }

    Ok((front_amount, expected_gross))
}

/// int(sum(gas_price_i * weight_i) * 1.1), clamped to [21_000, 500_000]. Weights are
/// parts-per-million (success rates) so the whole computation stays integral.
pub fn gas_weighted_tip(gas_prices: &[U256], weights_ppm: &[u32]) -> Result<U256, KernelError> {
    if gas_prices.is_empty() || weights_ppm.is_empty() {
        return Err(KernelError::EmptyInput);
    }
    if gas_prices.len() != weights_ppm.len() {
        return Err(KernelError::InvalidInput(
            "gas_prices and weights_ppm must have equal length".into(),
        ));
    }

    let mut weighted_sum = U256::zero();
    for (&gp, &w) in gas_prices.iter().zip(weights_ppm.iter()) {
        let term = gp
            .checked_mul(U256::from(w))
            .ok_or(KernelError::Overflow)?
            / U256::from(1_000_000u32);
        weighted_sum = weighted_sum.checked_add(term).ok_or(KernelError::Overflow)?;
    }

    let boosted = weighted_sum
        .checked_mul(U256::from(11u8))
        .ok_or(KernelError::Overflow)?
        / U256::from(10u8);

    Ok(boosted.clamp(U256::from(21_000u32), U256::from(500_000u32)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(r_in: u64, r_out: u64, fee_bps: u32) -> V2PoolState {
        V2PoolState {
            reserve_in: U256::from(r_in),
            reserve_out: U256::from(r_out),
            fee_bps,
        }
    }

    #[test]
    fn price_impact_sweep_is_monotone_non_decreasing() {
        let amounts = vec![U256::from(10u64), U256::from(100u64), U256::from(1_000u64)];
        let sweep = price_impact_sweep(U256::from(100_000u64), U256::from(200_000u64), 30, &amounts).unwrap();
        assert!(sweep[0] <= sweep[1]);
        assert!(sweep[1] <= sweep[2]);
    }

    #[test]
    fn price_impact_sweep_rejects_empty_input() {
        assert!(matches!(
            price_impact_sweep(U256::from(1u64), U256::from(1u64), 30, &[]),
            Err(KernelError::EmptyInput)
        ));
    }

    #[test]
    fn profit_sweep_over_cyclic_path_can_be_negative() {
        let path = vec![
            PathHop { pool: pool(10_000, 10_000, 30) },
            PathHop { pool: pool(10_000, 9_900, 30) },
        ];
        let principals = vec![U256::from(100u64)];
        let profits = profit_per_amount_sweep(&path, U256::from(10u64), &principals).unwrap();
        assert!(profits[0].is_negative());
    }

    #[test]
    fn best_of_profit_sweep_breaks_ties_on_smaller_principal() {
        let principals = vec![U256::from(10u64), U256::from(20u64)];
        let profits = vec![ethers::types::I256::from(5i64), ethers::types::I256::from(5i64)];
        let (best_principal, _) = best_of_profit_sweep(&principals, &profits).unwrap();
        assert_eq!(best_principal, U256::from(10u64));
    }

    #[test]
    fn sandwich_optimum_is_zero_below_gas_floor() {
        let (front, gross) =
            sandwich_optimum(U256::from(10u64), U256::from(1_000_000u64), U256::from(100u64), U256::from(21_000u64))
                .unwrap();
        assert_eq!(front, U256::zero());
        assert_eq!(gross, U256::zero());
    }

    #[test]
    fn sandwich_optimum_is_positive_for_a_large_victim() {
        // Wei-scale pool (100 native units deep) against a victim trading 10% of it.
        let depth = U256::from(10u64).pow(U256::from(20u64));
        let victim = depth / U256::from(10u8);
        let (front, gross) =
            sandwich_optimum(victim, depth, U256::from(10_000_000_000u64), U256::from(21_000u64)).unwrap();
        assert!(front > U256::zero());
        assert!(gross > U256::zero());
    }

    #[test]
    fn sandwich_optimum_is_positive_for_a_small_fraction_victim() {
        // A victim that is a small fraction of pool depth must still clear a low gas
        // floor — the prior `sqrt(depth*victim) - depth/2` formula zeroed out here.
        let depth = U256::from(10u64).pow(U256::from(20u64));
        let victim = U256::from(10u64).pow(U256::from(18u64));
        let (front, gross) = sandwich_optimum(victim, depth, U256::from(1u64), U256::from(21_000u64)).unwrap();
        assert!(front > U256::zero());
        assert!(gross > U256::zero());
    }

    #[test]
    fn gas_weighted_tip_clamps_to_floor() {
        let tip = gas_weighted_tip(&[U256::from(1u64)], &[1_000_000u32]).unwrap();
        assert_eq!(tip, U256::from(21_000u64));
    }

    #[test]
    fn gas_weighted_tip_clamps_to_ceiling() {
        let tip = gas_weighted_tip(&[U256::from(10_000_000u64)], &[1_000_000u32]).unwrap();
        assert_eq!(tip, U256::from(500_000u64));
    }

    #[test]
    fn gas_weighted_tip_rejects_mismatched_lengths() {
        assert!(gas_weighted_tip(&[U256::from(1u64), U256::from(2u64)], &[1_000_000u32]).is_err());
    }

    #[test]
    fn gas_weighted_tip_rejects_empty_input() {
        assert!(matches!(gas_weighted_tip(&[], &[]), Err(KernelError::EmptyInput)));
    }
}
