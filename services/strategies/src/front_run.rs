//! Front-run strategy (spec.md §4.5): requires a pending victim tx whose native value
//! exceeds `min_target_value`; chooses principal by C3's price-impact sweep at
//! {0.5, 1.0, 1.5, 2.0}x victim-value, picking the lowest-impact principal that still
//! nets positive.

use async_trait::async_trait;
use ethers::types::{Bytes, U256};

use ambush_amm::price_impact_sweep;
use ambush_bundle_builder::{BundleBuilder as Builder, ShapeKind, TxLeg};
use ambush_types::{Opportunity, StrategyKind};

use crate::context::{GraphEdge, Observation, RelayFeeFloor, SignerRef, StrategyConfig, TickSnapshot};
use crate::strategy::{BuildContext, Strategy, StrategyError};

fn multiplier_ladder() -> Vec<(u64, u64)> {
    // (numerator, denominator) pairs for 0.5, 1.0, 1.5, 2.0
    vec![(1, 2), (1, 1), (3, 2), (2, 1)]
}

/// Finds the pool edge whose `token_in` matches the victim's routed token, used to
/// price-impact-sweep candidate principals against the same pool the victim is hitting.
fn find_edge<'a>(edges: &'a [GraphEdge], token: ethers::types::Address) -> Option<&'a GraphEdge> {
    edges.iter().find(|e| e.token_in == token)
}

pub struct FrontRunStrategy;

#[async_trait]
impl Strategy for FrontRunStrategy {
    fn id(&self) -> &'static str {
        "front_run"
    }

    fn analyze(&self, tick: &TickSnapshot, observation: &Observation, cfg: &StrategyConfig) -> Option<Opportunity> {
        let Observation::PendingVictim(victim) = observation else { return None };
        if victim.value <= cfg.min_target_value {
            return None;
        }
        let token = victim.routed_token?;
        let edge = find_edge(&tick.edges, token)?;

        let depth = ambush_types::PoolState {
            pool: edge.pool,
            reserve0: edge.reserve_in,
            reserve1: edge.reserve_out,
            fee_bps: edge.fee_bps,
            last_change_block: tick.block_number,
        }
        .depth();
        if depth.is_zero() {
            return None;
        }

        let principals: Vec<U256> = multiplier_ladder()
            .iter()
            .map(|&(n, d)| victim.value.saturating_mul(U256::from(n)) / U256::from(d))
            .collect();

        let impacts = price_impact_sweep(edge.reserve_in, edge.reserve_out, edge.fee_bps, &principals).ok()?;

        let gas_cost = cfg.gas_units_per_hop.saturating_mul(tick.gas_price);
        let mut best: Option<(U256, u32, U256)> = None;
        for (&principal, &impact_ppm) in principals.iter().zip(impacts.iter()) {
            // Gross captured against the victim's own price impact, the same
            // share-of-depth approximation the sandwich kernel uses: the front
            // position rides the victim's price move proportional to its size
            // relative to pool depth.
            let expected_gross = principal.saturating_mul(victim.value) / depth;
            if expected_gross <= gas_cost {
                continue;
            }
            match best {
                Some((_, best_impact, _)) if best_impact <= impact_ppm => {}
                _ => best = Some((principal, impact_ppm, expected_gross)),
            }
        }

        let (principal, _, expected_gross) = best?;

        Some(Opportunity {
            strategy: StrategyKind::FrontRun,
            path: vec![edge.pool],
            principal,
            currency: token,
            expected_gross,
            expected_gas_cost: gas_cost,
            success_probability_ppm: 700_000,
            requires_loan: false,
            observed_at_block: tick.block_number,
            victim_hash: Some(victim.hash),
        })
    }

    async fn build(
        &self,
        opportunity: &Opportunity,
        _signer: SignerRef,
        relay_fee_floor: RelayFeeFloor,
        ctx: &BuildContext<'_>,
    ) -> Result<Option<ambush_types::Bundle>, StrategyError> {
        let Some(&pool) = opportunity.path.first() else { return Ok(None) };
        let leg = TxLeg {
            to: pool,
            data: Bytes::default(),
            value: U256::zero(),
            gas_limit: opportunity.expected_gas_cost.max(U256::from(21_000u64)),
            max_fee_hint: relay_fee_floor,
            profit: opportunity.expected_net(),
            victim_hash: None,
        };

        Builder::new()
            .build(
                ShapeKind::FrontRun,
                vec![leg],
                ctx.base_fee,
                opportunity.expected_gross,
                ctx.target_block,
                ctx.starting_nonce,
                ctx.relay,
                ctx.signer,
            )
            .await
            .map_err(StrategyError::from)
    }
}
