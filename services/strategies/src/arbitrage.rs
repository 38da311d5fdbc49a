//! Arbitrage strategy (spec.md §4.5): enumerate simple cycles in the pool connectivity
//! graph up to `max_cycle_length`, run C3's profit sweep over the amount ladder
//! {0.1, 1, 2, 5} native units for each, and take the maximum across cycles.

use async_trait::async_trait;
use ethers::types::{Address, Bytes, U256};

use ambush_amm::{best_of_profit_sweep, profit_per_amount_sweep, PathHop, V2PoolState};
use ambush_bundle_builder::{BundleBuilder as Builder, ShapeKind, TxLeg};
use ambush_types::{Opportunity, StrategyKind};

use crate::context::{GraphEdge, Observation, RelayFeeFloor, SignerRef, StrategyConfig, TickSnapshot};
use crate::strategy::{BuildContext, Strategy, StrategyError};

const ONE_NATIVE_UNIT: u64 = 1_000_000_000_000_000_000;

fn amount_ladder() -> Vec<U256> {
    vec![
        U256::from(ONE_NATIVE_UNIT) / U256::from(10u8),
        U256::from(ONE_NATIVE_UNIT),
        U256::from(ONE_NATIVE_UNIT) * U256::from(2u8),
        U256::from(ONE_NATIVE_UNIT) * U256::from(5u8),
    ]
}

/// Enumerates simple cycles (no repeated pool) starting and ending at each distinct
/// token seen in `edges`, up to `max_len` hops, via depth-first search.
fn enumerate_cycles(edges: &[GraphEdge], max_len: usize) -> Vec<Vec<GraphEdge>> {
    let mut cycles = Vec::new();
    let tokens: Vec<Address> = {
        let mut seen = Vec::new();
        for e in edges {
            if !seen.contains(&e.token_in) {
                seen.push(e.token_in);
            }
        }
        seen
    };

    for &start in &tokens {
        let mut path: Vec<GraphEdge> = Vec::new();
        dfs(start, start, edges, max_len, &mut path, &mut cycles);
    }
    cycles
}

fn dfs(
    start: Address,
    current: Address,
    edges: &[GraphEdge],
    max_len: usize,
    path: &mut Vec<GraphEdge>,
    out: &mut Vec<Vec<GraphEdge>>,
) {
    if path.len() == max_len {
        return;
    }
    for edge in edges.iter().filter(|e| e.token_in == current) {
        if path.iter().any(|p| p.pool == edge.pool) {
            continue;
        }
        path.push(*edge);
        if edge.token_out == start && path.len() >= 2 {
            out.push(path.clone());
        } else {
            dfs(start, edge.token_out, edges, max_len, path, out);
        }
        path.pop();
    }
}

pub struct ArbitrageStrategy;

#[async_trait]
impl Strategy for ArbitrageStrategy {
    fn id(&self) -> &'static str {
        "arbitrage"
    }

    fn analyze(&self, tick: &TickSnapshot, observation: &Observation, cfg: &StrategyConfig) -> Option<Opportunity> {
        if !matches!(observation, Observation::Probe) {
            return None;
        }

        let cycles = enumerate_cycles(&tick.edges, cfg.max_cycle_length);
        if cycles.is_empty() {
            return None;
        }

        let ladder = amount_ladder();
        let mut best: Option<(Opportunity, ethers::types::I256)> = None;

        for cycle in &cycles {
            let hops: Vec<PathHop> = cycle
                .iter()
                .map(|e| PathHop {
                    pool: V2PoolState { reserve_in: e.reserve_in, reserve_out: e.reserve_out, fee_bps: e.fee_bps },
                })
                .collect();
            let gas_cost = cfg.gas_units_per_hop.saturating_mul(U256::from(hops.len() as u64)).saturating_mul(tick.gas_price);

            let profits = match profit_per_amount_sweep(&hops, gas_cost, &ladder) {
                Ok(p) => p,
                Err(_) => continue,
            };
            let Some((principal, profit)) = best_of_profit_sweep(&ladder, &profits) else { continue };
            if profit <= ethers::types::I256::zero() {
                continue;
            }

            let opportunity = Opportunity {
                strategy: StrategyKind::Arbitrage,
                path: cycle.iter().map(|e| e.pool).collect(),
                principal,
                currency: cycle[0].token_in,
                expected_gross: (profit + ethers::types::I256::try_from(principal).unwrap_or(ethers::types::I256::MAX))
                    .try_into()
                    .unwrap_or(U256::zero()),
                expected_gas_cost: gas_cost,
                success_probability_ppm: 900_000,
                requires_loan: false,
                observed_at_block: tick.block_number,
                victim_hash: None,
            };

            match &best {
                Some((_, best_profit)) if *best_profit >= profit => {}
                _ => best = Some((opportunity, profit)),
            }
        }

        best.map(|(opp, _)| opp)
    }

    async fn build(
        &self,
        opportunity: &Opportunity,
        _signer: SignerRef,
        relay_fee_floor: RelayFeeFloor,
        ctx: &BuildContext<'_>,
    ) -> Result<Option<ambush_types::Bundle>, StrategyError> {
        if opportunity.path.is_empty() {
            return Ok(None);
        }

        // Opportunity carries only the cycle's net result, not a per-hop breakdown;
        // split it by a descending triangular weight so the ordering step (profit-per-gas
        // descending) has something meaningful to sort, with the largest share on the
        // first hop where execution risk is lowest.
        let hop_count = opportunity.path.len() as i64;
        let net = opportunity.expected_net();
        let weight_sum: i64 = (1..=hop_count).sum();
        let gas_per_hop = opportunity.expected_gas_cost / U256::from(hop_count as u64);

        let legs: Vec<TxLeg> = opportunity
            .path
            .iter()
            .enumerate()
            .map(|(i, &pool)| {
                let weight = hop_count - i as i64;
                let profit = net * ethers::types::I256::from(weight) / ethers::types::I256::from(weight_sum);
                TxLeg {
                    to: pool,
                    data: Bytes::default(),
                    value: U256::zero(),
                    gas_limit: gas_per_hop,
                    max_fee_hint: relay_fee_floor,
                    profit,
                    victim_hash: None,
                }
            })
            .collect();

        let builder = Builder::new();
        builder
            .build(
                ShapeKind::Arbitrage,
                legs,
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
