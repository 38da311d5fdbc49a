//! New-pool sniper (spec.md §4.5): triggered by a pool-creation event whose factory is
//! whitelisted; principal by slippage sweep at {1%, 5%, 10%, 20%} of initial liquidity;
//! declines if the token fails a code-presence check.

use std::sync::Arc;

use async_trait::async_trait;
use ethers::types::{Address, Bytes, U256};

use ambush_amm::price_impact_sweep;
use ambush_bundle_builder::{BundleBuilder as Builder, ShapeKind, TxLeg};
use ambush_types::{Opportunity, StrategyKind};

use crate::context::{Observation, RelayFeeFloor, SignerRef, StrategyConfig, TickSnapshot};
use crate::strategy::{BuildContext, Strategy, StrategyError};

fn slippage_ladder() -> Vec<(u64, u64)> {
    vec![(1, 100), (5, 100), (10, 100), (20, 100)]
}

/// Checks the token has deployed contract code — declines on an EOA or not-yet-mined
/// token address, the signal the teacher's own adapters use to skip non-contract hits.
#[async_trait]
pub trait CodePresenceCheck: Send + Sync {
    async fn has_code(&self, token: Address) -> bool;
}

/// Holds the code-presence check behind an `Arc` (rather than a borrow) so the
/// strategy can be registered as a `'static` trait object in the scheduler's
/// per-strategy task fleet (spec.md §4.9).
pub struct NewPoolSniperStrategy {
    code_check: Arc<dyn CodePresenceCheck>,
}

impl NewPoolSniperStrategy {
    pub fn new(code_check: Arc<dyn CodePresenceCheck>) -> Self {
        Self { code_check }
    }
}

#[async_trait]
impl Strategy for NewPoolSniperStrategy {
    fn id(&self) -> &'static str {
        "new_pool_sniper"
    }

    fn analyze(&self, tick: &TickSnapshot, observation: &Observation, cfg: &StrategyConfig) -> Option<Opportunity> {
        let Observation::PoolCreated { pool, factory, token0, .. } = observation else { return None };
        if !cfg.new_pool_factory_whitelist.contains(factory) {
            return None;
        }

        // Initial liquidity isn't known until the creation event carries it; until the
        // sniper observes a first reserve snapshot for this pool it has nothing to size
        // against, so it declines rather than guessing.
        let edge = tick.edges.iter().find(|e| e.pool == *pool)?;
        let initial_liquidity = edge.reserve_in.min(edge.reserve_out);

        let principals: Vec<U256> = slippage_ladder()
            .iter()
            .map(|&(n, d)| initial_liquidity.saturating_mul(U256::from(n)) / U256::from(d))
            .collect();
        let impacts = price_impact_sweep(edge.reserve_in, edge.reserve_out, edge.fee_bps, &principals).ok()?;

        let (principal, _) = principals
            .iter()
            .zip(impacts.iter())
            .min_by_key(|(_, &impact)| impact)
            .map(|(&p, &i)| (p, i))?;

        let gas_cost = cfg.gas_units_per_hop.saturating_mul(tick.gas_price);
        let output = ambush_amm::V2Math::calculate_output_amount(principal, edge.reserve_in, edge.reserve_out, edge.fee_bps).ok()?;
        if output <= principal.saturating_add(gas_cost) {
            return None;
        }

        Some(Opportunity {
            strategy: StrategyKind::NewPoolSniper,
            path: vec![*pool],
            principal,
            currency: *token0,
            expected_gross: output,
            expected_gas_cost: gas_cost,
            success_probability_ppm: 400_000,
            requires_loan: false,
            observed_at_block: tick.block_number,
            victim_hash: None,
        })
    }

    async fn build(
        &self,
        opportunity: &Opportunity,
        _signer: SignerRef,
        relay_fee_floor: RelayFeeFloor,
        ctx: &BuildContext<'_>,
    ) -> Result<Option<ambush_types::Bundle>, StrategyError> {
        if !self.code_check.has_code(opportunity.currency).await {
            return Ok(None);
        }
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

/// Deterministic test double: tokens in the allow-set have code, everything else does not.
#[derive(Default)]
pub struct MockCodePresenceCheck {
    pub present: std::collections::HashSet<Address>,
}

#[async_trait]
impl CodePresenceCheck for MockCodePresenceCheck {
    async fn has_code(&self, token: Address) -> bool {
        self.present.contains(&token)
    }
}
