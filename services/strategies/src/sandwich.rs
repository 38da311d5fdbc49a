//! Sandwich strategy (spec.md §4.5): uses C3's sandwich optimum; back-amount =
//! front-amount x 1.02 (the configured `sandwich_back_multiplier_bps`); shape is
//! [front, victim-ref, back].

use async_trait::async_trait;
use ethers::types::{Bytes, U256};

use ambush_amm::sandwich_optimum;
use ambush_bundle_builder::{BundleBuilder as Builder, ShapeKind, TxLeg};
use ambush_types::{Opportunity, StrategyKind};

use crate::context::{GraphEdge, Observation, RelayFeeFloor, SignerRef, StrategyConfig, TickSnapshot};
use crate::strategy::{BuildContext, Strategy, StrategyError};

fn find_edge<'a>(edges: &'a [GraphEdge], token: ethers::types::Address) -> Option<&'a GraphEdge> {
    edges.iter().find(|e| e.token_in == token)
}

pub struct SandwichStrategy {
    pub back_multiplier_bps: u32,
}

impl SandwichStrategy {
    pub fn new(back_multiplier_bps: u32) -> Self {
        Self { back_multiplier_bps }
    }
}

#[async_trait]
impl Strategy for SandwichStrategy {
    fn id(&self) -> &'static str {
        "sandwich"
    }

    fn analyze(&self, tick: &TickSnapshot, observation: &Observation, cfg: &StrategyConfig) -> Option<Opportunity> {
        let Observation::PendingVictim(victim) = observation else { return None };
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

        let (front_amount, expected_gross) =
            sandwich_optimum(victim.value, depth, tick.gas_price, cfg.gas_units_per_hop).ok()?;
        if front_amount.is_zero() {
            return None;
        }

        Some(Opportunity {
            strategy: StrategyKind::Sandwich,
            path: vec![edge.pool],
            principal: front_amount,
            currency: token,
            expected_gross,
            expected_gas_cost: cfg.gas_units_per_hop.saturating_mul(U256::from(2u8)).saturating_mul(tick.gas_price),
            success_probability_ppm: 600_000,
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

        let back_amount = opportunity
            .principal
            .saturating_mul(U256::from(self.back_multiplier_bps))
            / U256::from(10_000u32);

        let front = TxLeg {
            to: pool,
            data: Bytes::default(),
            value: U256::zero(),
            gas_limit: opportunity.expected_gas_cost / U256::from(2u8),
            max_fee_hint: relay_fee_floor,
            profit: opportunity.expected_net(),
            victim_hash: None,
        };
        let victim = TxLeg {
            to: pool,
            data: Bytes::default(),
            value: U256::zero(),
            gas_limit: U256::zero(),
            max_fee_hint: U256::zero(),
            profit: ethers::types::I256::zero(),
            victim_hash: opportunity.victim_hash,
        };
        let back = TxLeg {
            to: pool,
            data: Bytes::default(),
            value: back_amount,
            gas_limit: opportunity.expected_gas_cost / U256::from(2u8),
            max_fee_hint: relay_fee_floor,
            profit: ethers::types::I256::zero(),
            victim_hash: None,
        };

        Builder::new()
            .build(
                ShapeKind::SandwichOrJit,
                vec![front, victim, back],
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
