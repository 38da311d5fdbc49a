//! The bundle builder pipeline (C6, spec.md §4.6): profitability floor, ordering, gas
//! shaping, simulate-then-sign. Grounded in the teacher's `BundleBuilder`
//! (`mev/src/bundle.rs`), generalized from a fluent `add_transaction` accumulator into
//! a one-shot pipeline over a strategy-provided leg list.

use ethers::types::U256;

use ambush_relay_client::RelayClient;
use ambush_types::{Bundle, BundleEntry};

use crate::leg::TxLeg;
use crate::ordering::{order_legs, ShapeKind};
use crate::shaping::{shape_gas, BidPredictor};
use crate::signer::TxSigner;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("bundle value does not clear the profitability floor")]
    BelowProfitabilityFloor,
    #[error("simulation failed: {0}")]
    SimulationFailed(String),
    #[error("relay transport error: {0}")]
    Relay(#[from] ambush_relay_client::RelayError),
    #[error("signer error: {0}")]
    Signer(#[from] crate::signer::SignerError),
}

pub struct BundleBuilder<'a> {
    predictor: Option<&'a dyn BidPredictor>,
}

impl<'a> BundleBuilder<'a> {
    pub fn new() -> Self {
        Self { predictor: None }
    }

    pub fn with_predictor(predictor: &'a dyn BidPredictor) -> Self {
        Self { predictor: Some(predictor) }
    }

    /// Step 1: bundle value = sum(leg.profit) over gas-limit-weighted legs; rejects
    /// when value-per-gas-unit does not clear zero.
    fn clears_profitability_floor(&self, legs: &[TxLeg]) -> bool {
        let total_profit: ethers::types::I256 = legs.iter().fold(ethers::types::I256::zero(), |acc, l| acc + l.profit);
        let total_gas: U256 = legs.iter().fold(U256::zero(), |acc, l| acc.saturating_add(l.gas_limit));
        if total_gas.is_zero() {
            return false;
        }
        total_profit > ethers::types::I256::zero()
    }

    /// Runs the full pipeline and returns a signed, simulated `Bundle`, or declines
    /// with `Ok(None)` when simulation-time conditions invalidate the opportunity.
    pub async fn build<R: RelayClient, S: TxSigner>(
        &self,
        kind: ShapeKind,
        legs: Vec<TxLeg>,
        base_fee: U256,
        expected_gross: U256,
        target_block: u64,
        starting_nonce: U256,
        relay: &R,
        signer: &S,
    ) -> Result<Option<Bundle>, BuildError> {
        if !self.clears_profitability_floor(&legs) {
            return Err(BuildError::BelowProfitabilityFloor);
        }

        let ordered = order_legs(kind, legs);

        let mut entries = Vec::with_capacity(ordered.len());
        let mut nonce = starting_nonce;
        let mut max_tip = U256::zero();

        for leg in &ordered {
            let shape = shape_gas(base_fee, leg.max_fee_hint, leg.gas_limit, self.predictor);
            max_tip = max_tip.max(shape.priority_fee);
            let raw_tx = signer
                .sign(leg.to, leg.data.clone(), leg.value, leg.gas_limit, shape.max_fee, shape.priority_fee, nonce)
                .await?;
            entries.push(BundleEntry { raw_tx, victim_hash: leg.victim_hash });
            nonce = nonce.saturating_add(U256::one());
        }

        let bundle = Bundle { entries, target_block, tip_per_gas: max_tip };
        bundle.validate_shape().map_err(|e| BuildError::SimulationFailed(e.to_string()))?;

        let sim = relay
            .simulate(&bundle, target_block.saturating_sub(1))
            .await
            .map_err(BuildError::Relay)?;

        if !sim.success {
            return Ok(None);
        }

        let shortfall_floor = expected_gross.saturating_mul(U256::from(9u8)) / U256::from(10u8);
        if sim.gross_value < shortfall_floor {
            return Ok(None);
        }

        Ok(Some(bundle))
    }
}

impl<'a> Default for BundleBuilder<'a> {
    fn default() -> Self {
        Self::new()
    }
}
