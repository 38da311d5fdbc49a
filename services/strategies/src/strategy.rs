//! The strategy contract (spec.md §4.5), generalized from the teacher's
//! `SearchStrategy` trait (`mev/src/searcher.rs`) from three hardcoded variants to a
//! trait object five concrete strategies implement identically.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ethers::types::U256;

use ambush_bundle_builder::{BuildError, TxSigner};
use ambush_relay_client::RelayClient;
use ambush_types::{Bundle, BundleShapeError, Opportunity};

use crate::context::{Observation, RelayFeeFloor, SignerRef, StrategyConfig, TickSnapshot};

#[derive(Debug, thiserror::Error)]
pub enum StrategyError {
    #[error("bundle shape invalid: {0}")]
    BundleShape(#[from] BundleShapeError),
    #[error("bundle build failed: {0}")]
    Build(#[from] BuildError),
    #[error("simulation-time conditions changed since analyze")]
    StaleAtBuild,
}

/// Everything `build` needs to reach C6/C7 without the strategy trait itself carrying
/// generic type parameters (which would make `Strategy` no longer object-safe).
pub struct BuildContext<'a> {
    pub relay: &'a dyn RelayClient,
    pub signer: &'a dyn TxSigner,
    pub base_fee: U256,
    pub target_block: u64,
    pub starting_nonce: U256,
}

/// Implemented by each of the five strategy families. `analyze` must be a pure
/// function of its arguments — no RPC calls, no clocks read internally — so that
/// identical (tick, observation, snapshots) always yield an identical decision.
/// `build` may call out to C6/C7 and so is async, but still declines rather than
/// erroring when simulation-time conditions invalidate the opportunity.
#[async_trait]
pub trait Strategy: Send + Sync {
    /// Stable identifier, matched against `AmbushConfig::strategies` to decide whether
    /// this strategy is enabled.
    fn id(&self) -> &'static str;

    /// Enforces per-strategy cooldown and warm-up. `last_exec` is `None` before the
    /// first execution, which always satisfies the warm-up gate (there is nothing to
    /// wait out) but still respects `cfg.warm_up_ticks` against `current_tick`.
    fn is_ready(
        &self,
        now: DateTime<Utc>,
        last_exec: Option<DateTime<Utc>>,
        current_tick: u64,
        cfg: &StrategyConfig,
    ) -> bool {
        let warmed_up = current_tick >= cfg.warm_up_ticks;
        let cooled_down = last_exec.map_or(true, |t| now - t >= cfg.cooldown);
        warmed_up && cooled_down
    }

    /// Scans the observation against the tick's snapshots and proposes an opportunity,
    /// or declines with `None` if nothing profitable is found.
    fn analyze(&self, tick: &TickSnapshot, observation: &Observation, cfg: &StrategyConfig) -> Option<Opportunity>;

    /// Asks the bundle builder (C6) to shape `opportunity` into a submittable bundle.
    /// May decline (return `Ok(None)`) if simulation-time conditions invalidate the
    /// opportunity found at analyze time; only returns `Err` on an operational failure.
    async fn build(
        &self,
        opportunity: &Opportunity,
        signer: SignerRef,
        relay_fee_floor: RelayFeeFloor,
        ctx: &BuildContext<'_>,
    ) -> Result<Option<Bundle>, StrategyError>;
}
