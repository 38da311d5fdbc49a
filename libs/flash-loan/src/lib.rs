//! Flash-loan planner (C5): holds copy-on-write provider snapshots and answers
//! `select(token, amount) -> venue | none` total-ly (spec.md §4.4 — `select` never
//! raises; callers treat `none` as "cannot finance").

use ambush_config::FlashloanVenueConfig;
use ambush_types::{ProviderSnapshot, TokenId, VenueId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ethers::types::{Address, U256};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum LiquidityError {
    #[error("venue unreachable: {0}")]
    Unreachable(String),
}

/// The external collaborator spec.md §1 carves out: "flash-loan venue adapters are
/// described only by the provider-selection contract". Production wiring backs this
/// with per-venue on-chain liquidity reads; `MockLiquiditySource` is the test double.
#[async_trait]
pub trait LiquiditySource: Send + Sync {
    async fn fetch_liquidity(&self, venue: VenueId, token: TokenId) -> Result<U256, LiquidityError>;
}

#[derive(Clone)]
struct SnapshotEntry {
    snapshot: ProviderSnapshot,
    refreshed_at: DateTime<Utc>,
    stale: bool,
}

pub struct FlashLoanPlanner {
    policy_bps: HashMap<VenueId, u32>,
    venue_addresses: HashMap<VenueId, Address>,
    snapshots: RwLock<Arc<HashMap<VenueId, SnapshotEntry>>>,
    stale_after: chrono::Duration,
}

fn parse_venue(name: &str) -> Option<VenueId> {
    match name.to_ascii_lowercase().as_str() {
        "aave" => Some(VenueId::Aave),
        "dydx" => Some(VenueId::DyDx),
        "balancer" => Some(VenueId::Balancer),
        "uniswap_v3" | "uniswap" => Some(VenueId::UniswapV3),
        _ => None,
    }
}

impl FlashLoanPlanner {
    pub fn new(venues: &[FlashloanVenueConfig], stale_after_secs: i64) -> Self {
        let mut policy_bps = HashMap::new();
        let mut venue_addresses = HashMap::new();
        for v in venues {
            if let Some(id) = parse_venue(&v.venue) {
                policy_bps.insert(id, v.policy_bps);
                venue_addresses.insert(id, v.address);
            } else {
                tracing::warn!(venue = %v.venue, "unrecognized flash-loan venue in config, skipping");
            }
        }
        Self {
            policy_bps,
            venue_addresses,
            snapshots: RwLock::new(Arc::new(HashMap::new())),
            stale_after: chrono::Duration::seconds(stale_after_secs),
        }
    }

    /// Refreshes every configured venue's liquidity for `token` at `current_block`.
    /// Per spec.md §4.4: refresh failures do not invalidate the last-known snapshot,
    /// they mark it stale. The new map is built off to the side, then the whole `Arc`
    /// is swapped in one write — readers never observe a partially-refreshed map, and
    /// never block behind the writer for longer than that single swap (spec.md §5).
    pub async fn refresh(
        &self,
        source: &dyn LiquiditySource,
        token: TokenId,
        current_block: u64,
        now: DateTime<Utc>,
    ) {
        let previous = self.snapshots.read().clone();
        let mut next: HashMap<VenueId, SnapshotEntry> = HashMap::new();

        for (&venue, &policy) in &self.policy_bps {
            let address = self.venue_addresses[&venue];
            match source.fetch_liquidity(venue, token).await {
                Ok(liquidity) => {
                    let snapshot = ProviderSnapshot::new(venue, address, liquidity, policy, current_block);
                    next.insert(venue, SnapshotEntry { snapshot, refreshed_at: now, stale: false });
                }
                Err(err) => {
                    tracing::warn!(venue = ?venue, error = %err, "flash-loan liquidity refresh failed, marking stale");
                    if let Some(prior) = previous.get(&venue) {
                        next.insert(venue, SnapshotEntry { stale: true, ..prior.clone() });
                    }
                }
            }
        }

        *self.snapshots.write() = Arc::new(next);
    }

    /// Minimum-cost venue with sufficient liquidity for `amount`, ties broken by lower
    /// fee fraction then alphabetic venue id (spec.md §4.4). Total: never panics or
    /// errors, `None` means "cannot finance".
    pub fn select(&self, amount: U256, estimated_gas_cost: U256, now: DateTime<Utc>) -> Option<VenueId> {
        let snapshots = self.snapshots.read().clone();

        snapshots
            .values()
            .filter(|entry| !Self::is_stale(entry, now, self.stale_after))
            .filter(|entry| entry.snapshot.can_loan(amount))
            .map(|entry| {
                let fee_cost = amount.saturating_mul(U256::from(entry.snapshot.fee_bps)) / U256::from(10_000u32);
                let total_cost = fee_cost.saturating_add(estimated_gas_cost);
                (entry.snapshot.venue, total_cost, entry.snapshot.fee_bps)
            })
            .min_by(|(venue_a, cost_a, fee_a), (venue_b, cost_b, fee_b)| {
                cost_a
                    .cmp(cost_b)
                    .then_with(|| fee_a.cmp(fee_b))
                    .then_with(|| venue_a.tie_break_key().cmp(venue_b.tie_break_key()))
            })
            .map(|(venue, _, _)| venue)
    }

    fn is_stale(entry: &SnapshotEntry, now: DateTime<Utc>, bound: chrono::Duration) -> bool {
        entry.stale || now.signed_duration_since(entry.refreshed_at) > bound
    }
}

/// Deterministic in-memory stand-in for `LiquiditySource`.
#[derive(Default)]
pub struct MockLiquiditySource {
    liquidity: RwLock<HashMap<VenueId, U256>>,
    fail: RwLock<std::collections::HashSet<VenueId>>,
}

impl MockLiquiditySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_liquidity(&self, venue: VenueId, amount: U256) {
        self.liquidity.write().insert(venue, amount);
    }

    pub fn set_failing(&self, venue: VenueId, failing: bool) {
        if failing {
            self.fail.write().insert(venue);
        } else {
            self.fail.write().remove(&venue);
        }
    }
}

#[async_trait]
impl LiquiditySource for MockLiquiditySource {
    async fn fetch_liquidity(&self, venue: VenueId, _token: TokenId) -> Result<U256, LiquidityError> {
        if self.fail.read().contains(&venue) {
            return Err(LiquidityError::Unreachable(format!("{venue:?}")));
        }
        Ok(self.liquidity.read().get(&venue).copied().unwrap_or_default())
    }
}
