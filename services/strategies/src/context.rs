//! Per-strategy configuration and the observation feed the scheduler (C9) delivers.
//! Grounded in the teacher's `SearchStrategy` context, generalized from a single
//! strategy's tunables into one struct shared by all five (spec.md §4.5).

use chrono::{DateTime, Utc};
use ethers::types::{Address, H256, U256};

use ambush_types::PendingTx;

/// Tunables shared across the strategy set, read once from `AmbushConfig` at startup
/// (not all fields apply to every strategy; each strategy reads only what it needs).
#[derive(Debug, Clone)]
pub struct StrategyConfig {
    pub cooldown: chrono::Duration,
    pub warm_up_ticks: u64,
    pub min_target_value: U256,
    pub max_cycle_length: usize,
    pub gas_units_per_hop: U256,
    pub new_pool_factory_whitelist: Vec<Address>,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            cooldown: chrono::Duration::seconds(1),
            warm_up_ticks: 10,
            min_target_value: U256::from(10u64).pow(U256::from(18u64)), // 1 native unit
            max_cycle_length: 3,
            gas_units_per_hop: U256::from(120_000u64),
            new_pool_factory_whitelist: Vec::new(),
        }
    }
}

/// What the scheduler delivers to `Strategy::analyze` for a given tick. Front-run,
/// sandwich, and JIT strategies key off a pending victim transaction; the sniper off a
/// pool-creation event; arbitrage off nothing but the current snapshots (a periodic probe).
#[derive(Debug, Clone)]
pub enum Observation {
    Probe,
    PendingVictim(PendingTx),
    PoolCreated { pool: Address, factory: Address, token0: Address, token1: Address },
}

/// One pool edge in the arbitrage connectivity graph, keyed by the two tokens it
/// connects. `reserve_in`/`reserve_out` are oriented token0 -> token1.
#[derive(Debug, Clone, Copy)]
pub struct GraphEdge {
    pub pool: Address,
    pub token_in: Address,
    pub token_out: Address,
    pub reserve_in: U256,
    pub reserve_out: U256,
    pub fee_bps: u32,
}

/// The current tick number and the snapshots a strategy may read. Kept narrow and
/// owned so `analyze` can be a pure function of its arguments, per spec.md §4.5's
/// "reproducible from the same (tick, observation, snapshots)" requirement.
#[derive(Debug, Clone)]
pub struct TickSnapshot {
    pub block_number: u64,
    pub gas_price: U256,
    pub edges: Vec<GraphEdge>,
    /// Wall-clock time the tick was observed at — folded into the snapshot so
    /// staleness checks (e.g. the flash-loan planner's) stay a pure function of
    /// `(tick, observation)` rather than an internal clock read.
    pub observed_at: DateTime<Utc>,
}

impl TickSnapshot {
    pub fn edges_from(&self, token: Address) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(move |e| e.token_in == token)
    }
}

/// Signer identity threaded opaquely through `build` — the strategy set never handles
/// key material directly, only a reference it hands to C6 for encoding.
#[derive(Debug, Clone, Copy)]
pub struct SignerRef {
    pub address: Address,
}

/// A lower bound on the bid the relay will accept, below which `build` must decline
/// rather than hand C6 a bundle that cannot clear the relay's floor.
pub type RelayFeeFloor = U256;

/// Distinguishes "no chain-level reference" from a strategy referencing a specific
/// pending transaction it raced.
pub type VictimRef = Option<H256>;

pub fn now() -> DateTime<Utc> {
    Utc::now()
}
