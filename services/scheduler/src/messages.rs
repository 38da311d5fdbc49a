//! Owned messages handed to the scheduler's core actor (spec.md §9 REDESIGN FLAGS:
//! "break cyclic component references with an explicit message bus"). Every task this
//! crate spawns only ever talks to the core actor through one of these variants —
//! never by reaching into another task's state.

use ambush_chain_observer::BlockTick;
use ambush_metrics::health::{NetworkSample, ResourceSample};
use ambush_types::{Bundle, PendingTx};
use ethers::types::{I256, U256};

/// A strategy task's request to submit a simulated, signed bundle. The core actor
/// gates this through the supervisor (C8) before ever calling the relay.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub strategy_id: &'static str,
    pub bundle: Bundle,
    pub candidate_value: U256,
    pub candidate_gas_price: U256,
    pub candidate_gas_cost: U256,
    pub candidate_to: Option<ethers::types::Address>,
    pub expected_profit: I256,
}

pub enum CoreMessage {
    Tick(BlockTick),
    PendingTx(PendingTx),
    Submit(SubmitRequest),
    Health { resource: ResourceSample, network: NetworkSample },
    PollStatuses,
    DailyReset,
}
