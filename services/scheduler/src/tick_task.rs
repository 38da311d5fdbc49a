//! Turns raw block ticks from the chain observer into a `TickSnapshot` every strategy
//! task reads, and forwards the tick itself to the core actor for pending-tx eviction
//! and bundle pruning (spec.md §4.9). Also the source of the periodic `Observation::Probe`
//! the arbitrage strategy scans on.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, watch};
use tracing::debug;

use ambush_chain_observer::{BlockTick, ChainClient};
use ambush_strategies::{Observation, TickSnapshot};

use crate::messages::CoreMessage;
use crate::pool_graph::PoolGraph;

pub async fn run(
    mut ticks: mpsc::Receiver<BlockTick>,
    client: Arc<dyn ChainClient>,
    pool_graph: PoolGraph,
    snapshot_tx: watch::Sender<Option<TickSnapshot>>,
    observations_tx: broadcast::Sender<Observation>,
    core_tx: mpsc::Sender<CoreMessage>,
) {
    while let Some(tick) = ticks.recv().await {
        let edges = pool_graph.refresh(&client).await;
        let snapshot = TickSnapshot {
            block_number: tick.number,
            gas_price: tick.base_fee,
            edges,
            observed_at: tick.timestamp,
        };
        debug!(block = tick.number, edges = snapshot.edges.len(), "tick snapshot refreshed");

        if snapshot_tx.send(Some(snapshot)).is_err() {
            return;
        }
        if core_tx.send(CoreMessage::Tick(tick)).await.is_err() {
            return;
        }
        // No strategy waits on a probe reaching them; a quiet channel (no live
        // strategy tasks yet) is not an error.
        let _ = observations_tx.send(Observation::Probe);
    }
}
