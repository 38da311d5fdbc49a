//! Tracks the pool-reserve snapshots the arbitrage connectivity graph is built from
//! (spec.md §6 `dexes`). Refreshed once per tick via `ChainClient::fetch_pool_state`;
//! the result feeds `TickSnapshot::edges` for every strategy's `analyze` call.

use std::sync::Arc;

use ambush_chain_observer::{ChainClient, ChainError};
use ambush_config::DexConfig;
use ambush_strategies::GraphEdge;
use ethers::types::Address;

#[derive(Debug, Clone, Copy)]
struct TrackedPool {
    pool: Address,
    token0: Address,
    token1: Address,
    fee_bps: u32,
}

/// Owns the set of pools the operator configured for arbitrage scanning and the most
/// recently observed reserves for each. Lives on the scheduler's core actor; never
/// shared mutably across tasks (spec.md §5).
#[derive(Clone)]
pub struct PoolGraph {
    tracked: Vec<TrackedPool>,
}

impl PoolGraph {
    pub fn from_config(dexes: &[DexConfig]) -> Self {
        Self {
            tracked: dexes
                .iter()
                .map(|d| TrackedPool { pool: d.pool_address, token0: d.token0, token1: d.token1, fee_bps: d.fee_bps })
                .collect(),
        }
    }

    /// Re-fetches every tracked pool's reserves and returns both directed edges for
    /// each (token0->token1 and token1->token0), the orientation arbitrage cycle
    /// enumeration needs. A pool whose fetch fails is simply omitted this tick — a
    /// transient RPC failure here degrades coverage, it never stalls the pipeline
    /// (spec.md §4.1's "never crashes the pipeline" failure semantics apply equally
    /// to on-demand pool-reserve queries).
    pub async fn refresh(&self, client: &Arc<dyn ChainClient>) -> Vec<GraphEdge> {
        let mut edges = Vec::with_capacity(self.tracked.len() * 2);
        for tracked in &self.tracked {
            match client.fetch_pool_state(tracked.pool).await {
                Ok(state) => {
                    edges.push(GraphEdge {
                        pool: tracked.pool,
                        token_in: tracked.token0,
                        token_out: tracked.token1,
                        reserve_in: state.reserve0,
                        reserve_out: state.reserve1,
                        fee_bps: tracked.fee_bps,
                    });
                    edges.push(GraphEdge {
                        pool: tracked.pool,
                        token_in: tracked.token1,
                        token_out: tracked.token0,
                        reserve_in: state.reserve1,
                        reserve_out: state.reserve0,
                        fee_bps: tracked.fee_bps,
                    });
                }
                Err(ChainError::UnknownPool(_)) | Err(_) => continue,
            }
        }
        edges
    }

    pub fn tracked_pool_count(&self) -> usize {
        self.tracked.len()
    }

    /// Resolves the pre-configured pool address for a newly-observed token, used by the
    /// ingest task to turn a factory-call pending tx into a `PoolCreated` observation.
    /// Full ABI decoding of the factory's calldata is the chain client's concern (spec.md
    /// §1); this only matches against the pools the operator already told us to expect.
    pub fn resolve_pool_for_token(&self, token: Address) -> Option<(Address, Address, Address)> {
        self.tracked
            .iter()
            .find(|t| t.token0 == token || t.token1 == token)
            .map(|t| (t.pool, t.token0, t.token1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ambush_chain_observer::MockChainClient;
    use ambush_types::PoolState;
    use ethers::types::U256;

    fn dex(pool: u64, t0: u64, t1: u64) -> DexConfig {
        DexConfig {
            name: "test-dex".into(),
            pool_type: "uniswap_v2".into(),
            router_address: Address::from_low_u64_be(999),
            pool_address: Address::from_low_u64_be(pool),
            token0: Address::from_low_u64_be(t0),
            token1: Address::from_low_u64_be(t1),
            fee_bps: 30,
        }
    }

    #[tokio::test]
    async fn refresh_produces_both_directed_edges_per_pool() {
        let mock = MockChainClient::new();
        mock.set_pool(PoolState {
            pool: Address::from_low_u64_be(1),
            reserve0: U256::from(1_000u64),
            reserve1: U256::from(2_000u64),
            fee_bps: 30,
            last_change_block: 1,
        });
        let client: Arc<dyn ChainClient> = Arc::new(mock);

        let graph = PoolGraph::from_config(&[dex(1, 10, 20)]);
        let edges = graph.refresh(&client).await;
        assert_eq!(edges.len(), 2);
        assert!(edges.iter().any(|e| e.token_in == Address::from_low_u64_be(10) && e.reserve_in == U256::from(1_000u64)));
        assert!(edges.iter().any(|e| e.token_in == Address::from_low_u64_be(20) && e.reserve_in == U256::from(2_000u64)));
    }

    #[tokio::test]
    async fn missing_pool_is_omitted_not_fatal() {
        let client: Arc<dyn ChainClient> = Arc::new(MockChainClient::new());
        let graph = PoolGraph::from_config(&[dex(1, 10, 20)]);
        let edges = graph.refresh(&client).await;
        assert!(edges.is_empty());
    }

    #[test]
    fn resolve_pool_for_token_matches_either_side() {
        let graph = PoolGraph::from_config(&[dex(1, 10, 20)]);
        assert_eq!(
            graph.resolve_pool_for_token(Address::from_low_u64_be(20)),
            Some((Address::from_low_u64_be(1), Address::from_low_u64_be(10), Address::from_low_u64_be(20)))
        );
        assert_eq!(graph.resolve_pool_for_token(Address::from_low_u64_be(999)), None);
    }
}
