//! `ChainClient`: the external chain-RPC boundary (spec.md §1's "external chain client
//! providing typed observations"). Production wiring hands this crate a client backed
//! by `ethers::providers::Provider<Http>` / a websocket subscription; `MockChainClient`
//! is the teacher-pattern test double (grounded in the sibling repos' `testing-tools`
//! mocks, and in how `executor.rs`/`gas_price.rs` wrap `Provider<Http>` here).

use ambush_types::{PendingTx, PoolState};
use async_trait::async_trait;
use ethers::types::Address;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::observer::BlockTick;

#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("transient RPC failure: {0}")]
    Transient(String),
    #[error("RPC call timed out")]
    Timeout,
    #[error("no such pool: {0:?}")]
    UnknownPool(Address),
}

/// Everything the observer needs from the chain, expressed as request/response calls
/// rather than raw JSON-RPC — cancellation and retry live in `ChainObserver`, not here.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Returns the current head, or `None` if it has not advanced since the last poll.
    async fn poll_block_tick(&self, last_seen: Option<u64>) -> Result<Option<BlockTick>, ChainError>;

    /// Drains newly observed pending transactions since the last call.
    async fn poll_pending_txs(&self) -> Result<Vec<PendingTx>, ChainError>;

    /// Point-in-time reserve snapshot for a single pool.
    async fn fetch_pool_state(&self, pool: Address) -> Result<PoolState, ChainError>;
}

/// Deterministic in-memory stand-in for `ChainClient`, used by scheduler/strategy
/// tests so C4-C9 can be exercised without a live RPC endpoint.
#[derive(Default)]
pub struct MockChainClient {
    ticks: Mutex<VecDeque<BlockTick>>,
    pending: Mutex<VecDeque<PendingTx>>,
    pools: Mutex<std::collections::HashMap<Address, PoolState>>,
    fail_next_n_calls: Mutex<u32>,
}

impl MockChainClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_tick(&self, tick: BlockTick) {
        self.ticks.lock().unwrap().push_back(tick);
    }

    pub fn push_pending(&self, tx: PendingTx) {
        self.pending.lock().unwrap().push_back(tx);
    }

    pub fn set_pool(&self, pool: PoolState) {
        self.pools.lock().unwrap().insert(pool.pool, pool);
    }

    /// Makes the next `n` calls of any kind fail transiently, to exercise back-off.
    pub fn fail_next(&self, n: u32) {
        *self.fail_next_n_calls.lock().unwrap() = n;
    }

    fn maybe_fail(&self) -> Result<(), ChainError> {
        let mut remaining = self.fail_next_n_calls.lock().unwrap();
        if *remaining > 0 {
            *remaining -= 1;
            return Err(ChainError::Transient("mock-injected failure".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn poll_block_tick(&self, last_seen: Option<u64>) -> Result<Option<BlockTick>, ChainError> {
        self.maybe_fail()?;
        let mut ticks = self.ticks.lock().unwrap();
        match ticks.front() {
            Some(t) if Some(t.number) != last_seen => Ok(ticks.pop_front()),
            _ => Ok(None),
        }
    }

    async fn poll_pending_txs(&self) -> Result<Vec<PendingTx>, ChainError> {
        self.maybe_fail()?;
        let mut pending = self.pending.lock().unwrap();
        Ok(pending.drain(..).collect())
    }

    async fn fetch_pool_state(&self, pool: Address) -> Result<PoolState, ChainError> {
        self.maybe_fail()?;
        self.pools
            .lock()
            .unwrap()
            .get(&pool)
            .copied()
            .ok_or(ChainError::UnknownPool(pool))
    }
}
