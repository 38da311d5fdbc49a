//! Drives `ChainClient` polling into the two lazy sequences spec.md §4.1 describes:
//! block-ticks and pending-tx events. Retries transient failures with capped back-off;
//! after `degraded_after` consecutive failures, flips a `watch` signal the supervisor
//! escalates to a WARNING incident. Consumers cancel by dropping the handle or calling
//! `cancel()`; cancellation is observed within one in-flight poll.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use ethers::types::U256;
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use crate::backoff::BackoffPolicy;
use crate::client::ChainClient;
use ambush_types::PendingTx;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockTick {
    pub number: u64,
    pub base_fee: U256,
    pub gas_used: U256,
    pub gas_limit: U256,
    pub timestamp: DateTime<Utc>,
}

pub struct ObserverHandle {
    pub block_ticks: mpsc::Receiver<BlockTick>,
    pub pending_txs: mpsc::Receiver<PendingTx>,
    pub degraded: watch::Receiver<bool>,
    shutdown: Arc<AtomicBool>,
}

impl ObserverHandle {
    /// Prompt, best-effort cancellation: both polling tasks observe this within the
    /// current in-flight call (spec.md §5 "cancellation is prompt").
    pub fn cancel(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// A cloneable cancel switch, for callers that need to move `block_ticks`/
    /// `pending_txs` out of the handle (e.g. into spawned tasks) while retaining the
    /// ability to cancel afterward.
    pub fn canceller(&self) -> Canceller {
        Canceller(self.shutdown.clone())
    }
}

#[derive(Clone)]
pub struct Canceller(Arc<AtomicBool>);

impl Canceller {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

pub struct ChainObserver;

impl ChainObserver {
    pub fn spawn(
        client: Arc<dyn ChainClient>,
        poll_interval: Duration,
        backoff: BackoffPolicy,
        degraded_after: u32,
    ) -> ObserverHandle {
        let shutdown = Arc::new(AtomicBool::new(false));
        let (tick_tx, tick_rx) = mpsc::channel(256);
        let (pending_tx, pending_rx) = mpsc::channel(1024);
        let (degraded_tx, degraded_rx) = watch::channel(false);

        tokio::spawn(Self::tick_loop(
            client.clone(),
            poll_interval,
            backoff,
            degraded_after,
            shutdown.clone(),
            tick_tx,
            degraded_tx.clone(),
        ));
        tokio::spawn(Self::pending_loop(
            client,
            poll_interval,
            backoff,
            degraded_after,
            shutdown.clone(),
            pending_tx,
            degraded_tx,
        ));

        ObserverHandle {
            block_ticks: tick_rx,
            pending_txs: pending_rx,
            degraded: degraded_rx,
            shutdown,
        }
    }

    async fn tick_loop(
        client: Arc<dyn ChainClient>,
        poll_interval: Duration,
        backoff: BackoffPolicy,
        degraded_after: u32,
        shutdown: Arc<AtomicBool>,
        out: mpsc::Sender<BlockTick>,
        degraded: watch::Sender<bool>,
    ) {
        let mut last_seen: Option<u64> = None;
        let mut consecutive_failures = 0u32;

        while !shutdown.load(Ordering::SeqCst) {
            match client.poll_block_tick(last_seen).await {
                Ok(Some(tick)) => {
                    consecutive_failures = 0;
                    let _ = degraded.send(false);
                    last_seen = Some(tick.number);
                    if out.send(tick).await.is_err() {
                        return;
                    }
                }
                Ok(None) => {
                    consecutive_failures = 0;
                }
                Err(err) => {
                    consecutive_failures += 1;
                    warn!(error = %err, "chain observer block tick poll failed");
                    Self::note_failure(&degraded, consecutive_failures, degraded_after);
                    tokio::time::sleep(backoff.delay_for(consecutive_failures)).await;
                    continue;
                }
            }
            tokio::time::sleep(poll_interval).await;
        }
    }

    async fn pending_loop(
        client: Arc<dyn ChainClient>,
        poll_interval: Duration,
        backoff: BackoffPolicy,
        degraded_after: u32,
        shutdown: Arc<AtomicBool>,
        out: mpsc::Sender<PendingTx>,
        degraded: watch::Sender<bool>,
    ) {
        let mut consecutive_failures = 0u32;

        while !shutdown.load(Ordering::SeqCst) {
            match client.poll_pending_txs().await {
                Ok(txs) => {
                    consecutive_failures = 0;
                    let _ = degraded.send(false);
                    for tx in txs {
                        debug!(hash = ?tx.hash, "observed pending tx");
                        if out.send(tx).await.is_err() {
                            return;
                        }
                    }
                }
                Err(err) => {
                    consecutive_failures += 1;
                    warn!(error = %err, "chain observer pending-tx poll failed");
                    Self::note_failure(&degraded, consecutive_failures, degraded_after);
                    tokio::time::sleep(backoff.delay_for(consecutive_failures)).await;
                    continue;
                }
            }
            tokio::time::sleep(poll_interval).await;
        }
    }

    fn note_failure(degraded: &watch::Sender<bool>, consecutive_failures: u32, degraded_after: u32) {
        if consecutive_failures >= degraded_after {
            let _ = degraded.send(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockChainClient;
    use std::time::Duration as StdDuration;

    #[tokio::test]
    async fn delivers_ticks_and_drains_pending_txs() {
        let client = Arc::new(MockChainClient::new());
        client.push_tick(BlockTick {
            number: 1,
            base_fee: U256::from(10u64),
            gas_used: U256::zero(),
            gas_limit: U256::from(30_000_000u64),
            timestamp: Utc::now(),
        });
        client.push_pending(ambush_types::PendingTx {
            hash: ethers::types::H256::zero(),
            sender: ethers::types::Address::zero(),
            receiver: None,
            value: U256::zero(),
            gas_price: ambush_types::GasPrice::Legacy { gas_price: U256::zero() },
            gas_limit: U256::from(21_000u64),
            nonce: U256::zero(),
            input: ethers::types::Bytes::default(),
            first_seen: Utc::now(),
            protocol: ambush_types::ProtocolTag::Unknown,
            routed_token: None,
        });

        let mut handle = ChainObserver::spawn(
            client,
            StdDuration::from_millis(5),
            BackoffPolicy::default(),
            3,
        );

        let tick = tokio::time::timeout(StdDuration::from_secs(1), handle.block_ticks.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tick.number, 1);

        let tx = tokio::time::timeout(StdDuration::from_secs(1), handle.pending_txs.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tx.gas_limit, U256::from(21_000u64));

        handle.cancel();
    }

    #[tokio::test]
    async fn sustained_failures_flip_degraded_signal() {
        let client = Arc::new(MockChainClient::new());
        client.fail_next(10);

        let mut handle = ChainObserver::spawn(
            client,
            StdDuration::from_millis(1),
            BackoffPolicy::new(StdDuration::from_millis(1), StdDuration::from_millis(5)),
            2,
        );

        let became_degraded = tokio::time::timeout(StdDuration::from_secs(1), async {
            loop {
                if *handle.degraded.borrow() {
                    return true;
                }
                handle.degraded.changed().await.unwrap();
            }
        })
        .await
        .unwrap();

        assert!(became_degraded);
        handle.cancel();
    }
}
