//! The scheduler's core actor: the event-loop thread's private state (spec.md §5). It
//! is the only thing that ever mutates the pending-tx store, the safety supervisor's
//! counters, or the outstanding-bundle table; every other task hands it owned
//! `CoreMessage`s instead of reaching in directly (spec.md §9 REDESIGN FLAGS).

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use ethers::types::U256;
use tokio::sync::mpsc;
use tracing::{info, warn};

use ambush_chain_observer::BlockTick;
use ambush_config::{AmbushConfig, SafetyConfig};
use ambush_metrics::MetricsRegistry;
use ambush_pending_pool::PendingTxStore;
use ambush_relay_client::{BundleStatus, RelayClient, RelayProxy};
use ambush_supervisor::{BreakerCaps, NetworkHealth, NotificationSink, ResourceHealth, SafetySupervisor, TxCandidate};

use crate::messages::CoreMessage;
use crate::outstanding::OutstandingBundles;

/// Everything needed to construct the core actor, gathered in one place so
/// `LoopManager::spawn` has a single entry point (spec.md §9).
pub struct CoreConfig {
    pub safety: SafetyConfig,
    pub pending_tx_capacity: usize,
    pub pending_tx_ttl_secs: i64,
    pub notification_sinks: Vec<Arc<dyn NotificationSink>>,
    pub canceller: Option<Arc<dyn ambush_supervisor::TxCanceller>>,
    pub emergency_state_path: Option<PathBuf>,
}

impl CoreConfig {
    pub fn from_ambush_config(cfg: &AmbushConfig, emergency_state_path: Option<PathBuf>) -> Self {
        Self {
            safety: cfg.safety.clone(),
            pending_tx_capacity: cfg.pending_tx_capacity,
            pending_tx_ttl_secs: cfg.pending_tx_ttl_secs as i64,
            notification_sinks: Vec::new(),
            canceller: None,
            emergency_state_path,
        }
    }
}

pub struct SchedulerCore<R: RelayClient> {
    pub pending_txs: PendingTxStore,
    pub supervisor: SafetySupervisor,
    pub metrics: MetricsRegistry,
    pub outstanding: OutstandingBundles,
    relay: Arc<RelayProxy<R>>,
    current_block: u64,
}

impl<R: RelayClient> SchedulerCore<R> {
    pub fn boot(config: CoreConfig, relay: Arc<RelayProxy<R>>) -> Result<Self, ambush_supervisor::SupervisorError> {
        let caps = BreakerCaps::from(&config.safety);
        let mut supervisor = SafetySupervisor::boot(caps, config.notification_sinks, config.emergency_state_path)?;
        if let Some(canceller) = config.canceller {
            supervisor = supervisor.with_canceller(canceller);
        }
        Ok(Self {
            pending_txs: PendingTxStore::new(config.pending_tx_capacity, config.pending_tx_ttl_secs),
            supervisor,
            metrics: MetricsRegistry::new(),
            outstanding: OutstandingBundles::new(),
            relay,
            current_block: 0,
        })
    }

    pub fn current_block(&self) -> u64 {
        self.current_block
    }

    /// Drains `rx` until it closes (i.e. every producing task has been dropped, which
    /// happens on shutdown). This is the single-threaded event loop spec.md §5
    /// describes: one message handled fully before the next is taken.
    pub async fn run(mut self, mut rx: mpsc::Receiver<CoreMessage>) -> Self {
        while let Some(msg) = rx.recv().await {
            self.handle(msg).await;
        }
        self
    }

    async fn handle(&mut self, msg: CoreMessage) {
        match msg {
            CoreMessage::Tick(tick) => self.handle_tick(tick),
            CoreMessage::PendingTx(tx) => self.handle_pending_tx(tx),
            CoreMessage::Submit(req) => self.handle_submit(req).await,
            CoreMessage::Health { resource, network } => self.handle_health(resource, network).await,
            CoreMessage::PollStatuses => self.handle_poll_statuses().await,
            CoreMessage::DailyReset => {
                info!("daily safety-metrics reset");
                self.supervisor.daily_reset();
            }
        }
    }

    fn handle_tick(&mut self, tick: BlockTick) {
        self.current_block = tick.number;
        let now = Utc::now();
        self.pending_txs.evict_expired(now);
        let dropped_bundles = self.outstanding.prune(tick.number);
        if !dropped_bundles.is_empty() {
            self.relay.prune_submitted(tick.number.saturating_sub(2));
        }
    }

    fn handle_pending_tx(&mut self, tx: ambush_types::PendingTx) {
        self.pending_txs.ingest(tx);
    }

    async fn handle_submit(&mut self, req: crate::messages::SubmitRequest) {
        let now = Utc::now();
        let candidate = TxCandidate {
            value: req.candidate_value,
            gas_price: req.candidate_gas_price,
            gas_cost: req.candidate_gas_cost,
            to: req.candidate_to,
            expected_profit: req.expected_profit,
        };

        if let Err(err) = self.supervisor.validate_tx(&candidate, now) {
            warn!(strategy = req.strategy_id, error = %err, "submission rejected by safety supervisor");
            self.metrics.record_outcome(req.strategy_id, false);
            self.run_emergency_procedure_if_pending(now).await;
            return;
        }

        match self.relay.submit(&req.bundle, req.bundle.target_block).await {
            Ok(id) => {
                self.supervisor.record_submission(&candidate, now);
                self.outstanding.track(id, req.bundle.target_block, req.candidate_gas_price);
                self.metrics.record_outcome(req.strategy_id, true);
                info!(strategy = req.strategy_id, target_block = req.bundle.target_block, "bundle submitted");
            }
            Err(err) => {
                warn!(strategy = req.strategy_id, error = %err, "relay submission failed");
                self.metrics.record_outcome(req.strategy_id, false);
            }
        }
    }

    /// Runs the emergency procedure exactly once per fresh breaker trip (spec.md §4.8):
    /// notifications, best-effort cancellation of every outstanding bundle, and the
    /// persisted emergency-state write.
    async fn run_emergency_procedure_if_pending(&mut self, now: chrono::DateTime<Utc>) {
        if self.supervisor.take_pending_emergency() {
            let outstanding = self.outstanding.cancellation_candidates();
            self.supervisor.emergency_procedure(outstanding, now).await;
        }
    }

    async fn handle_health(&mut self, resource: ambush_metrics::health::ResourceSample, network: ambush_metrics::health::NetworkSample) {
        let now = Utc::now();
        self.metrics.health_mut().record_resource(resource);
        self.metrics.health_mut().record_network(network);
        self.metrics.publish_snapshot();

        let resource_health = ResourceHealth {
            cpu_pct: resource.cpu_pct as f32,
            ram_pct: resource.ram_pct as f32,
            disk_pct: resource.disk_pct as f32,
        };
        let network_health = NetworkHealth {
            base_fee: U256::from(network.base_fee_gwei).saturating_mul(U256::from(1_000_000_000u64)),
            base_fee_ceiling: self.supervisor.caps().max_gas_price,
            last_block_age_secs: now.signed_duration_since(network.last_block_at).num_seconds(),
        };
        if let Err(err) = self.supervisor.check_health(&resource_health, &network_health, now) {
            warn!(error = %err, "health check breaker tripped");
        }
        self.run_emergency_procedure_if_pending(now).await;
    }

    async fn handle_poll_statuses(&mut self) {
        for id in self.outstanding.ids() {
            match self.relay.status(&id).await {
                Ok(status) => {
                    self.outstanding.update_status(id, status);
                    if status == BundleStatus::Included {
                        info!(?id, "bundle included");
                    }
                }
                Err(err) => warn!(?id, error = %err, "status poll failed"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ambush_relay_client::MockRelayClient;

    fn config() -> CoreConfig {
        CoreConfig {
            safety: SafetyConfig::default(),
            pending_tx_capacity: 100,
            pending_tx_ttl_secs: 300,
            notification_sinks: Vec::new(),
            canceller: None,
            emergency_state_path: None,
        }
    }

    #[tokio::test]
    async fn submit_request_below_gas_ceiling_reaches_the_relay() {
        let relay = Arc::new(RelayProxy::new(MockRelayClient::new()));
        let mut core = SchedulerCore::boot(config(), relay.clone()).unwrap();

        let req = crate::messages::SubmitRequest {
            strategy_id: "arbitrage",
            bundle: ambush_types::Bundle {
                entries: vec![ambush_types::BundleEntry { raw_tx: ethers::types::Bytes::from(vec![1]), victim_hash: None }],
                target_block: 10,
                tip_per_gas: U256::from(1u64),
            },
            candidate_value: U256::from(100u64),
            candidate_gas_price: U256::from(10_000_000_000u64),
            candidate_gas_cost: U256::from(21_000u64),
            candidate_to: None,
            expected_profit: ethers::types::I256::from(10),
        };

        core.handle_submit(req).await;
        assert_eq!(relay.inner.submit_call_count(), 1);
        assert_eq!(core.outstanding.len(), 1);
    }

    #[tokio::test]
    async fn submit_request_above_gas_ceiling_is_rejected_before_relay_call() {
        let relay = Arc::new(RelayProxy::new(MockRelayClient::new()));
        let mut cfg = config();
        cfg.safety.max_gas_price_gwei = 50;
        let mut core = SchedulerCore::boot(cfg, relay.clone()).unwrap();

        let req = crate::messages::SubmitRequest {
            strategy_id: "sandwich",
            bundle: ambush_types::Bundle {
                entries: vec![ambush_types::BundleEntry { raw_tx: ethers::types::Bytes::from(vec![1]), victim_hash: None }],
                target_block: 10,
                tip_per_gas: U256::from(1u64),
            },
            candidate_value: U256::from(100u64),
            candidate_gas_price: U256::from(120_000_000_000u64),
            candidate_gas_cost: U256::from(21_000u64),
            candidate_to: None,
            expected_profit: ethers::types::I256::from(10),
        };

        core.handle_submit(req).await;
        assert_eq!(relay.inner.submit_call_count(), 0);
        assert!(core.outstanding.is_empty());
        assert!(core.supervisor.is_triggered());
        assert!(!core.supervisor.take_pending_emergency(), "emergency procedure should already have run");
    }

    #[tokio::test]
    async fn breaker_trip_runs_the_emergency_procedure_exactly_once() {
        let relay = Arc::new(RelayProxy::new(MockRelayClient::new()));
        let sink = Arc::new(ambush_supervisor::MockNotificationSink::new());
        let mut cfg = config();
        cfg.safety.max_gas_price_gwei = 50;
        cfg.notification_sinks = vec![sink.clone()];
        let mut core = SchedulerCore::boot(cfg, relay.clone()).unwrap();

        let req = |gas_price: U256| crate::messages::SubmitRequest {
            strategy_id: "sandwich",
            bundle: ambush_types::Bundle {
                entries: vec![ambush_types::BundleEntry { raw_tx: ethers::types::Bytes::from(vec![1]), victim_hash: None }],
                target_block: 10,
                tip_per_gas: U256::from(1u64),
            },
            candidate_value: U256::from(100u64),
            candidate_gas_price: gas_price,
            candidate_gas_cost: U256::from(21_000u64),
            candidate_to: None,
            expected_profit: ethers::types::I256::from(10),
        };

        core.handle_submit(req(U256::from(120_000_000_000u64))).await;
        assert_eq!(sink.sent().len(), 1);

        // A second trip while already triggered must not re-run the procedure.
        core.handle_submit(req(U256::from(120_000_000_000u64))).await;
        assert_eq!(sink.sent().len(), 1);
    }

    #[test]
    fn tick_advances_current_block_and_prunes_expired_bundles() {
        let relay = Arc::new(RelayProxy::new(MockRelayClient::new()));
        let mut core = SchedulerCore::boot(config(), relay).unwrap();
        core.outstanding.track(ambush_relay_client::BundleId(ethers::types::H256::zero()), 1, U256::from(1u64));

        core.handle_tick(BlockTick {
            number: 5,
            base_fee: U256::from(10u64),
            gas_used: U256::zero(),
            gas_limit: U256::from(30_000_000u64),
            timestamp: Utc::now(),
        });

        assert_eq!(core.current_block(), 5);
        assert!(core.outstanding.is_empty());
    }
}
