//! `LoopManager`: the single entry point that wires the chain observer, the core actor,
//! and every cooperative task into a running system (spec.md §9 REDESIGN FLAGS — one
//! place assembles the graph instead of components reaching for each other directly).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ethers::types::{Address, U256};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;

use ambush_bundle_builder::TxSigner;
use ambush_chain_observer::{BackoffPolicy, ChainClient, ChainObserver};
use ambush_config::AmbushConfig;
use ambush_flash_loan::{FlashLoanPlanner, LiquiditySource};
use ambush_relay_client::{RelayClient, RelayProxy};
use ambush_strategies::{
    ArbitrageStrategy, CodePresenceCheck, FrontRunStrategy, JitLiquidityStrategy, NewPoolSniperStrategy,
    SandwichStrategy, SignerRef, Strategy, StrategyConfig, TickSnapshot,
};
use ambush_supervisor::{NotificationSink, SupervisorError};

use crate::core::{CoreConfig, SchedulerCore};
use crate::health_probe::{NetworkProbe, ResourceProbe};
use crate::pool_graph::PoolGraph;
use crate::{flashloan_refresh_task, ingest_task, monitor_task, tick_task, tx_watch_task};
use crate::nonce::NonceAllocator;

const DEFAULT_TICK_POLL: Duration = Duration::from_millis(500);
const DEFAULT_DEGRADED_AFTER: u32 = 5;
const DEFAULT_FLASHLOAN_STALE_SECS: i64 = 60;
const DEFAULT_TX_WATCH_INTERVAL: Duration = Duration::from_secs(3);

/// Everything the operator's collaborator implementations need to supply; production
/// wiring fills this with real adapters, `bin/ambush` defaults to the crate's `Mock*`
/// doubles for the external boundaries spec.md §1 carves out.
pub struct LoopManagerConfig<R: RelayClient> {
    pub config: AmbushConfig,
    pub chain_client: Arc<dyn ChainClient>,
    pub relay_client: R,
    pub signer: Arc<dyn TxSigner>,
    pub signer_address: Address,
    pub starting_nonce: u64,
    pub liquidity_source: Arc<dyn LiquiditySource>,
    pub code_presence_check: Arc<dyn CodePresenceCheck>,
    pub notification_sinks: Vec<Arc<dyn NotificationSink>>,
    pub canceller: Option<Arc<dyn ambush_supervisor::TxCanceller>>,
    pub resource_probe: Arc<dyn ResourceProbe>,
    pub network_probe: Arc<dyn NetworkProbe>,
    pub emergency_state_path: Option<PathBuf>,
    pub relay_fee_floor: U256,
}

fn strategy_config(config: &AmbushConfig) -> StrategyConfig {
    StrategyConfig {
        cooldown: chrono::Duration::seconds(config.strategy_cooldown_secs as i64),
        new_pool_factory_whitelist: config.new_pool_factory_whitelist.clone(),
        ..StrategyConfig::default()
    }
}

fn build_strategies(config: &AmbushConfig, planner: Arc<FlashLoanPlanner>, code_check: Arc<dyn CodePresenceCheck>) -> Vec<Arc<dyn Strategy>> {
    let mut strategies: Vec<Arc<dyn Strategy>> = Vec::new();
    let enabled = |id: &str| config.strategies.is_empty() || config.strategies.iter().any(|s| s == id);

    if enabled("arbitrage") {
        strategies.push(Arc::new(ArbitrageStrategy));
    }
    if enabled("front_run") {
        strategies.push(Arc::new(FrontRunStrategy));
    }
    if enabled("sandwich") {
        strategies.push(Arc::new(SandwichStrategy::new(config.sandwich_back_multiplier_bps)));
    }
    if enabled("jit_liquidity") {
        strategies.push(Arc::new(JitLiquidityStrategy::new(planner)));
    }
    if enabled("new_pool_sniper") {
        strategies.push(Arc::new(NewPoolSniperStrategy::new(code_check)));
    }
    strategies
}

/// Owns every task this crate spawns; dropping or calling `shutdown` tears the whole
/// pipeline down, matching spec.md §5's "cancellation is prompt" for the chain observer
/// and a clean close of every `mpsc` channel for the rest.
pub struct LoopManager<R: RelayClient> {
    handles: Vec<JoinHandle<()>>,
    core_handle: JoinHandle<SchedulerCore<R>>,
    canceller: ambush_chain_observer::Canceller,
}

impl<R: RelayClient + Send + Sync + 'static> LoopManager<R> {
    pub fn spawn(cfg: LoopManagerConfig<R>) -> Result<Self, SupervisorError> {
        let core_config = CoreConfig {
            safety: cfg.config.safety.clone(),
            pending_tx_capacity: cfg.config.pending_tx_capacity,
            pending_tx_ttl_secs: cfg.config.pending_tx_ttl_secs as i64,
            notification_sinks: cfg.notification_sinks,
            canceller: cfg.canceller,
            emergency_state_path: cfg.emergency_state_path,
        };

        let relay = Arc::new(RelayProxy::new(cfg.relay_client));
        let core = SchedulerCore::boot(core_config, relay.clone())?;
        let (core_tx, core_rx) = mpsc::channel(1024);
        let core_handle = tokio::spawn(core.run(core_rx));

        let observer = ChainObserver::spawn(cfg.chain_client.clone(), DEFAULT_TICK_POLL, BackoffPolicy::default(), DEFAULT_DEGRADED_AFTER);
        let canceller = observer.canceller();
        let mut degraded = observer.degraded;
        let block_ticks = observer.block_ticks;
        let pending_txs = observer.pending_txs;

        let pool_graph = PoolGraph::from_config(&cfg.config.dexes);
        let (snapshot_tx, snapshot_rx) = watch::channel::<Option<TickSnapshot>>(None);
        let (observation_tx, _) = broadcast::channel(1024);

        let mut handles = Vec::new();

        handles.push(tokio::spawn(tick_task::run(
            block_ticks,
            cfg.chain_client.clone(),
            pool_graph.clone(),
            snapshot_tx,
            observation_tx.clone(),
            core_tx.clone(),
        )));

        handles.push(tokio::spawn(ingest_task::run(
            pending_txs,
            pool_graph,
            cfg.config.new_pool_factory_whitelist.clone(),
            observation_tx.clone(),
            core_tx.clone(),
        )));

        // The observer's degraded signal escalates to the supervisor as a WARNING via
        // tracing; a dedicated safety breaker is out of scope here (spec.md §4.1 covers
        // back-off and the signal itself, not the supervisor's reaction to it).
        handles.push(tokio::spawn(async move {
            while degraded.changed().await.is_ok() {
                if *degraded.borrow() {
                    tracing::warn!("chain observer degraded: sustained RPC failures");
                }
            }
        }));

        handles.push(tokio::spawn(monitor_task::run(
            cfg.resource_probe,
            cfg.network_probe,
            Duration::from_secs(cfg.config.safety.health_check_interval_secs),
            Duration::from_secs(cfg.config.safety.metrics_reset_interval_secs),
            move || U256::zero(),
            move || 0,
            core_tx.clone(),
        )));

        handles.push(tokio::spawn(tx_watch_task::run(DEFAULT_TX_WATCH_INTERVAL, core_tx.clone())));

        let planner = Arc::new(FlashLoanPlanner::new(&cfg.config.flashloan_venues, DEFAULT_FLASHLOAN_STALE_SECS));
        let tracked_tokens: Vec<Address> = cfg
            .config
            .dexes
            .iter()
            .flat_map(|d| [d.token0, d.token1])
            .collect();
        handles.push(tokio::spawn(flashloan_refresh_task::run(
            planner.clone(),
            cfg.liquidity_source,
            tracked_tokens,
            Duration::from_secs(30),
            || 0,
        )));

        let strat_cfg = strategy_config(&cfg.config);
        let signer_ref = SignerRef { address: cfg.signer_address };
        let nonce = Arc::new(NonceAllocator::starting_at(cfg.starting_nonce));

        for strategy in build_strategies(&cfg.config, planner, cfg.code_presence_check) {
            handles.push(tokio::spawn(crate::strategy_task::run(
                strategy,
                observation_tx.subscribe(),
                snapshot_rx.clone(),
                strat_cfg.clone(),
                relay.clone(),
                cfg.signer.clone(),
                signer_ref,
                nonce.clone(),
                cfg.relay_fee_floor,
                core_tx.clone(),
            )));
        }

        Ok(Self { handles, core_handle, canceller })
    }

    /// Prompt, best-effort shutdown: cancels the chain observer and aborts every spawned
    /// task. The core actor is left to the caller to `join` once its channel drains.
    pub fn shutdown(&self) {
        self.canceller.cancel();
        for handle in &self.handles {
            handle.abort();
        }
    }

    pub async fn join_core(self) -> Result<SchedulerCore<R>, tokio::task::JoinError> {
        self.core_handle.await
    }
}
