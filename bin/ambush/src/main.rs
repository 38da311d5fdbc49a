//! Binary entry point (spec.md §6): loads configuration, wires the metrics exporter and
//! structured logging, boots the safety supervisor (honoring a persisted emergency
//! state), assembles the scheduler's task fleet, and runs until interrupted.
//!
//! The signer, relay wire protocol, and chain RPC transport are external collaborators
//! spec.md §1 deliberately scopes out of this crate; this binary wires them to their
//! `Mock*` test doubles by default so the system runs end-to-end out of the box. A
//! production deployment swaps these three constructor calls for real adapters.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use ethers::types::{Address, U256};
use tracing::{error, info};

use ambush_bundle_builder::MockTxSigner;
use ambush_chain_observer::MockChainClient;
use ambush_config::AmbushConfig;
use ambush_flash_loan::MockLiquiditySource;
use ambush_relay_client::MockRelayClient;
use ambush_scheduler::loop_manager::{LoopManager, LoopManagerConfig};
use ambush_strategies::MockCodePresenceCheck;
use ambush_supervisor::MockTxCanceller;

mod notify;

use notify::StderrNotificationSink;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .json()
        .init();

    let config_path = std::env::var("AMBUSH_CONFIG_PATH").ok().map(PathBuf::from);
    let config = AmbushConfig::load(config_path.as_deref()).context("loading ambush configuration")?;

    let recorder = metrics_exporter_prometheus::PrometheusBuilder::new()
        .build_recorder();
    let handle = recorder.handle();
    metrics::set_global_recorder(recorder).context("installing prometheus recorder")?;
    tokio::spawn(serve_metrics(handle));

    info!(strategies = ?config.strategies, "starting ambush");

    let loop_config = LoopManagerConfig {
        chain_client: Arc::new(MockChainClient::new()),
        relay_client: MockRelayClient::new(),
        signer: Arc::new(MockTxSigner),
        signer_address: Address::zero(),
        starting_nonce: 0,
        liquidity_source: Arc::new(MockLiquiditySource::new()),
        code_presence_check: Arc::new(MockCodePresenceCheck::default()),
        notification_sinks: vec![Arc::new(StderrNotificationSink)],
        canceller: Some(Arc::new(MockTxCanceller::new())),
        resource_probe: Arc::new(ambush_scheduler::health_probe::MockResourceProbe::default()),
        network_probe: Arc::new(ambush_scheduler::health_probe::MockNetworkProbe),
        emergency_state_path: Some(PathBuf::from("data/emergency_state.json")),
        relay_fee_floor: U256::zero(),
        config,
    };

    let manager = LoopManager::spawn(loop_config).context("assembling the scheduler's task fleet")?;

    tokio::signal::ctrl_c().await.context("waiting for shutdown signal")?;
    info!("shutdown signal received, stopping");
    manager.shutdown();

    let core = manager.join_core().await.context("joining core actor after shutdown")?;
    if core.supervisor.is_triggered() {
        error!(reason = ?core.supervisor.metrics().trigger_reason, "exiting after a safety breaker trip");
        std::process::exit(1);
    }

    Ok(())
}

/// Serves the Prometheus text-exposition format on `/metrics`, mirroring the teacher's
/// `HealthCheckServer` (`services/observability/health_check`): a `make_service_fn` /
/// `service_fn` pair over a bound `hyper::Server`, not the wire transport spec.md §1
/// carves out (that's the RPC/relay/signer boundary, not this operator-facing endpoint).
async fn serve_metrics(handle: metrics_exporter_prometheus::PrometheusHandle) {
    use hyper::service::{make_service_fn, service_fn};
    use hyper::{Body, Response, Server};
    use std::convert::Infallible;
    use std::net::SocketAddr;

    let addr: SocketAddr = ([0, 0, 0, 0], 9000).into();
    let make_svc = make_service_fn(move |_conn| {
        let handle = handle.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |_req| {
                let handle = handle.clone();
                async move { Ok::<_, Infallible>(Response::new(Body::from(handle.render()))) }
            }))
        }
    });

    info!(%addr, "prometheus exporter listening on /metrics");
    if let Err(err) = Server::bind(&addr).serve(make_svc).await {
        error!(error = %err, "prometheus exporter failed");
    }
}
