//! Periodic health check and daily metrics reset (spec.md §4.9, default 60s cadence for
//! health, `metrics_reset_interval_secs` for the daily reset). Both are read-only probes
//! handed off to the core actor as `CoreMessage`s — this task never touches the
//! supervisor or metrics registry directly.

use std::sync::Arc;
use std::time::Duration;

use ethers::types::U256;
use tokio::sync::mpsc;

use crate::health_probe::{NetworkProbe, ResourceProbe};
use crate::messages::CoreMessage;

pub async fn run(
    resource_probe: Arc<dyn ResourceProbe>,
    network_probe: Arc<dyn NetworkProbe>,
    health_interval: Duration,
    daily_reset_interval: Duration,
    base_fee_source: impl Fn() -> U256 + Send + 'static,
    last_block_age_source: impl Fn() -> i64 + Send + 'static,
    core_tx: mpsc::Sender<CoreMessage>,
) {
    let mut health_ticker = tokio::time::interval(health_interval);
    let mut reset_ticker = tokio::time::interval(daily_reset_interval);

    loop {
        tokio::select! {
            _ = health_ticker.tick() => {
                let resource = resource_probe.sample().await;
                let network = network_probe
                    .sample(base_fee_source(), last_block_age_source())
                    .await;
                if core_tx.send(CoreMessage::Health { resource, network }).await.is_err() {
                    return;
                }
            }
            _ = reset_ticker.tick() => {
                if core_tx.send(CoreMessage::DailyReset).await.is_err() {
                    return;
                }
            }
        }
    }
}
