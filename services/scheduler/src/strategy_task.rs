//! One independent task per enabled strategy (spec.md §4.9: "a panic or stall in one
//! strategy task never affects another"). Each task owns nothing but its own cooldown
//! state; every read of shared chain state comes off the tick-snapshot watch channel,
//! and every submission goes through the core actor rather than touching the relay
//! directly.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, mpsc, watch};
use tracing::warn;

use ambush_bundle_builder::TxSigner;
use ambush_relay_client::{RelayClient, RelayProxy};
use ambush_strategies::{BuildContext, Observation, RelayFeeFloor, SignerRef, Strategy, StrategyConfig, TickSnapshot};

use crate::messages::{CoreMessage, SubmitRequest};
use crate::nonce::NonceAllocator;

pub async fn run<R: RelayClient + 'static>(
    strategy: Arc<dyn Strategy>,
    mut observations: broadcast::Receiver<Observation>,
    ticks: watch::Receiver<Option<TickSnapshot>>,
    cfg: StrategyConfig,
    relay: Arc<RelayProxy<R>>,
    signer: Arc<dyn TxSigner>,
    signer_ref: SignerRef,
    nonce: Arc<NonceAllocator>,
    relay_fee_floor: RelayFeeFloor,
    core_tx: mpsc::Sender<CoreMessage>,
) {
    let mut last_exec: Option<DateTime<Utc>> = None;

    loop {
        let observation = match observations.recv().await {
            Ok(obs) => obs,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(strategy = strategy.id(), skipped, "strategy task fell behind the observation stream");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => return,
        };

        let Some(tick) = ticks.borrow().clone() else { continue };
        let now = Utc::now();
        if !strategy.is_ready(now, last_exec, tick.block_number, &cfg) {
            continue;
        }

        let Some(opportunity) = strategy.analyze(&tick, &observation, &cfg) else { continue };
        last_exec = Some(now);

        let ctx = BuildContext {
            relay: relay.as_ref(),
            signer: signer.as_ref(),
            base_fee: tick.gas_price,
            target_block: tick.block_number + 1,
            starting_nonce: nonce.next(),
        };

        match strategy.build(&opportunity, signer_ref, relay_fee_floor, &ctx).await {
            Ok(Some(bundle)) => {
                let req = SubmitRequest {
                    strategy_id: strategy.id(),
                    candidate_value: opportunity.principal,
                    candidate_gas_price: tick.gas_price,
                    candidate_gas_cost: opportunity.expected_gas_cost,
                    candidate_to: opportunity.path.first().copied(),
                    expected_profit: opportunity.expected_net(),
                    bundle,
                };
                if core_tx.send(CoreMessage::Submit(req)).await.is_err() {
                    return;
                }
            }
            Ok(None) => {}
            Err(err) => warn!(strategy = strategy.id(), error = %err, "strategy declined to build a bundle"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ambush_bundle_builder::MockTxSigner;
    use ambush_relay_client::MockRelayClient;
    use ambush_strategies::ArbitrageStrategy;
    use ethers::types::{Address, U256};
    use std::time::Duration;

    #[tokio::test]
    async fn ready_arbitrage_probe_yields_no_submission_without_a_cycle() {
        let (obs_tx, obs_rx) = broadcast::channel(4);
        let (_snap_tx, snap_rx) = watch::channel(Some(TickSnapshot {
            block_number: 100,
            gas_price: U256::from(1u64),
            edges: vec![],
            observed_at: Utc::now(),
        }));
        let (core_tx, mut core_rx) = mpsc::channel(4);

        let relay = Arc::new(RelayProxy::new(MockRelayClient::new()));
        let signer: Arc<dyn TxSigner> = Arc::new(MockTxSigner);
        let nonce = Arc::new(NonceAllocator::starting_at(0));

        let handle = tokio::spawn(run(
            Arc::new(ArbitrageStrategy),
            obs_rx,
            snap_rx,
            StrategyConfig { warm_up_ticks: 0, ..StrategyConfig::default() },
            relay,
            signer,
            SignerRef { address: Address::zero() },
            nonce,
            U256::zero(),
            core_tx,
        ));

        obs_tx.send(Observation::Probe).unwrap();
        drop(obs_tx);

        let result = tokio::time::timeout(Duration::from_millis(200), core_rx.recv()).await;
        assert!(result.unwrap_or(None).is_none());
        handle.await.unwrap();
    }
}
