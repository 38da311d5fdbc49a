//! Turns the chain observer's pending-tx stream into owned `CoreMessage::PendingTx`
//! hand-offs for C2's store, and fans a classified `Observation` out to the strategy
//! task fleet (spec.md §4.9). A pending transaction addressed to a whitelisted factory
//! is read as a pool-creation signal; everything else is a potential victim.

use ethers::types::Address;
use tokio::sync::{broadcast, mpsc};

use ambush_strategies::Observation;
use ambush_types::PendingTx;

use crate::messages::CoreMessage;
use crate::pool_graph::PoolGraph;

pub async fn run(
    mut pending: mpsc::Receiver<PendingTx>,
    pool_graph: PoolGraph,
    factory_whitelist: Vec<Address>,
    observations_tx: broadcast::Sender<Observation>,
    core_tx: mpsc::Sender<CoreMessage>,
) {
    while let Some(tx) = pending.recv().await {
        if core_tx.send(CoreMessage::PendingTx(tx.clone())).await.is_err() {
            return;
        }

        let observation = classify(&tx, &pool_graph, &factory_whitelist);
        let _ = observations_tx.send(observation);
    }
}

fn classify(tx: &PendingTx, pool_graph: &PoolGraph, factory_whitelist: &[Address]) -> Observation {
    let Some(factory) = tx.receiver.filter(|r| factory_whitelist.contains(r)) else {
        return Observation::PendingVictim(tx.clone());
    };

    let Some(token) = tx.routed_token else { return Observation::PendingVictim(tx.clone()) };
    match pool_graph.resolve_pool_for_token(token) {
        Some((pool, token0, token1)) => Observation::PoolCreated { pool, factory, token0, token1 },
        None => Observation::PendingVictim(tx.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ambush_config::DexConfig;
    use chrono::Utc;
    use ethers::types::{Bytes, H256, U256};

    fn dex() -> DexConfig {
        DexConfig {
            name: "test".into(),
            pool_type: "uniswap_v2".into(),
            router_address: Address::zero(),
            pool_address: Address::from_low_u64_be(1),
            token0: Address::from_low_u64_be(10),
            token1: Address::from_low_u64_be(20),
            fee_bps: 30,
        }
    }

    fn tx(receiver: Option<Address>, routed_token: Option<Address>) -> PendingTx {
        PendingTx {
            hash: H256::zero(),
            sender: Address::from_low_u64_be(5),
            receiver,
            value: U256::zero(),
            gas_price: ambush_types::GasPrice::Legacy { gas_price: U256::zero() },
            gas_limit: U256::zero(),
            nonce: U256::zero(),
            input: Bytes::default(),
            first_seen: Utc::now(),
            protocol: ambush_types::ProtocolTag::Unknown,
            routed_token,
        }
    }

    #[test]
    fn factory_call_with_known_token_becomes_pool_created() {
        let graph = PoolGraph::from_config(&[dex()]);
        let factory = Address::from_low_u64_be(42);
        let t = tx(Some(factory), Some(Address::from_low_u64_be(10)));

        let obs = classify(&t, &graph, &[factory]);
        assert!(matches!(obs, Observation::PoolCreated { pool, .. } if pool == Address::from_low_u64_be(1)));
    }

    #[test]
    fn non_factory_call_is_a_pending_victim() {
        let graph = PoolGraph::from_config(&[dex()]);
        let t = tx(Some(Address::from_low_u64_be(999)), None);
        assert!(matches!(classify(&t, &graph, &[Address::from_low_u64_be(42)]), Observation::PendingVictim(_)));
    }

    #[test]
    fn factory_call_with_unresolvable_token_falls_back_to_pending_victim() {
        let graph = PoolGraph::from_config(&[dex()]);
        let factory = Address::from_low_u64_be(42);
        let t = tx(Some(factory), Some(Address::from_low_u64_be(777)));
        assert!(matches!(classify(&t, &graph, &[factory]), Observation::PendingVictim(_)));
    }
}
