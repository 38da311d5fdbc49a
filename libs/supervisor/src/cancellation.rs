//! The emergency procedure's "attempt to cancel pending transactions" step (spec.md
//! §4.8): rebroadcasting a self-pay at 150% of each outstanding transaction's gas
//! price. Building and broadcasting that replacement transaction needs the external
//! signer and the chain RPC's broadcast path (spec.md §1 Non-goals), so this crate only
//! owns the boundary trait the supervisor calls through, the same way `NotificationSink`
//! stands in for the external alert sinks.

use async_trait::async_trait;
use ethers::types::U256;
use parking_lot::Mutex;

/// 150% of the original gas price, per spec.md §4.8's emergency procedure.
pub const CANCEL_GAS_MULTIPLIER_BPS: u64 = 15_000;

#[derive(Debug, thiserror::Error)]
pub enum CancellationError {
    #[error("cancellation broadcast failed: {0}")]
    BroadcastFailed(String),
}

#[async_trait]
pub trait TxCanceller: Send + Sync {
    /// Best-effort: rebroadcasts a zero-value self-pay at `original_gas_price * 1.5`
    /// so the outstanding transaction's nonce gets superseded in the public mempool.
    async fn cancel(&self, bundle_id: &str, original_gas_price: U256) -> Result<(), CancellationError>;
}

pub fn cancellation_gas_price(original: U256) -> U256 {
    original.saturating_mul(U256::from(CANCEL_GAS_MULTIPLIER_BPS)) / U256::from(10_000u64)
}

/// Records every cancellation attempt it receives, for asserting on the emergency
/// procedure in tests. `bin/ambush` wires a real one once it owns a signer capable of
/// broadcasting outside of the relay bundle path.
#[derive(Default)]
pub struct MockTxCanceller {
    attempts: Mutex<Vec<(String, U256)>>,
}

impl MockTxCanceller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> Vec<(String, U256)> {
        self.attempts.lock().clone()
    }
}

#[async_trait]
impl TxCanceller for MockTxCanceller {
    async fn cancel(&self, bundle_id: &str, original_gas_price: U256) -> Result<(), CancellationError> {
        self.attempts.lock().push((bundle_id.to_string(), cancellation_gas_price(original_gas_price)));
        Ok(())
    }
}
