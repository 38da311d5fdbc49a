//! Pending mempool transactions.

use chrono::{DateTime, Utc};
use ethers::types::{Address, Bytes, H256, U256};
use serde::{Deserialize, Serialize};

/// Gas pricing as a tagged sum rather than an optional-field grab bag — a transaction
/// is either legacy-priced or EIP-1559-priced, never ambiguously both or neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GasPrice {
    Legacy { gas_price: U256 },
    Eip1559 { max_fee: U256, priority_fee: U256 },
}

impl GasPrice {
    /// The price actually paid per unit of gas when included at `base_fee`.
    pub fn effective(&self, base_fee: U256) -> U256 {
        match *self {
            GasPrice::Legacy { gas_price } => gas_price,
            GasPrice::Eip1559 { max_fee, priority_fee } => {
                let tip = max_fee.saturating_sub(base_fee).min(priority_fee);
                base_fee.saturating_add(tip)
            }
        }
    }

    /// The priority tip component, used by the gas-weighted tip sweep in the numeric kernel.
    pub fn priority_component(&self) -> U256 {
        match *self {
            GasPrice::Legacy { gas_price } => gas_price,
            GasPrice::Eip1559 { priority_fee, .. } => priority_fee,
        }
    }
}

/// Decoded protocol family a pending transaction routes through, mirrored from the
/// teacher's `DEXProtocol` tag but scoped to what the strategy set actually branches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProtocolTag {
    UniswapV2,
    UniswapV3,
    SushiSwap,
    Curve,
    Balancer,
    Unknown,
}

pub type TokenId = Address;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTx {
    pub hash: H256,
    pub sender: Address,
    pub receiver: Option<Address>,
    pub value: U256,
    pub gas_price: GasPrice,
    pub gas_limit: U256,
    pub nonce: U256,
    pub input: Bytes,
    pub first_seen: DateTime<Utc>,
    pub protocol: ProtocolTag,
    pub routed_token: Option<TokenId>,
}

impl PendingTx {
    /// Age of this entry relative to `now`, used by the TTL eviction sweep in C2.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now.signed_duration_since(self.first_seen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> Address {
        Address::from_low_u64_be(n as u64)
    }

    #[test]
    fn legacy_effective_price_ignores_base_fee() {
        let gp = GasPrice::Legacy { gas_price: U256::from(50_000_000_000u64) };
        assert_eq!(gp.effective(U256::from(30_000_000_000u64)), U256::from(50_000_000_000u64));
    }

    #[test]
    fn eip1559_effective_price_clamps_tip_to_priority_fee() {
        let gp = GasPrice::Eip1559 {
            max_fee: U256::from(100_000_000_000u64),
            priority_fee: U256::from(2_000_000_000u64),
        };
        // base fee leaves room for more tip than priority_fee allows; should clamp.
        let effective = gp.effective(U256::from(10_000_000_000u64));
        assert_eq!(effective, U256::from(12_000_000_000u64));
    }

    #[test]
    fn eip1559_effective_price_never_exceeds_max_fee() {
        let gp = GasPrice::Eip1559 {
            max_fee: U256::from(40_000_000_000u64),
            priority_fee: U256::from(10_000_000_000u64),
        };
        let effective = gp.effective(U256::from(35_000_000_000u64));
        assert!(effective <= U256::from(40_000_000_000u64));
    }

    #[test]
    fn age_reflects_elapsed_time() {
        let seen = Utc::now() - chrono::Duration::seconds(5);
        let tx = PendingTx {
            hash: H256::zero(),
            sender: addr(1),
            receiver: Some(addr(2)),
            value: U256::zero(),
            gas_price: GasPrice::Legacy { gas_price: U256::zero() },
            gas_limit: U256::from(21_000),
            nonce: U256::zero(),
            input: Bytes::default(),
            first_seen: seen,
            protocol: ProtocolTag::Unknown,
            routed_token: None,
        };
        assert!(tx.age(Utc::now()).num_seconds() >= 5);
    }
}
