//! One unsigned transaction leg, the bundle builder's working unit before gas shaping
//! and signing. Generalized from the teacher's `BundleTransaction` (`mev/src/bundle.rs`)
//! to 256-bit integer fields and an optional victim reference.

use ethers::types::{Address, Bytes, H256, U256};

#[derive(Debug, Clone)]
pub struct TxLeg {
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
    pub gas_limit: U256,
    /// Strategy's own hint for `max_fee`, overridden upward by the base-fee-derived floor.
    pub max_fee_hint: U256,
    /// Profit attributable to this leg, used only to order arbitrage's internal legs.
    pub profit: ethers::types::I256,
    /// Set when this leg references (but does not itself sign) a specific victim tx.
    pub victim_hash: Option<H256>,
}

impl TxLeg {
    pub fn profit_per_gas(&self) -> ethers::types::I256 {
        if self.gas_limit.is_zero() {
            return ethers::types::I256::zero();
        }
        let gas = ethers::types::I256::try_from(self.gas_limit).unwrap_or(ethers::types::I256::MAX);
        self.profit / gas
    }
}
