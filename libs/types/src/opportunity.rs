//! Opportunities emitted by strategies (C4) and consumed by the bundle builder (C6).

use ethers::types::{Address, H256, U256};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyKind {
    Arbitrage,
    FrontRun,
    Sandwich,
    JitLiquidity,
    NewPoolSniper,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opportunity {
    pub strategy: StrategyKind,
    pub path: Vec<Address>,
    pub principal: U256,
    pub currency: Address,
    pub expected_gross: U256,
    pub expected_gas_cost: U256,
    /// Fixed-point success probability in [0, 1_000_000] (parts-per-million), avoiding
    /// a float field on a type that otherwise carries only integer monetary quantities.
    pub success_probability_ppm: u32,
    pub requires_loan: bool,
    pub observed_at_block: u64,
    /// Set for front-run/sandwich/JIT, which race a specific pending transaction;
    /// `None` for arbitrage and the new-pool sniper, which reference no victim.
    pub victim_hash: Option<H256>,
}

impl Opportunity {
    pub fn expected_net(&self) -> ethers::types::I256 {
        ethers::types::I256::try_from(self.expected_gross).unwrap_or(ethers::types::I256::MAX)
            - ethers::types::I256::try_from(self.expected_gas_cost).unwrap_or(ethers::types::I256::MAX)
    }

    /// Stale once any pool along `path` has advanced past `observed_at_block`.
    pub fn is_stale(&self, current_block: u64) -> bool {
        current_block > self.observed_at_block
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opp(gross: u64, gas_cost: u64) -> Opportunity {
        Opportunity {
            strategy: StrategyKind::Arbitrage,
            path: vec![Address::from_low_u64_be(1), Address::from_low_u64_be(2)],
            principal: U256::from(1_000u64),
            currency: Address::from_low_u64_be(9),
            expected_gross: U256::from(gross),
            expected_gas_cost: U256::from(gas_cost),
            success_probability_ppm: 800_000,
            requires_loan: false,
            observed_at_block: 100,
            victim_hash: None,
        }
    }

    #[test]
    fn expected_net_can_be_negative() {
        let o = opp(100, 500);
        assert!(o.expected_net().is_negative());
    }

    #[test]
    fn stale_when_block_advances() {
        let o = opp(1_000, 100);
        assert!(!o.is_stale(100));
        assert!(o.is_stale(101));
    }
}
