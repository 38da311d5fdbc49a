//! Transaction ordering rules (spec.md §4.6 step 2): fixed shape for sandwich/JIT,
//! profit-per-gas descending for arbitrage, single front-run leg before the victim.

use crate::leg::TxLeg;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Arbitrage,
    FrontRun,
    SandwichOrJit,
}

/// Orders `legs` in place per `kind`. Sandwich/JIT legs are expected to already carry
/// the victim reference on the middle leg; this function only sorts arbitrage legs
/// (by profit-per-gas descending) and leaves fixed-shape families untouched.
pub fn order_legs(kind: ShapeKind, mut legs: Vec<TxLeg>) -> Vec<TxLeg> {
    match kind {
        ShapeKind::Arbitrage => {
            legs.sort_by(|a, b| b.profit_per_gas().cmp(&a.profit_per_gas()));
            legs
        }
        ShapeKind::FrontRun | ShapeKind::SandwichOrJit => legs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::types::{Address, Bytes, U256};

    fn leg(profit: i64, gas: u64) -> TxLeg {
        TxLeg {
            to: Address::zero(),
            data: Bytes::default(),
            value: U256::zero(),
            gas_limit: U256::from(gas),
            max_fee_hint: U256::zero(),
            profit: ethers::types::I256::from(profit),
            victim_hash: None,
        }
    }

    #[test]
    fn arbitrage_legs_sort_by_profit_per_gas_descending() {
        let legs = vec![leg(10, 100), leg(50, 100), leg(20, 100)];
        let ordered = order_legs(ShapeKind::Arbitrage, legs);
        assert_eq!(ordered[0].profit, ethers::types::I256::from(50));
        assert_eq!(ordered[2].profit, ethers::types::I256::from(10));
    }

    #[test]
    fn sandwich_legs_keep_their_original_order() {
        let legs = vec![leg(1, 100), leg(99, 100), leg(1, 100)];
        let ordered = order_legs(ShapeKind::SandwichOrJit, legs);
        assert_eq!(ordered[1].profit, ethers::types::I256::from(99));
    }
}
