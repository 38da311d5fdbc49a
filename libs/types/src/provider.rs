//! Flash-loan venue snapshots (C5).

use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VenueId {
    Aave,
    DyDx,
    Balancer,
    UniswapV3,
}

impl VenueId {
    /// Flat fee fraction charged by each venue, expressed in basis points of the
    /// principal. Union of providers from the system's fee table: AAVE 9bps,
    /// dYdX 0bps, Balancer 1bp, Uniswap 5bps.
    pub fn fee_bps(&self) -> u32 {
        match self {
            VenueId::Aave => 9,
            VenueId::DyDx => 0,
            VenueId::Balancer => 1,
            VenueId::UniswapV3 => 5,
        }
    }

    /// Stable alphabetic ordering used to break fee ties deterministically.
    pub fn tie_break_key(&self) -> &'static str {
        match self {
            VenueId::Aave => "aave",
            VenueId::Balancer => "balancer",
            VenueId::DyDx => "dydx",
            VenueId::UniswapV3 => "uniswap_v3",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSnapshot {
    pub venue: VenueId,
    pub venue_address: Address,
    pub current_liquidity: U256,
    pub max_loanable: U256,
    pub fee_bps: u32,
    pub observed_at_block: u64,
}

impl ProviderSnapshot {
    /// Builds a snapshot enforcing `max_loanable <= current_liquidity * policy` where
    /// `policy_bps` expresses the policy multiple in basis points (e.g. 9000 = 90%).
    pub fn new(
        venue: VenueId,
        venue_address: Address,
        current_liquidity: U256,
        policy_bps: u32,
        observed_at_block: u64,
    ) -> Self {
        let max_loanable = current_liquidity.saturating_mul(U256::from(policy_bps)) / U256::from(10_000u32);
        Self {
            venue,
            venue_address,
            current_liquidity,
            max_loanable,
            fee_bps: venue.fee_bps(),
            observed_at_block,
        }
    }

    pub fn can_loan(&self, amount: U256) -> bool {
        amount <= self.max_loanable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_loanable_respects_policy_multiple() {
        let snap = ProviderSnapshot::new(
            VenueId::Aave,
            Address::from_low_u64_be(1),
            U256::from(1_000_000u64),
            9_000,
            10,
        );
        assert_eq!(snap.max_loanable, U256::from(900_000u64));
        assert!(snap.can_loan(U256::from(900_000u64)));
        assert!(!snap.can_loan(U256::from(900_001u64)));
    }

    #[test]
    fn fee_table_matches_documented_values() {
        assert_eq!(VenueId::Aave.fee_bps(), 9);
        assert_eq!(VenueId::DyDx.fee_bps(), 0);
        assert_eq!(VenueId::Balancer.fee_bps(), 1);
        assert_eq!(VenueId::UniswapV3.fee_bps(), 5);
    }
}
