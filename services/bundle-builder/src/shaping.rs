//! Gas shaping (spec.md §4.6 step 3): `max_fee = max(base_fee * 1.2, hint)`,
//! `priority_fee = max_fee * 0.1`, optionally overridden by an installed bid predictor
//! clamped to [1 gwei, 100 gwei].

use ethers::types::U256;

const ONE_GWEI: u64 = 1_000_000_000;
const HUNDRED_GWEI: u64 = 100 * ONE_GWEI;

/// Predicts a priority fee for a leg, overriding the default 10%-of-max-fee rule when
/// installed. Kept as a trait so the binary can swap in a learned predictor later
/// without touching the shaping rule itself.
pub trait BidPredictor: Send + Sync {
    fn predict_priority_fee(&self, base_fee: U256, gas_limit: U256) -> U256;
}

#[derive(Debug, Clone, Copy)]
pub struct GasShape {
    pub max_fee: U256,
    pub priority_fee: U256,
}

pub fn shape_gas(base_fee: U256, max_fee_hint: U256, gas_limit: U256, predictor: Option<&dyn BidPredictor>) -> GasShape {
    let base_floor = base_fee.saturating_mul(U256::from(12u8)) / U256::from(10u8);
    let max_fee = base_floor.max(max_fee_hint);

    let priority_fee = match predictor {
        Some(p) => p
            .predict_priority_fee(base_fee, gas_limit)
            .clamp(U256::from(ONE_GWEI), U256::from(HUNDRED_GWEI)),
        None => max_fee.saturating_mul(U256::from(1u8)) / U256::from(10u8),
    };

    GasShape { max_fee, priority_fee }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_fee_takes_the_base_fee_floor_when_higher_than_hint() {
        let shape = shape_gas(U256::from(100u64), U256::from(50u64), U256::from(21_000u64), None);
        assert_eq!(shape.max_fee, U256::from(120u64));
        assert_eq!(shape.priority_fee, U256::from(12u64));
    }

    #[test]
    fn max_fee_takes_the_hint_when_higher_than_the_base_fee_floor() {
        let shape = shape_gas(U256::from(10u64), U256::from(1_000u64), U256::from(21_000u64), None);
        assert_eq!(shape.max_fee, U256::from(1_000u64));
    }

    struct FixedPredictor(U256);
    impl BidPredictor for FixedPredictor {
        fn predict_priority_fee(&self, _base_fee: U256, _gas_limit: U256) -> U256 {
            self.0
        }
    }

    #[test]
    fn predictor_output_is_clamped_to_the_allowed_band() {
        let too_low = FixedPredictor(U256::zero());
        let shape = shape_gas(U256::from(100u64), U256::from(50u64), U256::from(21_000u64), Some(&too_low));
        assert_eq!(shape.priority_fee, U256::from(ONE_GWEI));

        let too_high = FixedPredictor(U256::from(u64::MAX));
        let shape = shape_gas(U256::from(100u64), U256::from(50u64), U256::from(21_000u64), Some(&too_high));
        assert_eq!(shape.priority_fee, U256::from(HUNDRED_GWEI));
    }
}
