//! Signed 256-bit monetary amounts.
//!
//! `ethers::types::U256` (an alias of `primitive-types::U256`) is unsigned, but the
//! safety supervisor needs a signed rolling PnL figure that still carries wei-scale
//! precision rather than collapsing to `f64`. `SignedAmount` is a sign bit plus a
//! `U256` magnitude — native integer arithmetic for the monetary quantity, per the
//! rewrite's "no floating point for wei-sized magnitudes" rule.

use ethers::types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A signed quantity of wei, backed by 256-bit unsigned magnitude + sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedAmount {
    negative: bool,
    magnitude: U256,
}

impl SignedAmount {
    pub const ZERO: SignedAmount = SignedAmount { negative: false, magnitude: U256::zero() };

    pub fn positive(magnitude: U256) -> Self {
        Self { negative: false, magnitude }
    }

    pub fn negative(magnitude: U256) -> Self {
        if magnitude.is_zero() {
            Self::ZERO
        } else {
            Self { negative: true, magnitude }
        }
    }

    pub fn is_zero(&self) -> bool {
        self.magnitude.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.negative && !self.magnitude.is_zero()
    }

    /// True when this amount is at or below `-cap` (cap given as an unsigned magnitude).
    pub fn at_or_below_negative(&self, cap: U256) -> bool {
        self.is_negative() && self.magnitude >= cap
    }

    pub fn magnitude(&self) -> U256 {
        self.magnitude
    }

    pub fn checked_add(self, rhs: SignedAmount) -> Option<SignedAmount> {
        match (self.negative, rhs.negative) {
            (false, false) => self.magnitude.checked_add(rhs.magnitude).map(Self::positive),
            (true, true) => self.magnitude.checked_add(rhs.magnitude).map(Self::negative),
            (false, true) => Some(if self.magnitude >= rhs.magnitude {
                Self::positive(self.magnitude - rhs.magnitude)
            } else {
                Self::negative(rhs.magnitude - self.magnitude)
            }),
            (true, false) => Some(if rhs.magnitude >= self.magnitude {
                Self::positive(rhs.magnitude - self.magnitude)
            } else {
                Self::negative(self.magnitude - rhs.magnitude)
            }),
        }
    }
}

impl Default for SignedAmount {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for SignedAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            write!(f, "-{}", self.magnitude)
        } else {
            write!(f, "{}", self.magnitude)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_opposite_signs_cancels_toward_zero() {
        let a = SignedAmount::positive(U256::from(100));
        let b = SignedAmount::negative(U256::from(40));
        assert_eq!(a.checked_add(b).unwrap(), SignedAmount::positive(U256::from(60)));
    }

    #[test]
    fn negative_of_zero_is_not_negative() {
        assert!(!SignedAmount::negative(U256::zero()).is_negative());
    }

    #[test]
    fn at_or_below_negative_cap() {
        let pnl = SignedAmount::negative(U256::from(1_000u64));
        assert!(pnl.at_or_below_negative(U256::from(1_000u64)));
        assert!(pnl.at_or_below_negative(U256::from(900u64)));
        assert!(!pnl.at_or_below_negative(U256::from(1_100u64)));
    }
}
