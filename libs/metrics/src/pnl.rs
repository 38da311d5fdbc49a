//! PnL tracking (C10), wrapping `ambush_types::SignedAmount` the same way the supervisor's
//! `SafetyMetrics.rolling_pnl` does, but accumulating an unbounded lifetime total alongside
//! the supervisor's rolling daily figure.

use ambush_types::SignedAmount;

pub struct PnlTracker {
    lifetime: SignedAmount,
    trade_count: u64,
}

impl PnlTracker {
    pub fn new() -> Self {
        Self { lifetime: SignedAmount::ZERO, trade_count: 0 }
    }

    /// Records a realized trade outcome. Saturates rather than panicking on overflow,
    /// since a stuck counter is preferable to a crashed supervisor loop.
    pub fn record(&mut self, realized: SignedAmount) {
        self.lifetime = self.lifetime.checked_add(realized).unwrap_or(self.lifetime);
        self.trade_count += 1;
    }

    pub fn lifetime_pnl(&self) -> SignedAmount {
        self.lifetime
    }

    pub fn trade_count(&self) -> u64 {
        self.trade_count
    }

    pub fn is_profitable(&self) -> bool {
        !self.lifetime.is_negative()
    }
}

impl Default for PnlTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::types::U256;

    #[test]
    fn accumulates_across_trades() {
        let mut t = PnlTracker::new();
        t.record(SignedAmount::positive(U256::from(100)));
        t.record(SignedAmount::negative(U256::from(40)));
        assert_eq!(t.lifetime_pnl(), SignedAmount::positive(U256::from(60)));
        assert_eq!(t.trade_count(), 2);
    }

    #[test]
    fn fresh_tracker_is_profitable_at_zero() {
        assert!(PnlTracker::new().is_profitable());
    }

    #[test]
    fn net_loss_is_not_profitable() {
        let mut t = PnlTracker::new();
        t.record(SignedAmount::negative(U256::from(1)));
        assert!(!t.is_profitable());
    }
}
