//! The ten independent breakers of spec.md §4.8's table. Each is a small pure
//! function over a `SafetyMetrics` snapshot and a candidate side effect — "ambiguous
//! global-state breakers" (spec.md §9 REDESIGN FLAGS) is addressed by keeping exactly
//! one evaluation path here rather than a duplicate `SafetyCoordinator`.

use ambush_types::SafetyMetrics;
use chrono::{DateTime, Utc};
use ethers::types::{Address, I256, U256};

#[derive(Debug, Clone)]
pub struct BreakerCaps {
    pub min_profit: I256,
    pub max_gas_price: U256,
    pub max_position_size: U256,
    pub max_daily_gas_spend: U256,
    pub max_daily_loss: U256,
    pub tx_rate_window: chrono::Duration,
    pub max_tx_per_window: usize,
    pub max_slippage_bps: u32,
    pub contract_whitelist: Vec<Address>,
}

/// The side effect about to be gated: a transaction the builder wants to submit, or
/// wants to include validation for before even building.
#[derive(Debug, Clone)]
pub struct TxCandidate {
    pub value: U256,
    pub gas_price: U256,
    pub gas_cost: U256,
    pub to: Option<Address>,
    pub expected_profit: I256,
}

#[derive(Debug, Clone, Copy)]
pub struct SlippageObservation {
    pub actual: U256,
    pub expected: U256,
}

#[derive(Debug, Clone, Copy)]
pub struct ResourceHealth {
    pub cpu_pct: f32,
    pub ram_pct: f32,
    pub disk_pct: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct NetworkHealth {
    pub base_fee: U256,
    pub base_fee_ceiling: U256,
    pub last_block_age_secs: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakerTrip {
    pub breaker: &'static str,
    pub reason: String,
}

fn trip(breaker: &'static str, reason: impl Into<String>) -> BreakerTrip {
    BreakerTrip { breaker, reason: reason.into() }
}

/// Evaluates the transaction-scoped breakers in table order, short-circuiting on the
/// first trip (spec.md §4.8: position-size, gas-price, daily-gas, tx-rate, min-profit,
/// contract-whitelist).
pub fn check_tx_breakers(
    metrics: &SafetyMetrics,
    caps: &BreakerCaps,
    tx: &TxCandidate,
    now: DateTime<Utc>,
) -> Option<BreakerTrip> {
    if metrics.rolling_position_size.saturating_add(tx.value) > caps.max_position_size {
        return Some(trip("position-size", "Position size cap exceeded"));
    }
    if tx.gas_price > caps.max_gas_price {
        return Some(trip("gas-price", "Gas price too high"));
    }
    if metrics.rolling_gas_spend.saturating_add(tx.gas_cost) > caps.max_daily_gas_spend {
        return Some(trip("daily-gas", "Daily gas spend cap exceeded"));
    }
    if metrics.submits_within(now, caps.tx_rate_window) >= caps.max_tx_per_window {
        return Some(trip("tx-rate", "Submission rate limit exceeded"));
    }
    if tx.expected_profit < caps.min_profit {
        return Some(trip("min-profit", "Expected profit below floor"));
    }
    if !caps.contract_whitelist.is_empty() {
        let allowed = tx.to.map(|to| caps.contract_whitelist.contains(&to)).unwrap_or(false);
        if !allowed {
            return Some(trip("contract-whitelist", "Destination contract not whitelisted"));
        }
    }
    None
}

/// |actual - expected| / expected > cap (spec.md §4.8 slippage breaker).
pub fn check_slippage(obs: &SlippageObservation, cap_bps: u32) -> Option<BreakerTrip> {
    if obs.expected.is_zero() {
        return None;
    }
    let diff = if obs.actual >= obs.expected {
        obs.actual - obs.expected
    } else {
        obs.expected - obs.actual
    };
    let ratio_bps = diff.saturating_mul(U256::from(10_000u32)) / obs.expected;
    if ratio_bps > U256::from(cap_bps) {
        Some(trip("slippage", "Simulated slippage exceeded configured cap"))
    } else {
        None
    }
}

/// rolling PnL <= -cap (spec.md §4.8 daily-loss breaker).
pub fn check_daily_loss(metrics: &SafetyMetrics, cap: U256) -> Option<BreakerTrip> {
    if metrics.rolling_pnl.at_or_below_negative(cap) {
        Some(trip("daily-loss", "Daily loss cap exceeded"))
    } else {
        None
    }
}

/// CPU>90%, RAM>90%, or disk>90% (spec.md §4.8 resource breaker).
pub fn check_resource(health: &ResourceHealth) -> Option<BreakerTrip> {
    if health.cpu_pct > 90.0 {
        Some(trip("resource", "CPU utilization above 90%"))
    } else if health.ram_pct > 90.0 {
        Some(trip("resource", "RAM utilization above 90%"))
    } else if health.disk_pct > 90.0 {
        Some(trip("resource", "Disk utilization above 90%"))
    } else {
        None
    }
}

/// base-fee above ceiling, or last-block age > 60s (spec.md §4.8 network breaker).
pub fn check_network(health: &NetworkHealth) -> Option<BreakerTrip> {
    if health.base_fee > health.base_fee_ceiling {
        Some(trip("network", "Observed base fee above ceiling"))
    } else if health.last_block_age_secs > 60 {
        Some(trip("network", "No new block observed in over 60 seconds"))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps() -> BreakerCaps {
        BreakerCaps {
            min_profit: I256::zero(),
            max_gas_price: U256::from(100_000_000_000u64),
            max_position_size: U256::from(1_000_000u64),
            max_daily_gas_spend: U256::from(1_000_000u64),
            max_daily_loss: U256::from(1_000_000u64),
            tx_rate_window: chrono::Duration::seconds(1),
            max_tx_per_window: 2,
            max_slippage_bps: 1_000,
            contract_whitelist: Vec::new(),
        }
    }

    fn candidate() -> TxCandidate {
        TxCandidate {
            value: U256::from(100u64),
            gas_price: U256::from(10_000_000_000u64),
            gas_cost: U256::from(21_000u64),
            to: Some(Address::from_low_u64_be(1)),
            expected_profit: I256::from(10),
        }
    }

    #[test]
    fn gas_price_breaker_trips_with_documented_reason() {
        let mut tx = candidate();
        tx.gas_price = U256::from(120_000_000_000u64);
        let trip = check_tx_breakers(&SafetyMetrics::default(), &caps(), &tx, Utc::now()).unwrap();
        assert_eq!(trip.breaker, "gas-price");
        assert_eq!(trip.reason, "Gas price too high");
    }

    #[test]
    fn clean_tx_trips_nothing() {
        assert!(check_tx_breakers(&SafetyMetrics::default(), &caps(), &candidate(), Utc::now()).is_none());
    }

    #[test]
    fn tx_rate_breaker_trips_after_window_fills() {
        let mut metrics = SafetyMetrics::default();
        let now = Utc::now();
        metrics.record_submit(now);
        metrics.record_submit(now);
        let trip = check_tx_breakers(&metrics, &caps(), &candidate(), now).unwrap();
        assert_eq!(trip.breaker, "tx-rate");
    }

    #[test]
    fn whitelist_breaker_trips_when_destination_absent() {
        let mut c = caps();
        c.contract_whitelist = vec![Address::from_low_u64_be(99)];
        let trip = check_tx_breakers(&SafetyMetrics::default(), &c, &candidate(), Utc::now()).unwrap();
        assert_eq!(trip.breaker, "contract-whitelist");
    }

    #[test]
    fn slippage_breaker_trips_beyond_cap() {
        let obs = SlippageObservation { actual: U256::from(80u64), expected: U256::from(100u64) };
        assert!(check_slippage(&obs, 1_000).is_some());
        let within = SlippageObservation { actual: U256::from(99u64), expected: U256::from(100u64) };
        assert!(check_slippage(&within, 1_000).is_none());
    }

    #[test]
    fn resource_breaker_trips_above_90_percent() {
        let health = ResourceHealth { cpu_pct: 95.0, ram_pct: 10.0, disk_pct: 10.0 };
        assert!(check_resource(&health).is_some());
    }

    #[test]
    fn network_breaker_trips_on_stale_block() {
        let health = NetworkHealth {
            base_fee: U256::from(10u64),
            base_fee_ceiling: U256::from(1_000u64),
            last_block_age_secs: 61,
        };
        assert!(check_network(&health).is_some());
    }
}
