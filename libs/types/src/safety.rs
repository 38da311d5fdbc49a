//! Shapes shared by the safety supervisor (C8) and metrics/health (C10).

use crate::amount::SignedAmount;
use chrono::{DateTime, Utc};
use ethers::types::U256;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Severity of one incident, ordered per spec.md §7 ("Emergency levels: INFO, WARNING,
/// CRITICAL, FATAL (ordered)"). Distinct from `RiskLevel`, which is the *derived*
/// monotone projection of a whole incident history, not a per-incident severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EmergencyLevel {
    Info,
    Warning,
    Critical,
    Fatal,
}

/// The supervisor's derived risk level (spec.md §4.8 / Testable Property 8): "any
/// CRITICAL/FATAL incident -> HIGH; any WARNING -> MEDIUM; else LOW". A pure, monotone
/// projection of the ordered incident history below, not a separately-tracked flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Replays an ordered incident history into the terminal risk level. Pure function
    /// of the history, so replaying it twice reproduces the same result (Testable
    /// Property 8).
    pub fn from_incidents<'a>(incidents: impl IntoIterator<Item = &'a Incident>) -> RiskLevel {
        let mut level = RiskLevel::Low;
        for incident in incidents {
            level = level.max(match incident.level {
                EmergencyLevel::Critical | EmergencyLevel::Fatal => RiskLevel::High,
                EmergencyLevel::Warning => RiskLevel::Medium,
                EmergencyLevel::Info => RiskLevel::Low,
            });
        }
        level
    }
}

/// One entry in the supervisor's replayable incident history. Risk level is a pure
/// function of this ordered sequence, not of any separately-tracked mutable flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
    pub level: EmergencyLevel,
    pub reason: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyMetrics {
    pub rolling_position_size: U256,
    pub rolling_gas_spend: U256,
    pub rolling_pnl: SignedAmount,
    pub submit_timestamps: VecDeque<DateTime<Utc>>,
    pub triggered: bool,
    pub trigger_reason: Option<String>,
}

impl Default for SafetyMetrics {
    fn default() -> Self {
        Self {
            rolling_position_size: U256::zero(),
            rolling_gas_spend: U256::zero(),
            rolling_pnl: SignedAmount::ZERO,
            submit_timestamps: VecDeque::new(),
            triggered: false,
            trigger_reason: None,
        }
    }
}

impl SafetyMetrics {
    /// Number of submissions within `window` of `now`, for the tx-rate breaker.
    pub fn submits_within(&self, now: DateTime<Utc>, window: chrono::Duration) -> usize {
        self.submit_timestamps
            .iter()
            .filter(|&&t| now.signed_duration_since(t) <= window)
            .count()
    }

    pub fn record_submit(&mut self, at: DateTime<Utc>) {
        self.submit_timestamps.push_back(at);
    }

    /// Drops submit timestamps older than `window`, keeping the sliding window bounded.
    pub fn evict_expired_submits(&mut self, now: DateTime<Utc>, window: chrono::Duration) {
        while let Some(&front) = self.submit_timestamps.front() {
            if now.signed_duration_since(front) > window {
                self.submit_timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn reset_daily(&mut self) {
        self.rolling_position_size = U256::zero();
        self.rolling_gas_spend = U256::zero();
        self.rolling_pnl = SignedAmount::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submits_within_window_counts_only_recent() {
        let mut m = SafetyMetrics::default();
        let now = Utc::now();
        m.record_submit(now - chrono::Duration::seconds(5));
        m.record_submit(now - chrono::Duration::seconds(120));
        assert_eq!(m.submits_within(now, chrono::Duration::seconds(60)), 1);
    }

    #[test]
    fn evict_expired_submits_drops_stale_entries() {
        let mut m = SafetyMetrics::default();
        let now = Utc::now();
        m.record_submit(now - chrono::Duration::seconds(200));
        m.record_submit(now - chrono::Duration::seconds(1));
        m.evict_expired_submits(now, chrono::Duration::seconds(60));
        assert_eq!(m.submit_timestamps.len(), 1);
    }

    #[test]
    fn reset_daily_clears_rolling_counters_not_triggered_flag() {
        let mut m = SafetyMetrics::default();
        m.rolling_gas_spend = U256::from(500u64);
        m.triggered = true;
        m.reset_daily();
        assert_eq!(m.rolling_gas_spend, U256::zero());
        assert!(m.triggered);
    }

    #[test]
    fn risk_level_ordering_places_high_above_medium_above_low() {
        assert!(RiskLevel::High > RiskLevel::Medium);
        assert!(RiskLevel::Medium > RiskLevel::Low);
    }

    fn incident(level: EmergencyLevel) -> Incident {
        Incident { level, reason: "test".into(), at: Utc::now() }
    }

    #[test]
    fn risk_level_is_pure_function_of_incident_history() {
        let history = vec![incident(EmergencyLevel::Info), incident(EmergencyLevel::Warning)];
        assert_eq!(RiskLevel::from_incidents(&history), RiskLevel::Medium);
        // Replaying the same history twice reproduces the same terminal level.
        assert_eq!(RiskLevel::from_incidents(&history), RiskLevel::from_incidents(&history));
    }

    #[test]
    fn critical_or_fatal_incident_escalates_to_high() {
        let history = vec![incident(EmergencyLevel::Warning), incident(EmergencyLevel::Critical)];
        assert_eq!(RiskLevel::from_incidents(&history), RiskLevel::High);
    }

    #[test]
    fn empty_history_is_low_risk() {
        assert_eq!(RiskLevel::from_incidents(&[]), RiskLevel::Low);
    }
}
