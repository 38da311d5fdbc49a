//! `SafetySupervisor`: the single source of truth for every breaker (spec.md §9
//! REDESIGN FLAGS removes the teacher's duplicate `CircuitBreaker`/`SafetyCoordinator`
//! paths in favor of this one gate). Owns the rolling safety metrics, the bounded
//! incident history risk level is replayed from, and the emergency procedure.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

use ambush_config::SafetyConfig;
use ambush_types::{EmergencyLevel, Incident, RiskLevel, SafetyMetrics};
use chrono::{DateTime, Utc};
use ethers::types::{Address, I256, U256};
use tracing::{error, warn};

use crate::breakers::{
    self, BreakerCaps, NetworkHealth, ResourceHealth, SlippageObservation, TxCandidate,
};
use crate::cancellation::TxCanceller;
use crate::emergency::EmergencyState;
use crate::notifications::NotificationSink;

const MAX_INCIDENT_HISTORY: usize = 2_000;

#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    #[error("breaker '{breaker}' tripped: {reason}")]
    BreakerTripped { breaker: &'static str, reason: String },
    #[error("supervisor already triggered: {0}")]
    AlreadyTriggered(String),
    #[error("recovery mode: strategies are disabled until the operator clears the emergency state")]
    RecoveryMode,
    #[error("failed to persist emergency state: {0}")]
    Persistence(#[from] std::io::Error),
}

pub struct SafetySupervisor {
    metrics: SafetyMetrics,
    caps: BreakerCaps,
    incidents: VecDeque<Incident>,
    sinks: Vec<Arc<dyn NotificationSink>>,
    canceller: Option<Arc<dyn TxCanceller>>,
    state_path: Option<PathBuf>,
    recovery_mode: bool,
    pending_emergency: bool,
}

impl SafetySupervisor {
    pub fn new(caps: BreakerCaps, sinks: Vec<Arc<dyn NotificationSink>>, state_path: Option<PathBuf>) -> Self {
        Self {
            metrics: SafetyMetrics::default(),
            caps,
            incidents: VecDeque::new(),
            sinks,
            canceller: None,
            state_path,
            recovery_mode: false,
            pending_emergency: false,
        }
    }

    pub fn with_canceller(mut self, canceller: Arc<dyn TxCanceller>) -> Self {
        self.canceller = Some(canceller);
        self
    }

    /// Start-up path: a non-empty emergency-state file puts the system in recovery
    /// mode (spec.md §6, §8 scenario S5).
    pub fn boot(
        caps: BreakerCaps,
        sinks: Vec<Arc<dyn NotificationSink>>,
        state_path: Option<PathBuf>,
    ) -> Result<Self, SupervisorError> {
        let mut supervisor = Self::new(caps, sinks, state_path.clone());
        if let Some(path) = &state_path {
            if let Some(state) = EmergencyState::load(path)? {
                if state.shutdown_triggered {
                    supervisor.recovery_mode = true;
                    supervisor.metrics.triggered = true;
                    supervisor.metrics.trigger_reason =
                        Some("recovered from persisted emergency state".to_string());
                }
            }
        }
        Ok(supervisor)
    }

    pub fn is_triggered(&self) -> bool {
        self.metrics.triggered
    }

    pub fn is_recovery_mode(&self) -> bool {
        self.recovery_mode
    }

    pub fn metrics(&self) -> &SafetyMetrics {
        &self.metrics
    }

    pub fn caps(&self) -> &BreakerCaps {
        &self.caps
    }

    /// Testable Property 8: pure function of the ordered incident history.
    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_incidents(&self.incidents)
    }

    pub fn record_incident(&mut self, level: EmergencyLevel, reason: impl Into<String>, at: DateTime<Utc>) {
        if self.incidents.len() >= MAX_INCIDENT_HISTORY {
            self.incidents.pop_front();
        }
        self.incidents.push_back(Incident { level, reason: reason.into(), at });
    }

    /// Sets the triggered flag and returns whether this call is the one that flipped
    /// it (vs. an already-triggered supervisor tripping a second breaker), so callers
    /// know whether to run the emergency procedure.
    fn trigger(&mut self, reason: String) -> bool {
        let was_triggered = self.metrics.triggered;
        self.metrics.triggered = true;
        self.metrics.trigger_reason = Some(reason);
        !was_triggered
    }

    /// Gates `validate_tx`/`submit`/`strategy start` (spec.md §4.8): fails fast if
    /// already triggered or in recovery mode, otherwise evaluates the transaction
    /// breakers in table order.
    pub fn validate_tx(&mut self, tx: &TxCandidate, now: DateTime<Utc>) -> Result<(), SupervisorError> {
        if self.recovery_mode {
            return Err(SupervisorError::RecoveryMode);
        }
        if self.metrics.triggered {
            let reason = self.metrics.trigger_reason.clone().unwrap_or_default();
            return Err(SupervisorError::AlreadyTriggered(reason));
        }

        if let Some(trip) = breakers::check_tx_breakers(&self.metrics, &self.caps, tx, now) {
            warn!(breaker = trip.breaker, reason = %trip.reason, "safety breaker tripped");
            self.record_incident(EmergencyLevel::Warning, trip.reason.clone(), now);
            if self.trigger(trip.reason.clone()) {
                self.pending_emergency = true;
            }
            return Err(SupervisorError::BreakerTripped { breaker: trip.breaker, reason: trip.reason });
        }

        Ok(())
    }

    /// Called once a submission has actually gone out, updating the rolling counters
    /// the next `validate_tx` call reads.
    pub fn record_submission(&mut self, tx: &TxCandidate, now: DateTime<Utc>) {
        self.metrics.rolling_position_size = self.metrics.rolling_position_size.saturating_add(tx.value);
        self.metrics.rolling_gas_spend = self.metrics.rolling_gas_spend.saturating_add(tx.gas_cost);
        self.metrics.record_submit(now);
        self.metrics.evict_expired_submits(now, self.caps.tx_rate_window);
    }

    pub fn record_pnl(&mut self, realized: ethers::types::I256) {
        let signed = if realized.is_negative() {
            ambush_types::SignedAmount::negative(realized.unsigned_abs())
        } else {
            ambush_types::SignedAmount::positive(realized.into_raw())
        };
        if let Some(updated) = self.metrics.rolling_pnl.checked_add(signed) {
            self.metrics.rolling_pnl = updated;
        }
    }

    pub fn check_slippage(&mut self, obs: &SlippageObservation, now: DateTime<Utc>) -> Result<(), SupervisorError> {
        if let Some(trip) = breakers::check_slippage(obs, self.caps.max_slippage_bps) {
            self.record_incident(EmergencyLevel::Warning, trip.reason.clone(), now);
            if self.trigger(trip.reason.clone()) {
                self.pending_emergency = true;
            }
            return Err(SupervisorError::BreakerTripped { breaker: trip.breaker, reason: trip.reason });
        }
        Ok(())
    }

    pub fn check_daily_loss(&mut self, cap: U256, now: DateTime<Utc>) -> Result<(), SupervisorError> {
        if let Some(trip) = breakers::check_daily_loss(&self.metrics, cap) {
            self.record_incident(EmergencyLevel::Critical, trip.reason.clone(), now);
            if self.trigger(trip.reason.clone()) {
                self.pending_emergency = true;
            }
            return Err(SupervisorError::BreakerTripped { breaker: trip.breaker, reason: trip.reason });
        }
        Ok(())
    }

    /// Monitor task's periodic health check (spec.md §4.9, default 60s cadence).
    pub fn check_health(
        &mut self,
        resource: &ResourceHealth,
        network: &NetworkHealth,
        now: DateTime<Utc>,
    ) -> Result<(), SupervisorError> {
        if let Some(trip) = breakers::check_resource(resource).or_else(|| breakers::check_network(network)) {
            self.record_incident(EmergencyLevel::Warning, trip.reason.clone(), now);
            if self.trigger(trip.reason.clone()) {
                self.pending_emergency = true;
            }
            return Err(SupervisorError::BreakerTripped { breaker: trip.breaker, reason: trip.reason });
        }
        Ok(())
    }

    /// Whether a breaker has tripped since the last call to `emergency_procedure`.
    /// The core actor polls this after every gated operation and runs the procedure
    /// exactly once per fresh trip, not once per breaker re-check.
    pub fn take_pending_emergency(&mut self) -> bool {
        std::mem::replace(&mut self.pending_emergency, false)
    }

    /// Fires notifications, attempts to cancel each outstanding bundle's transactions
    /// by rebroadcasting a self-pay at 150% of their gas price (best-effort, via the
    /// external `TxCanceller`), and persists the emergency state file — spec.md §4.8's
    /// three-step emergency procedure, run once per fresh trigger.
    pub async fn emergency_procedure(&mut self, outstanding: Vec<(String, U256)>, now: DateTime<Utc>) {
        let reason = self.metrics.trigger_reason.clone().unwrap_or_else(|| "unspecified".to_string());
        let level = if self.risk_level() == RiskLevel::High { EmergencyLevel::Critical } else { EmergencyLevel::Warning };

        for sink in &self.sinks {
            if let Err(err) = sink.notify(level, &reason).await {
                error!(error = %err, "failed to deliver emergency notification");
            }
        }

        let mut cancelled_bundle_ids = Vec::new();
        if let Some(canceller) = &self.canceller {
            for (bundle_id, gas_price) in &outstanding {
                match canceller.cancel(bundle_id, *gas_price).await {
                    Ok(()) => cancelled_bundle_ids.push(bundle_id.clone()),
                    Err(err) => error!(error = %err, bundle_id, "failed to rebroadcast cancellation"),
                }
            }
        }

        if let Some(path) = &self.state_path {
            let pending_bundle_ids = outstanding.into_iter().map(|(id, _)| id).collect();
            let state = EmergencyState::new(pending_bundle_ids, cancelled_bundle_ids, now);
            if let Err(err) = state.save(path) {
                error!(error = %err, "failed to persist emergency state");
            }
        }
    }

    /// Explicit reset: clears `triggered` and recovery mode. Idempotent (spec.md §8:
    /// "resetting twice... has the same effect as resetting once").
    pub fn reset(&mut self) {
        self.metrics.triggered = false;
        self.metrics.trigger_reason = None;
        self.recovery_mode = false;
    }

    /// Daily reset: zeroes rolling counters, preserves `triggered` (spec.md §3).
    /// Idempotent within the same interval.
    pub fn daily_reset(&mut self) {
        self.metrics.reset_daily();
    }
}

impl From<&SafetyConfig> for BreakerCaps {
    fn from(cfg: &SafetyConfig) -> Self {
        BreakerCaps {
            min_profit: I256::from_raw(U256::from(cfg.min_profit)),
            max_gas_price: U256::from(cfg.max_gas_price_gwei).saturating_mul(U256::from(1_000_000_000u64)),
            max_position_size: U256::from(cfg.max_position_size),
            max_daily_gas_spend: U256::from(cfg.max_daily_gas_spend),
            max_daily_loss: U256::from(cfg.max_daily_loss),
            tx_rate_window: chrono::Duration::seconds(cfg.tx_rate_window_secs as i64),
            max_tx_per_window: cfg.max_tx_per_window,
            max_slippage_bps: cfg.max_slippage_bps,
            contract_whitelist: cfg.contract_whitelist.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::MockNotificationSink;

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
    fn trigger_blocks_all_further_validation_until_reset() {
        let mut sup = SafetySupervisor::new(caps(), vec![], None);
        let mut bad_tx = candidate();
        bad_tx.gas_price = U256::from(200_000_000_000u64);

        assert!(sup.validate_tx(&bad_tx, Utc::now()).is_err());
        assert!(sup.is_triggered());
        assert!(sup.validate_tx(&candidate(), Utc::now()).is_err());

        sup.reset();
        assert!(!sup.is_triggered());
        assert!(sup.validate_tx(&candidate(), Utc::now()).is_ok());
    }

    #[test]
    fn reset_twice_is_the_same_as_once() {
        let mut sup = SafetySupervisor::new(caps(), vec![], None);
        sup.reset();
        sup.reset();
        assert!(!sup.is_triggered());
    }

    #[test]
    fn daily_reset_preserves_triggered_flag() {
        let mut sup = SafetySupervisor::new(caps(), vec![], None);
        let mut bad_tx = candidate();
        bad_tx.gas_price = U256::from(200_000_000_000u64);
        let _ = sup.validate_tx(&bad_tx, Utc::now());
        sup.daily_reset();
        assert!(sup.is_triggered());
    }

    #[tokio::test]
    async fn emergency_procedure_notifies_configured_sinks() {
        let sink = Arc::new(MockNotificationSink::new());
        let mut sup = SafetySupervisor::new(caps(), vec![sink.clone()], None);
        let mut bad_tx = candidate();
        bad_tx.gas_price = U256::from(200_000_000_000u64);
        let _ = sup.validate_tx(&bad_tx, Utc::now());

        sup.emergency_procedure(vec![("bundle-1".into(), U256::from(10_000_000_000u64))], Utc::now()).await;
        assert_eq!(sink.sent().len(), 1);
    }

    #[tokio::test]
    async fn emergency_procedure_attempts_cancellation_through_the_canceller() {
        let canceller = Arc::new(crate::cancellation::MockTxCanceller::new());
        let mut sup = SafetySupervisor::new(caps(), vec![], None).with_canceller(canceller.clone());
        let mut bad_tx = candidate();
        bad_tx.gas_price = U256::from(200_000_000_000u64);
        let _ = sup.validate_tx(&bad_tx, Utc::now());
        assert!(sup.take_pending_emergency());

        sup.emergency_procedure(vec![("bundle-1".into(), U256::from(10_000_000_000u64))], Utc::now()).await;
        assert_eq!(canceller.attempts(), vec![("bundle-1".to_string(), U256::from(15_000_000_000u64))]);
    }

    #[test]
    fn pending_emergency_is_cleared_after_being_taken() {
        let mut sup = SafetySupervisor::new(caps(), vec![], None);
        let mut bad_tx = candidate();
        bad_tx.gas_price = U256::from(200_000_000_000u64);
        let _ = sup.validate_tx(&bad_tx, Utc::now());
        assert!(sup.take_pending_emergency());
        assert!(!sup.take_pending_emergency());
    }
}
