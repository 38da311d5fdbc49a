//! Ties per-hop latency windows, per-strategy success rates, PnL, and health sampling
//! into a single collector, with a `publish` method pushing into the `metrics` facade
//! crate for the Prometheus exporter. Grounded in the teacher's `executor.rs`, which
//! accumulates `ExecutionResult`s per strategy and flushes them to its own metrics sink.

use std::collections::HashMap;
use std::time::Duration;

use crate::health::HealthSampler;
use crate::latency::LatencyWindow;
use crate::pnl::PnlTracker;
use crate::success_rate::SuccessRateWindow;

const DEFAULT_WINDOW_CAPACITY: usize = 256;

pub struct MetricsRegistry {
    latencies: HashMap<String, LatencyWindow>,
    success_rates: HashMap<String, SuccessRateWindow>,
    pnl: PnlTracker,
    health: HealthSampler,
    window_capacity: usize,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::with_window_capacity(DEFAULT_WINDOW_CAPACITY)
    }

    pub fn with_window_capacity(window_capacity: usize) -> Self {
        Self {
            latencies: HashMap::new(),
            success_rates: HashMap::new(),
            pnl: PnlTracker::new(),
            health: HealthSampler::new(),
            window_capacity,
        }
    }

    pub fn record_latency(&mut self, hop: &str, sample: Duration) {
        self.latencies
            .entry(hop.to_string())
            .or_insert_with(|| LatencyWindow::new(self.window_capacity))
            .record(sample);
        metrics::histogram!("ambush_latency_seconds", "hop" => hop.to_string()).record(sample.as_secs_f64());
    }

    pub fn record_outcome(&mut self, strategy: &str, succeeded: bool) {
        self.success_rates
            .entry(strategy.to_string())
            .or_insert_with(|| SuccessRateWindow::new(self.window_capacity))
            .record(succeeded);
        metrics::counter!(
            "ambush_strategy_outcomes_total",
            "strategy" => strategy.to_string(),
            "succeeded" => succeeded.to_string()
        )
        .increment(1);
    }

    pub fn record_pnl(&mut self, realized: ambush_types::SignedAmount) {
        self.pnl.record(realized);
        let signed = if realized.is_negative() { -1.0 } else { 1.0 };
        metrics::gauge!("ambush_pnl_lifetime_sign").set(signed);
    }

    pub fn pnl(&self) -> &PnlTracker {
        &self.pnl
    }

    pub fn health_mut(&mut self) -> &mut HealthSampler {
        &mut self.health
    }

    pub fn health(&self) -> &HealthSampler {
        &self.health
    }

    pub fn latency_window(&self, hop: &str) -> Option<&LatencyWindow> {
        self.latencies.get(hop)
    }

    pub fn success_rate_window(&self, strategy: &str) -> Option<&SuccessRateWindow> {
        self.success_rates.get(strategy)
    }

    /// Publishes current gauge snapshots (beyond the counters/histograms already pushed
    /// incrementally by `record_*`) — called from the monitor task's periodic tick.
    pub fn publish_snapshot(&self) {
        for (hop, window) in &self.latencies {
            metrics::gauge!("ambush_latency_p99_seconds", "hop" => hop.clone()).set(window.p99().as_secs_f64());
        }
        for (strategy, window) in &self.success_rates {
            metrics::gauge!("ambush_success_rate_ppm", "strategy" => strategy.clone()).set(window.rate_ppm() as f64);
        }
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}
