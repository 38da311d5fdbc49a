//! Resource and network health sampling (C10), consumed by the monitor task (C9) and
//! translated into the supervisor's (C8) `ResourceHealth`/`NetworkHealth` breaker inputs.
//! Kept independent of `ambush-supervisor` so C10 has no opinion on breaker thresholds.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy)]
pub struct ResourceSample {
    pub cpu_pct: f64,
    pub ram_pct: f64,
    pub disk_pct: f64,
    pub sampled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
pub struct NetworkSample {
    pub base_fee_gwei: u64,
    pub last_block_at: DateTime<Utc>,
}

pub struct HealthSampler {
    last_resource: Option<ResourceSample>,
    last_network: Option<NetworkSample>,
}

impl HealthSampler {
    pub fn new() -> Self {
        Self { last_resource: None, last_network: None }
    }

    pub fn record_resource(&mut self, sample: ResourceSample) {
        self.last_resource = Some(sample);
    }

    pub fn record_network(&mut self, sample: NetworkSample) {
        self.last_network = Some(sample);
    }

    pub fn last_resource(&self) -> Option<ResourceSample> {
        self.last_resource
    }

    pub fn last_network(&self) -> Option<NetworkSample> {
        self.last_network
    }
}

impl Default for HealthSampler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_most_recent_sample() {
        let mut s = HealthSampler::new();
        assert!(s.last_resource().is_none());
        s.record_resource(ResourceSample { cpu_pct: 42.0, ram_pct: 10.0, disk_pct: 5.0, sampled_at: Utc::now() });
        assert_eq!(s.last_resource().unwrap().cpu_pct, 42.0);
    }
}
