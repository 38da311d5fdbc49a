//! Resource and network sampling inputs for the monitor task's periodic health check
//! (spec.md §4.9, default 60s cadence). Kept as traits so a real implementation (reading
//! `/proc`, an RPC's last-block timestamp) can be swapped in without touching the
//! scheduler; `MockResourceProbe`/`MockNetworkProbe` are deterministic test doubles.

use async_trait::async_trait;
use ethers::types::U256;

use ambush_metrics::health::{NetworkSample, ResourceSample};

#[async_trait]
pub trait ResourceProbe: Send + Sync {
    async fn sample(&self) -> ResourceSample;
}

#[async_trait]
pub trait NetworkProbe: Send + Sync {
    async fn sample(&self, base_fee: U256, last_block_age_secs: i64) -> NetworkSample;
}

pub struct MockResourceProbe {
    pub cpu_pct: f64,
    pub ram_pct: f64,
    pub disk_pct: f64,
}

impl Default for MockResourceProbe {
    fn default() -> Self {
        Self { cpu_pct: 10.0, ram_pct: 10.0, disk_pct: 10.0 }
    }
}

#[async_trait]
impl ResourceProbe for MockResourceProbe {
    async fn sample(&self) -> ResourceSample {
        ResourceSample { cpu_pct: self.cpu_pct, ram_pct: self.ram_pct, disk_pct: self.disk_pct, sampled_at: chrono::Utc::now() }
    }
}

#[derive(Default)]
pub struct MockNetworkProbe;

#[async_trait]
impl NetworkProbe for MockNetworkProbe {
    async fn sample(&self, base_fee: U256, last_block_age_secs: i64) -> NetworkSample {
        NetworkSample {
            base_fee_gwei: (base_fee / U256::from(1_000_000_000u64)).low_u64(),
            last_block_at: chrono::Utc::now() - chrono::Duration::seconds(last_block_age_secs),
        }
    }
}
