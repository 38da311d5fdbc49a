//! `AmbushConfig`: every key spec.md §6 recognizes, loaded from a TOML file with an
//! `AMBUSH_`-prefixed environment overlay.

use anyhow::{Context, Result};
use config_crate::{Config, Environment, File};
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One pool edge in the arbitrage connectivity graph (§6 `dexes`). `pool_address` is
/// refreshed every tick via the chain observer's pool-reserve query; `token0`/`token1`
/// fix the edge's orientation so the scheduler can build both directed `GraphEdge`s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DexConfig {
    pub name: String,
    pub pool_type: String,
    pub router_address: Address,
    pub pool_address: Address,
    pub token0: Address,
    pub token1: Address,
    pub fee_bps: u32,
}

/// One flash-loan provider the planner (C5) may quote (§6 `flashloan_venues`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashloanVenueConfig {
    pub venue: String,
    pub address: Address,
    /// Policy multiple, basis points of observed liquidity (e.g. 9000 = 90%).
    pub policy_bps: u32,
}

/// One alert sink the supervisor's emergency procedure notifies (§6 `notifications`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSinkConfig {
    pub kind: String,
    pub endpoint: String,
    #[serde(default)]
    pub credential: Option<String>,
}

/// The safety-supervisor (C8) subset of the config, broken out because it is passed
/// whole to `ambush-supervisor` rather than threaded field-by-field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyConfig {
    pub min_profit: u128,
    pub max_gas_price_gwei: u64,
    pub max_position_size: u128,
    pub max_daily_gas_spend: u128,
    pub max_daily_loss: u128,
    pub tx_rate_window_secs: u64,
    pub max_tx_per_window: usize,
    pub max_slippage_bps: u32,
    pub metrics_reset_interval_secs: u64,
    pub health_check_interval_secs: u64,
    #[serde(default)]
    pub contract_whitelist: Vec<Address>,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            min_profit: 0,
            max_gas_price_gwei: 500,
            max_position_size: u128::MAX,
            max_daily_gas_spend: u128::MAX,
            max_daily_loss: u128::MAX,
            tx_rate_window_secs: 1,
            max_tx_per_window: 10,
            max_slippage_bps: 500,
            metrics_reset_interval_secs: 86_400,
            health_check_interval_secs: 60,
            contract_whitelist: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbushConfig {
    pub rpc_url: String,
    pub relay_url: String,
    pub signer_key_id: String,
    pub signer_password: String,

    #[serde(default)]
    pub safety: SafetyConfig,

    #[serde(default)]
    pub strategies: Vec<String>,
    #[serde(default)]
    pub dexes: Vec<DexConfig>,
    /// Factory contracts the new-pool sniper treats a pending call to as a
    /// pool-creation signal (spec.md §4.5).
    #[serde(default)]
    pub new_pool_factory_whitelist: Vec<Address>,
    #[serde(default)]
    pub flashloan_venues: Vec<FlashloanVenueConfig>,
    #[serde(default)]
    pub notifications: Vec<NotificationSinkConfig>,

    /// Open Question (spec.md §9): retained as a configurable constant, default 1.02,
    /// expressed as basis points of the front-amount (10_200 = 102%) to stay integral.
    #[serde(default = "default_sandwich_back_multiplier_bps")]
    pub sandwich_back_multiplier_bps: u32,

    /// Per-strategy cooldown, seconds, shared default unless a strategy overrides it.
    #[serde(default = "default_strategy_cooldown_secs")]
    pub strategy_cooldown_secs: u64,

    /// Pending-tx store TTL (spec.md §4.2 default 300s).
    #[serde(default = "default_pending_tx_ttl_secs")]
    pub pending_tx_ttl_secs: u64,
    /// Pending-tx store capacity before LRU eviction kicks in.
    #[serde(default = "default_pending_tx_capacity")]
    pub pending_tx_capacity: usize,
}

fn default_sandwich_back_multiplier_bps() -> u32 {
    10_200
}

fn default_strategy_cooldown_secs() -> u64 {
    1
}

fn default_pending_tx_ttl_secs() -> u64 {
    300
}

fn default_pending_tx_capacity() -> usize {
    50_000
}

impl AmbushConfig {
    /// Loads `base_path` (default `config/ambush.toml`), then overlays `AMBUSH_`-prefixed
    /// environment variables (e.g. `AMBUSH_SAFETY__MAX_GAS_PRICE_GWEI=150`).
    pub fn load(base_path: Option<&Path>) -> Result<Self> {
        let base = base_path.unwrap_or(Path::new("config/ambush.toml"));

        let config = Config::builder()
            .add_source(File::from(base).required(true))
            .add_source(
                Environment::with_prefix("AMBUSH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("failed to build ambush configuration")?;

        config
            .try_deserialize()
            .context("failed to deserialize ambush configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn loads_minimal_config_with_defaults_filled_in() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ambush.toml");
        fs::write(
            &path,
            r#"
rpc_url = "http://localhost:8545"
relay_url = "https://relay.example"
signer_key_id = "prod-key"
signer_password = "unused-in-tests"
strategies = ["arbitrage", "sandwich"]
"#,
        )
        .unwrap();

        let cfg = AmbushConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.rpc_url, "http://localhost:8545");
        assert_eq!(cfg.strategies, vec!["arbitrage", "sandwich"]);
        assert_eq!(cfg.sandwich_back_multiplier_bps, 10_200);
        assert_eq!(cfg.safety.tx_rate_window_secs, 1);
        assert_eq!(cfg.pending_tx_ttl_secs, 300);
    }

    #[test]
    fn environment_overlay_overrides_safety_cap() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ambush.toml");
        fs::write(
            &path,
            r#"
rpc_url = "http://localhost:8545"
relay_url = "https://relay.example"
signer_key_id = "prod-key"
signer_password = "unused-in-tests"

[safety]
min_profit = 1000
max_gas_price_gwei = 100
max_position_size = 1
max_daily_gas_spend = 1
max_daily_loss = 1
tx_rate_window_secs = 1
max_tx_per_window = 5
max_slippage_bps = 100
metrics_reset_interval_secs = 86400
health_check_interval_secs = 60
"#,
        )
        .unwrap();

        std::env::set_var("AMBUSH__SAFETY__MAX_GAS_PRICE_GWEI", "250");
        let cfg = AmbushConfig::load(Some(&path)).unwrap();
        std::env::remove_var("AMBUSH__SAFETY__MAX_GAS_PRICE_GWEI");
        assert_eq!(cfg.safety.max_gas_price_gwei, 250);
    }
}
