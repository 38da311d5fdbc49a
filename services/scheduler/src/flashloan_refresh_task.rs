//! Keeps the flash-loan planner's provider snapshots warm for every token the JIT
//! strategy might need a loan against (spec.md §4.4). Runs independently of the tick
//! and strategy tasks — a slow or failing liquidity source degrades loan selection, it
//! never blocks block processing.

use std::sync::Arc;
use std::time::Duration;

use ethers::types::Address;

use ambush_flash_loan::{FlashLoanPlanner, LiquiditySource};

pub async fn run(
    planner: Arc<FlashLoanPlanner>,
    source: Arc<dyn LiquiditySource>,
    tokens: Vec<Address>,
    interval: Duration,
    current_block: impl Fn() -> u64 + Send + 'static,
) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        let now = chrono::Utc::now();
        let block = current_block();
        for &token in &tokens {
            planner.refresh(source.as_ref(), token, block, now).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ambush_config::FlashloanVenueConfig;
    use ambush_flash_loan::MockLiquiditySource;
    use ambush_types::VenueId;
    use ethers::types::U256;

    #[tokio::test]
    async fn refreshes_every_configured_token_each_interval() {
        let venues = vec![FlashloanVenueConfig { venue: "aave".into(), address: Address::from_low_u64_be(1), policy_bps: 9_000 }];
        let planner = Arc::new(FlashLoanPlanner::new(&venues, 60));
        let source = Arc::new(MockLiquiditySource::new());
        source.set_liquidity(VenueId::Aave, U256::from(1_000_000u64));

        let token = Address::from_low_u64_be(42);
        let handle = tokio::spawn(run(planner.clone(), source, vec![token], Duration::from_millis(5), || 10));

        tokio::time::sleep(Duration::from_millis(30)).await;
        handle.abort();

        assert!(planner.select(U256::from(10u64), U256::zero(), chrono::Utc::now()).is_some());
    }
}
