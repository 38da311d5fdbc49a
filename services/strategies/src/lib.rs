//! Strategy set (C4, spec.md §4.5): arbitrage, front-run, sandwich, JIT liquidity, and
//! new-pool sniper, all implementing the `Strategy` contract. Generalized from the
//! teacher's `SearchStrategy` trait (`mev/src/searcher.rs`).

pub mod arbitrage;
pub mod context;
pub mod front_run;
pub mod jit;
pub mod sandwich;
pub mod sniper;
pub mod strategy;

pub use arbitrage::ArbitrageStrategy;
pub use context::{GraphEdge, Observation, RelayFeeFloor, SignerRef, StrategyConfig, TickSnapshot, VictimRef};
pub use front_run::FrontRunStrategy;
pub use jit::JitLiquidityStrategy;
pub use sandwich::SandwichStrategy;
pub use sniper::{CodePresenceCheck, MockCodePresenceCheck, NewPoolSniperStrategy};
pub use strategy::{BuildContext, Strategy, StrategyError};
