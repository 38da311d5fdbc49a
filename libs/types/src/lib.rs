//! Shared domain types for the ambush MEV searcher.
//!
//! Every cross-crate shape lives here so C1-C10 pass owned, typed values over channels
//! rather than reaching into each other's internals — the message-bus boundary the
//! rewrite needs to avoid cyclic component references.

pub mod amount;
pub mod bundle;
pub mod error;
pub mod opportunity;
pub mod pool;
pub mod provider;
pub mod safety;
pub mod tx;

pub use amount::SignedAmount;
pub use bundle::{Bundle, BundleEntry, BundleShapeError};
pub use error::OperationalError;
pub use opportunity::{Opportunity, StrategyKind};
pub use pool::PoolState;
pub use provider::{ProviderSnapshot, VenueId};
pub use safety::{EmergencyLevel, Incident, RiskLevel, SafetyMetrics};
pub use tx::{GasPrice, PendingTx, ProtocolTag, TokenId};
