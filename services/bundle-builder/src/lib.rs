//! Bundle builder & bid optimizer (C6, spec.md §4.6): profitability floor, ordering,
//! gas shaping, and a simulate-then-sign pipeline turning an Opportunity's legs into a
//! submittable `Bundle`. Grounded in the teacher's `BundleBuilder` (`mev/src/bundle.rs`).

pub mod builder;
pub mod leg;
pub mod ordering;
pub mod shaping;
pub mod signer;

pub use builder::{BuildError, BundleBuilder};
pub use leg::TxLeg;
pub use ordering::{order_legs, ShapeKind};
pub use shaping::{shape_gas, BidPredictor, GasShape};
pub use signer::{MockTxSigner, SignerError, TxSigner};
