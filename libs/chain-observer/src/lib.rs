//! Chain observer (C1): block-tick and pending-tx lazy sequences, plus on-demand pool
//! reserve queries, over an external `ChainClient` boundary (spec.md §1 scope: signing,
//! wire transport, and the RPC client itself are external collaborators — this crate
//! only describes and drives the contract they fulfill).

pub mod backoff;
pub mod client;
pub mod observer;

pub use backoff::BackoffPolicy;
pub use client::{ChainClient, ChainError, MockChainClient};
pub use observer::{BlockTick, Canceller, ChainObserver, ObserverHandle};
