//! Safety supervisor (C8): the ten independent breakers of spec.md §4.8, the derived
//! risk level, and the emergency procedure's persisted recovery state. Per spec.md §9
//! REDESIGN FLAGS this is the single source of truth — no duplicate breaker path.

pub mod breakers;
pub mod cancellation;
pub mod emergency;
pub mod notifications;
pub mod supervisor;

pub use breakers::{BreakerCaps, BreakerTrip, NetworkHealth, ResourceHealth, SlippageObservation, TxCandidate};
pub use cancellation::{CancellationError, MockTxCanceller, TxCanceller};
pub use emergency::EmergencyState;
pub use notifications::{MockNotificationSink, NotificationError, NotificationSink};
pub use supervisor::{SafetySupervisor, SupervisorError};
