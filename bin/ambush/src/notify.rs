//! Default `NotificationSink` wired by the binary (spec.md §4.8): logs every emergency
//! notification through `tracing` at a level matching its `EmergencyLevel`. A real
//! deployment swaps this for the sinks named in `AmbushConfig::notifications` (PagerDuty,
//! Slack, email) — out of scope per spec.md §1's "notification wire protocol" carve-out.

use ambush_supervisor::{NotificationError, NotificationSink};
use ambush_types::EmergencyLevel;
use async_trait::async_trait;
use tracing::{error, info, warn};

pub struct StderrNotificationSink;

#[async_trait]
impl NotificationSink for StderrNotificationSink {
    async fn notify(&self, level: EmergencyLevel, message: &str) -> Result<(), NotificationError> {
        match level {
            EmergencyLevel::Info => info!(%message, "emergency notification"),
            EmergencyLevel::Warning => warn!(%message, "emergency notification"),
            EmergencyLevel::Critical | EmergencyLevel::Fatal => error!(%message, "emergency notification"),
        }
        Ok(())
    }
}
