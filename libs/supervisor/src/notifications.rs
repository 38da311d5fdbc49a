//! Notification sinks (spec.md §4.8 emergency procedure: "fire notifications (external
//! sinks)"). The wire format and credentials live in `ambush_config::NotificationSinkConfig`;
//! this trait is the boundary the supervisor calls through.

use ambush_types::EmergencyLevel;
use async_trait::async_trait;
use parking_lot::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification sink unreachable: {0}")]
    Unreachable(String),
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, level: EmergencyLevel, message: &str) -> Result<(), NotificationError>;
}

/// Records every notification it receives, for asserting on emergency-procedure
/// behavior in tests.
#[derive(Default)]
pub struct MockNotificationSink {
    sent: Mutex<Vec<(EmergencyLevel, String)>>,
}

impl MockNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<(EmergencyLevel, String)> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl NotificationSink for MockNotificationSink {
    async fn notify(&self, level: EmergencyLevel, message: &str) -> Result<(), NotificationError> {
        self.sent.lock().push((level, message.to_string()));
        Ok(())
    }
}
