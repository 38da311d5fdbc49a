//! Periodically asks the core actor to poll the relay for every outstanding bundle's
//! inclusion status (spec.md §4.9). The actual relay call and the 500ms status cache
//! live on `RelayProxy`/the core actor; this task only supplies the cadence.

use std::time::Duration;

use tokio::sync::mpsc;

use crate::messages::CoreMessage;

pub async fn run(poll_interval: Duration, core_tx: mpsc::Sender<CoreMessage>) {
    let mut ticker = tokio::time::interval(poll_interval);
    loop {
        ticker.tick().await;
        if core_tx.send(CoreMessage::PollStatuses).await.is_err() {
            return;
        }
    }
}
