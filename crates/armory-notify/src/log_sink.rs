//! Structured-log sink: one tracing line per event.

use armory_types::{LifecycleEvent, NotificationSink, NotifyError};

/// Default sink when no external delivery channel is configured.
pub struct LogSink;

impl LogSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl NotificationSink for LogSink {
    async fn publish(&self, event: LifecycleEvent) -> Result<(), NotifyError> {
        tracing::info!(
            event_id = %event.event_id,
            kind = %event.kind,
            asset_id = %event.asset_id,
            subject_id = event.subject_id.as_deref().unwrap_or("-"),
            officer_id = event.officer_id.as_deref().unwrap_or("-"),
            "lifecycle event"
        );
        Ok(())
    }
}
