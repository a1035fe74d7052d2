//! Recording sink for tests: captures events instead of delivering them.

use armory_types::{LifecycleEvent, LifecycleEventKind, NotificationSink, NotifyError};
use tokio::sync::Mutex;

/// Test sink that keeps every published event for assertions.
pub struct RecordingSink {
    events: Mutex<Vec<LifecycleEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    pub async fn events(&self) -> Vec<LifecycleEvent> {
        self.events.lock().await.clone()
    }

    pub async fn kinds(&self) -> Vec<LifecycleEventKind> {
        self.events.lock().await.iter().map(|e| e.kind).collect()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl NotificationSink for RecordingSink {
    async fn publish(&self, event: LifecycleEvent) -> Result<(), NotifyError> {
        self.events.lock().await.push(event);
        Ok(())
    }
}
