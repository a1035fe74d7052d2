//! Channel-fed sink: publish enqueues, a spawned worker delivers.

use armory_types::{LifecycleEvent, NotificationSink, NotifyError};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Final hop of a notification: push endpoint, audit file, or similar.
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    async fn deliver(&self, event: &LifecycleEvent) -> Result<(), NotifyError>;
}

/// Sink that decouples the engine from slow delivery: `publish` only sends
/// into an unbounded queue, a single worker drains it. A failed delivery is
/// logged and dropped; the committed transition is the source of truth.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<LifecycleEvent>,
}

impl ChannelSink {
    pub fn new(channel: Arc<dyn DeliveryChannel>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<LifecycleEvent>();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if let Err(err) = channel.deliver(&event).await {
                    tracing::warn!(
                        event_id = %event.event_id,
                        kind = %event.kind,
                        error = %err,
                        "notification delivery failed, dropping event"
                    );
                }
            }
        });
        Self { tx }
    }
}

#[async_trait]
impl NotificationSink for ChannelSink {
    async fn publish(&self, event: LifecycleEvent) -> Result<(), NotifyError> {
        self.tx.send(event).map_err(|_| NotifyError::ChannelClosed)
    }
}
