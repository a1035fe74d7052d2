//! Notification sinks: receive one lifecycle event per committed transition
//! and hand it to a delivery channel. Delivery failures are logged and
//! dropped, never surfaced to the engine (at-most-once semantics).

mod channel;
mod jsonl;
mod log_sink;
mod webhook;

#[cfg(feature = "test-util")]
mod recording;

pub use armory_types::{NotificationSink, NotifyError};
pub use channel::{ChannelSink, DeliveryChannel};
pub use jsonl::JsonlDelivery;
pub use log_sink::LogSink;
pub use webhook::WebhookDelivery;

#[cfg(feature = "test-util")]
pub use recording::RecordingSink;
