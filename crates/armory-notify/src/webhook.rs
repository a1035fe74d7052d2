//! Webhook delivery: POST the event as JSON to a configured endpoint.

use crate::DeliveryChannel;
use armory_types::{LifecycleEvent, NotifyError};

/// Posts each event to an HTTP endpoint, optionally with a bearer token.
pub struct WebhookDelivery {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
}

impl WebhookDelivery {
    pub fn new(url: String, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            token,
        }
    }

    /// Build from `ARMORY_WEBHOOK_URL` / `ARMORY_WEBHOOK_TOKEN`; `None` when
    /// no endpoint is configured.
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("ARMORY_WEBHOOK_URL").ok()?;
        let token = std::env::var("ARMORY_WEBHOOK_TOKEN").ok();
        Some(Self::new(url, token))
    }
}

#[async_trait::async_trait]
impl DeliveryChannel for WebhookDelivery {
    async fn deliver(&self, event: &LifecycleEvent) -> Result<(), NotifyError> {
        let mut req = self.client.post(&self.url).json(event);
        if let Some(ref token) = self.token {
            req = req.bearer_auth(token);
        }
        let res = req
            .send()
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(NotifyError::Delivery(format!(
                "webhook returned {}: {}",
                status, body
            )));
        }
        Ok(())
    }
}
