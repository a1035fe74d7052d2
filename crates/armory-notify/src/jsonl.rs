//! JSONL delivery: append each event as one line to a local file.

use crate::DeliveryChannel;
use armory_types::{LifecycleEvent, NotifyError};
use tokio::io::AsyncWriteExt;

/// Appends events to a JSONL file; survives restarts, tolerates partial
/// history (unparseable lines are skipped on read).
pub struct JsonlDelivery {
    path: std::path::PathBuf,
    append_lock: tokio::sync::Mutex<()>,
}

impl JsonlDelivery {
    pub fn new(path: impl AsRef<std::path::Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            append_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub async fn read_all(&self) -> Result<Vec<LifecycleEvent>, NotifyError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(NotifyError::Delivery(e.to_string())),
        };
        let mut out = Vec::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Ok(event) = serde_json::from_str(line) {
                out.push(event);
            }
        }
        Ok(out)
    }
}

#[async_trait::async_trait]
impl DeliveryChannel for JsonlDelivery {
    async fn deliver(&self, event: &LifecycleEvent) -> Result<(), NotifyError> {
        let _guard = self.append_lock.lock().await;
        let line =
            serde_json::to_string(event).map_err(|e| NotifyError::Delivery(e.to_string()))?;
        let mut f = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;
        f.write_all(format!("{}\n", line).as_bytes())
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;
        Ok(())
    }
}
