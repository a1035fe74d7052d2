//! Armory custody REST API server.

use armory_api::server::{self, AppState};
use armory_engine::{EngineConfig, LifecycleEngine};
use armory_notify::{ChannelSink, JsonlDelivery, LogSink, WebhookDelivery};
use armory_query::QueryService;
use armory_store::InMemoryAssetStore;
use armory_types::{AssetStore, MaintenancePolicy, NotificationSink};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let store: Arc<dyn AssetStore> = Arc::new(InMemoryAssetStore::new());

    let sink: Arc<dyn NotificationSink> = if let Some(webhook) = WebhookDelivery::from_env() {
        tracing::info!("lifecycle events delivered via webhook");
        Arc::new(ChannelSink::new(Arc::new(webhook)))
    } else if let Ok(path) = std::env::var("ARMORY_EVENT_LOG") {
        tracing::info!(%path, "lifecycle events appended to JSONL file");
        Arc::new(ChannelSink::new(Arc::new(JsonlDelivery::new(path))))
    } else {
        Arc::new(LogSink::new())
    };

    let policy = std::env::var("ARMORY_MAINTENANCE_POLICY")
        .map(|v| MaintenancePolicy::parse(&v))
        .unwrap_or_default();
    let engine = Arc::new(LifecycleEngine::with_config(
        Arc::clone(&store),
        sink,
        EngineConfig {
            maintenance_policy: policy,
        },
    ));
    let query = Arc::new(QueryService::new(store));

    let app = server::router(Arc::new(AppState { engine, query }));
    let addr: SocketAddr = std::env::var("ARMORY_LISTEN")
        .unwrap_or_else(|_| "0.0.0.0:8002".to_string())
        .parse()?;
    tracing::info!(%addr, ?policy, "armory API listening");
    axum::serve(
        tokio::net::TcpListener::bind(addr).await?,
        app.into_make_service(),
    )
    .await?;
    Ok(())
}
