//! Lifecycle events published after every committed transition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of lifecycle event. One is published per successful engine mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEventKind {
    AssetRegistered,
    AssetAssigned,
    AssetReturned,
    HandoverPending,
    HandoverResolved,
    MaintenanceDue,
    MaintenanceCompleted,
    MaintenanceCancelled,
    AssetRetired,
}

impl LifecycleEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleEventKind::AssetRegistered => "asset_registered",
            LifecycleEventKind::AssetAssigned => "asset_assigned",
            LifecycleEventKind::AssetReturned => "asset_returned",
            LifecycleEventKind::HandoverPending => "handover_pending",
            LifecycleEventKind::HandoverResolved => "handover_resolved",
            LifecycleEventKind::MaintenanceDue => "maintenance_due",
            LifecycleEventKind::MaintenanceCompleted => "maintenance_completed",
            LifecycleEventKind::MaintenanceCancelled => "maintenance_cancelled",
            LifecycleEventKind::AssetRetired => "asset_retired",
        }
    }
}

impl std::fmt::Display for LifecycleEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One fire-and-forget notification. Delivery failure never rolls back the
/// transition that produced it; the store state is the source of truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleEvent {
    pub event_id: String,
    pub kind: LifecycleEventKind,
    pub asset_id: String,
    /// Assignment, handover, or task id the event refers to, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,
    /// Officer the event concerns (assignee, transfer target, technician).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub officer_id: Option<String>,
    pub occurred_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl LifecycleEvent {
    pub fn new(kind: LifecycleEventKind, asset_id: impl Into<String>) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            kind,
            asset_id: asset_id.into(),
            subject_id: None,
            officer_id: None,
            occurred_at: Utc::now(),
            detail: None,
        }
    }

    pub fn subject(mut self, id: impl Into<String>) -> Self {
        self.subject_id = Some(id.into());
        self
    }

    pub fn officer(mut self, id: impl Into<String>) -> Self {
        self.officer_id = Some(id.into());
        self
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}
