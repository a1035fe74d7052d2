//! Store and notification-sink traits plus the error taxonomy.

use crate::{
    Asset, AssetStatus, Assignment, AssignmentStatus, Handover, HandoverStatus, LifecycleEvent,
    MaintenanceRecord, MaintenanceStatus, MaintenanceTask,
};
use async_trait::async_trait;

/// Record families the store persists, used in error payloads and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Asset,
    Assignment,
    Handover,
    MaintenanceTask,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Asset => "asset",
            RecordKind::Assignment => "assignment",
            RecordKind::Handover => "handover",
            RecordKind::MaintenanceTask => "maintenance task",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: RecordKind, id: String },
    #[error("{kind} already exists: {id}")]
    AlreadyExists { kind: RecordKind, id: String },
    /// Conditional write lost a race: the record's status no longer matches
    /// what the caller observed.
    #[error("stale write on {kind} {id}: expected {expected}, found {actual}")]
    StatusMismatch {
        kind: RecordKind,
        id: String,
        expected: String,
        actual: String,
    },
    /// Uniqueness index: a second active assignment for the same asset.
    #[error("active assignment already exists for asset {asset_id}")]
    ActiveAssignmentExists { asset_id: String },
}

/// Durable storage for custody records. Conditional puts are the only
/// consistency primitive: a put succeeds only while the record still carries
/// the expected status, otherwise it fails with
/// [`StoreError::StatusMismatch`] and writes nothing. No business rules live
/// here beyond the unique-active-assignment index.
#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn add_asset(&self, asset: Asset) -> Result<(), StoreError>;
    async fn get_asset(&self, id: &str) -> Result<Option<Asset>, StoreError>;
    /// Replace the asset record iff its current status equals `expected`.
    async fn put_asset(&self, asset: Asset, expected: AssetStatus) -> Result<(), StoreError>;
    /// Snapshot of all assets in stable insertion order.
    async fn list_assets(&self) -> Result<Vec<Asset>, StoreError>;

    async fn add_assignment(&self, assignment: Assignment) -> Result<(), StoreError>;
    async fn get_assignment(&self, id: &str) -> Result<Option<Assignment>, StoreError>;
    async fn put_assignment(
        &self,
        assignment: Assignment,
        expected: AssignmentStatus,
    ) -> Result<(), StoreError>;
    /// The single active assignment for an asset, if any.
    async fn get_active_assignment(&self, asset_id: &str) -> Result<Option<Assignment>, StoreError>;
    async fn list_assignments(&self) -> Result<Vec<Assignment>, StoreError>;

    async fn add_handover(&self, handover: Handover) -> Result<(), StoreError>;
    async fn get_handover(&self, id: &str) -> Result<Option<Handover>, StoreError>;
    async fn put_handover(
        &self,
        handover: Handover,
        expected: HandoverStatus,
    ) -> Result<(), StoreError>;
    async fn list_handovers(&self) -> Result<Vec<Handover>, StoreError>;

    async fn add_task(&self, task: MaintenanceTask) -> Result<(), StoreError>;
    async fn get_task(&self, id: &str) -> Result<Option<MaintenanceTask>, StoreError>;
    async fn put_task(
        &self,
        task: MaintenanceTask,
        expected: MaintenanceStatus,
    ) -> Result<(), StoreError>;
    async fn list_tasks(&self) -> Result<Vec<MaintenanceTask>, StoreError>;

    /// Append an immutable history entry. There is deliberately no update or
    /// delete counterpart.
    async fn append_maintenance_record(&self, record: MaintenanceRecord)
        -> Result<(), StoreError>;
    async fn list_maintenance_history(
        &self,
        asset_id: &str,
    ) -> Result<Vec<MaintenanceRecord>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("delivery failed: {0}")]
    Delivery(String),
    #[error("dispatch channel closed")]
    ChannelClosed,
}

/// Receives one event per committed transition. Implementations must not
/// block the engine on delivery; failures are logged by the caller and
/// dropped (at-most-once semantics — the state change already happened).
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn publish(&self, event: LifecycleEvent) -> Result<(), NotifyError>;
}

/// Error taxonomy for engine operations. `Conflict` is the one recoverable
/// class: retry with a fresh read. Everything else is terminal for the
/// request and surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: RecordKind, id: String },
    #[error("invalid state: {reason}")]
    InvalidState { reason: String },
    #[error("conflict: {reason}")]
    Conflict { reason: String },
    #[error("validation failed: {reason}")]
    Validation { reason: String },
    #[error("forbidden: {reason}")]
    Forbidden { reason: String },
}

impl LifecycleError {
    pub fn invalid_state(reason: impl Into<String>) -> Self {
        LifecycleError::InvalidState {
            reason: reason.into(),
        }
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        LifecycleError::Validation {
            reason: reason.into(),
        }
    }

    pub fn not_found(kind: RecordKind, id: impl Into<String>) -> Self {
        LifecycleError::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Stable tag for structured logging and the API envelope.
    pub fn code(&self) -> &'static str {
        match self {
            LifecycleError::NotFound { .. } => "not_found",
            LifecycleError::InvalidState { .. } => "invalid_state",
            LifecycleError::Conflict { .. } => "conflict",
            LifecycleError::Validation { .. } => "validation",
            LifecycleError::Forbidden { .. } => "forbidden",
        }
    }
}

impl From<StoreError> for LifecycleError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { kind, id } => LifecycleError::NotFound { kind, id },
            // Lost CAS races and duplicate inserts both mean the world moved
            // between read and write; the caller may retry with a fresh read.
            StoreError::StatusMismatch { .. } => LifecycleError::Conflict {
                reason: err.to_string(),
            },
            StoreError::AlreadyExists { .. } | StoreError::ActiveAssignmentExists { .. } => {
                LifecycleError::Conflict {
                    reason: err.to_string(),
                }
            }
        }
    }
}
