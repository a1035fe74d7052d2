//! Persisted records: assets, assignments, handovers, maintenance.
//!
//! Status enums carry the full custody state machine. The transition tables
//! (`AssetStatus::can_transition_to`, `MaintenanceStatus::can_transition_to`)
//! are pure functions; the engine consults them before every conditional
//! write so an illegal edge is rejected before anything touches the store.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Hardware category tracked by the department.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetCategory {
    Radio,
    Laptop,
    BodyCamera,
    Weapon,
    Vest,
    Other,
}

impl AssetCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            AssetCategory::Radio => "radio",
            AssetCategory::Laptop => "laptop",
            AssetCategory::BodyCamera => "body_camera",
            AssetCategory::Weapon => "weapon",
            AssetCategory::Vest => "vest",
            AssetCategory::Other => "other",
        }
    }

    /// Parse from string (case-insensitive); unknown values fold into `Other`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "radio" => AssetCategory::Radio,
            "laptop" | "computer" => AssetCategory::Laptop,
            "body_camera" | "bodycamera" | "body-camera" | "camera" => AssetCategory::BodyCamera,
            "weapon" | "firearm" => AssetCategory::Weapon,
            "vest" | "body_armor" => AssetCategory::Vest,
            _ => AssetCategory::Other,
        }
    }
}

impl std::fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical condition, recorded at registration and after maintenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetCondition {
    New,
    #[default]
    Good,
    Fair,
    Poor,
    Damaged,
}

impl AssetCondition {
    pub fn as_str(self) -> &'static str {
        match self {
            AssetCondition::New => "new",
            AssetCondition::Good => "good",
            AssetCondition::Fair => "fair",
            AssetCondition::Poor => "poor",
            AssetCondition::Damaged => "damaged",
        }
    }
}

impl std::fmt::Display for AssetCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Custody state of an asset. `Retired` is terminal; assets are never
/// hard-deleted so the audit trail stays intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    Available,
    Assigned,
    PendingHandover,
    Maintenance,
    Retired,
}

impl AssetStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AssetStatus::Available => "available",
            AssetStatus::Assigned => "assigned",
            AssetStatus::PendingHandover => "pending_handover",
            AssetStatus::Maintenance => "maintenance",
            AssetStatus::Retired => "retired",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, AssetStatus::Retired)
    }

    /// Whether `next` is a legal edge of the asset state machine.
    ///
    /// `Available ⇄ Assigned → PendingHandover → Assigned`;
    /// `{Available, Assigned} ⇄ Maintenance` (exclusive maintenance policy);
    /// any non-terminal state → `Retired`.
    pub fn can_transition_to(self, next: AssetStatus) -> bool {
        use AssetStatus::*;
        match (self, next) {
            (Available, Assigned) => true,
            (Assigned, Available) => true,
            (Assigned, PendingHandover) => true,
            (PendingHandover, Assigned) => true,
            (Available, Maintenance) | (Assigned, Maintenance) => true,
            (Maintenance, Available) | (Maintenance, Assigned) => true,
            (Retired, _) => false,
            (_, Retired) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One piece of department equipment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub name: String,
    pub category: AssetCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    pub location: String,
    pub condition: AssetCondition,
    pub status: AssetStatus,
    /// Officer who registered the asset (from the caller identity).
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stored assignment status. `Overdue` exists in the vocabulary for filters
/// and wire payloads but is derived on read, never written to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Active,
    Returned,
    Overdue,
}

impl AssignmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AssignmentStatus::Active => "active",
            AssignmentStatus::Returned => "returned",
            AssignmentStatus::Overdue => "overdue",
        }
    }
}

impl std::fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Custody record linking one asset to one officer for a bounded period.
/// At most one assignment per asset is `Active` at any time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub id: String,
    pub asset_id: String,
    pub officer_id: String,
    pub assigned_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_date: Option<DateTime<Utc>>,
    pub status: AssignmentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Assignment {
    /// Status as observed at `now`: an `Active` assignment whose due date has
    /// passed reads as `Overdue`. The stored status is left untouched.
    pub fn effective_status(&self, now: DateTime<Utc>) -> AssignmentStatus {
        match (self.status, self.due_date) {
            (AssignmentStatus::Active, Some(due)) if due < now => AssignmentStatus::Overdue,
            (status, _) => status,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == AssignmentStatus::Active
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandoverStatus {
    Pending,
    Completed,
    Rejected,
}

impl HandoverStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            HandoverStatus::Pending => "pending",
            HandoverStatus::Completed => "completed",
            HandoverStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for HandoverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome requested for a pending handover. Kept separate from
/// [`HandoverStatus`] so `Pending` can never be passed as a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandoverDecision {
    Completed,
    Rejected,
}

impl HandoverDecision {
    pub fn as_status(self) -> HandoverStatus {
        match self {
            HandoverDecision::Completed => HandoverStatus::Completed,
            HandoverDecision::Rejected => HandoverStatus::Rejected,
        }
    }
}

/// Proposed or settled transfer of custody between two officers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Handover {
    pub id: String,
    pub asset_id: String,
    /// Officer currently holding the asset (taken from the active
    /// assignment, not the caller, so the chain stays consistent when an
    /// administrator initiates on the holder's behalf).
    pub from_officer_id: String,
    pub to_officer_id: String,
    pub date: DateTime<Utc>,
    pub status: HandoverStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceType {
    Preventive,
    Corrective,
    Calibration,
}

impl MaintenanceType {
    pub fn as_str(self) -> &'static str {
        match self {
            MaintenanceType::Preventive => "preventive",
            MaintenanceType::Corrective => "corrective",
            MaintenanceType::Calibration => "calibration",
        }
    }
}

impl std::fmt::Display for MaintenanceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenancePriority {
    Low,
    Medium,
    High,
    Critical,
}

impl MaintenancePriority {
    pub fn as_str(self) -> &'static str {
        match self {
            MaintenancePriority::Low => "low",
            MaintenancePriority::Medium => "medium",
            MaintenancePriority::High => "high",
            MaintenancePriority::Critical => "critical",
        }
    }
}

impl std::fmt::Display for MaintenancePriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl MaintenanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MaintenanceStatus::Scheduled => "scheduled",
            MaintenanceStatus::InProgress => "in_progress",
            MaintenanceStatus::Completed => "completed",
            MaintenanceStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, MaintenanceStatus::Completed | MaintenanceStatus::Cancelled)
    }

    /// Legal task edges: `Scheduled → {InProgress, Completed, Cancelled}`,
    /// `InProgress → {Completed, Cancelled}`. Terminal states accept nothing.
    pub fn can_transition_to(self, next: MaintenanceStatus) -> bool {
        use MaintenanceStatus::*;
        match (self, next) {
            (Scheduled, InProgress) | (Scheduled, Completed) | (Scheduled, Cancelled) => true,
            (InProgress, Completed) | (InProgress, Cancelled) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for MaintenanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scheduled or in-flight maintenance work on one asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceTask {
    pub id: String,
    pub asset_id: String,
    pub task_type: MaintenanceType,
    pub priority: MaintenancePriority,
    pub status: MaintenanceStatus,
    pub assigned_to: String,
    pub scheduled_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Immutable history entry appended when a task completes. The store offers
/// append and list only; nothing edits one of these after the fact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    pub id: String,
    pub task_id: String,
    pub asset_id: String,
    pub task_type: MaintenanceType,
    pub priority: MaintenancePriority,
    pub performed_by: String,
    pub scheduled_date: DateTime<Utc>,
    pub completion_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Whether scheduled/in-progress maintenance pulls the asset out of
/// circulation. The source screens disagreed with each other; non-blocking
/// is the default pending product clarification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenancePolicy {
    /// Tasks never touch the asset status.
    #[default]
    NonBlocking,
    /// A scheduled task moves the asset to `Maintenance` until the task
    /// reaches a terminal status, blocking assignment in between.
    Exclusive,
}

impl MaintenancePolicy {
    /// Parse from string (case-insensitive); unknown values fall back to the
    /// non-blocking default.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "exclusive" | "blocking" => MaintenancePolicy::Exclusive,
            _ => MaintenancePolicy::NonBlocking,
        }
    }
}
