//! Request/response DTOs for the inventory API surface.

use crate::{
    AssetCondition, Assignment, AssignmentStatus, HandoverDecision, MaintenancePriority,
    MaintenanceStatus, MaintenanceType, Role,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Register a new piece of equipment. `category` is free text on the wire;
/// unknown values fold into `other`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterAssetRequest {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub serial_number: Option<String>,
    pub location: String,
    #[serde(default)]
    pub condition: AssetCondition,
    #[serde(default)]
    pub requested_by: Option<String>,
    #[serde(default)]
    pub requested_role: Option<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignAssetRequest {
    pub asset_id: String,
    pub officer_id: String,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub requested_by: Option<String>,
    #[serde(default)]
    pub requested_role: Option<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnAssetRequest {
    pub assignment_id: String,
    #[serde(default)]
    pub requested_by: Option<String>,
    #[serde(default)]
    pub requested_role: Option<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetireAssetRequest {
    pub asset_id: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub requested_by: Option<String>,
    #[serde(default)]
    pub requested_role: Option<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitiateHandoverRequest {
    pub asset_id: String,
    pub to_officer_id: String,
    #[serde(default)]
    pub requested_by: Option<String>,
    #[serde(default)]
    pub requested_role: Option<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveHandoverRequest {
    pub handover_id: String,
    pub decision: HandoverDecision,
    #[serde(default)]
    pub requested_by: Option<String>,
    #[serde(default)]
    pub requested_role: Option<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleMaintenanceRequest {
    pub asset_id: String,
    pub task_type: MaintenanceType,
    pub priority: MaintenancePriority,
    pub assigned_to: String,
    pub scheduled_date: DateTime<Utc>,
    #[serde(default)]
    pub cost: Option<Decimal>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub requested_by: Option<String>,
    #[serde(default)]
    pub requested_role: Option<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateMaintenanceRequest {
    pub task_id: String,
    pub new_status: MaintenanceStatus,
    #[serde(default)]
    pub requested_by: Option<String>,
    #[serde(default)]
    pub requested_role: Option<Role>,
}

/// Base response envelope. The domain code travels in the body; transport
/// status stays 200 so clients branch on one place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseResponse<T> {
    #[serde(default = "default_code")]
    pub code: i32,
    pub message: String,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

fn default_code() -> i32 {
    200
}

impl<T> BaseResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: 200,
            message: "Success".to_string(),
            data: Some(data),
        }
    }

    pub fn error(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

/// One window of a paginated listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    /// Total matches before the window was applied.
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
}

/// Assignment as the read side reports it: the stored record plus the status
/// observed at query time (`Overdue` when the due date has passed while
/// still `Active`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentView {
    #[serde(flatten)]
    pub assignment: Assignment,
    pub effective_status: AssignmentStatus,
}

impl AssignmentView {
    pub fn observed_at(assignment: Assignment, now: DateTime<Utc>) -> Self {
        let effective_status = assignment.effective_status(now);
        Self {
            assignment,
            effective_status,
        }
    }
}
