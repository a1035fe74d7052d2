//! State-transition engine for asset custody.
//!
//! Every operation follows the same discipline: read, validate, then commit
//! through exactly one conditional write on the contended record. The loser
//! of a concurrent race fails that write with `Conflict` and leaves no
//! partial state; dependent writes only run on the winner's path. Events are
//! published after the commit and never roll it back.

use armory_types::{
    Asset, AssetCategory, AssetCondition, AssetStatus, AssetStore, Assignment, AssignmentStatus,
    CallerIdentity, Handover, HandoverDecision, HandoverStatus, LifecycleError, LifecycleEvent,
    LifecycleEventKind, MaintenancePolicy, MaintenancePriority, MaintenanceRecord,
    MaintenanceStatus, MaintenanceTask, MaintenanceType, NotificationSink, RecordKind,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub maintenance_policy: MaintenancePolicy,
}

/// Validates and applies every custody transition. Presentation code never
/// writes records directly; it calls these operations and renders the result.
pub struct LifecycleEngine {
    store: Arc<dyn AssetStore>,
    sink: Arc<dyn NotificationSink>,
    config: EngineConfig,
}

impl LifecycleEngine {
    pub fn new(store: Arc<dyn AssetStore>, sink: Arc<dyn NotificationSink>) -> Self {
        Self::with_config(store, sink, EngineConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn AssetStore>,
        sink: Arc<dyn NotificationSink>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            sink,
            config,
        }
    }

    /// Register a new asset. Status starts `Available`; `created_by` comes
    /// from the resolved caller identity.
    pub async fn register_asset(
        &self,
        identity: &CallerIdentity,
        name: &str,
        category: AssetCategory,
        serial_number: Option<String>,
        location: &str,
        condition: AssetCondition,
    ) -> Result<Asset, LifecycleError> {
        let name = name.trim();
        let location = location.trim();
        if name.is_empty() {
            return Err(LifecycleError::validation("asset name must not be blank"));
        }
        if location.is_empty() {
            return Err(LifecycleError::validation("asset location must not be blank"));
        }
        let now = Utc::now();
        let asset = Asset {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            category,
            serial_number: serial_number.filter(|s| !s.trim().is_empty()),
            location: location.to_string(),
            condition,
            status: AssetStatus::Available,
            created_by: identity.officer_id.clone(),
            created_at: now,
            updated_at: now,
        };
        self.store.add_asset(asset.clone()).await?;
        tracing::info!(asset_id = %asset.id, category = %asset.category, "asset registered");
        self.emit(
            LifecycleEvent::new(LifecycleEventKind::AssetRegistered, &asset.id)
                .officer(&identity.officer_id),
        )
        .await;
        Ok(asset)
    }

    /// Assign an `Available` asset to an officer. The asset status CAS
    /// `Available -> Assigned` is the commit point; a concurrent assign loses
    /// that write with `Conflict`.
    pub async fn assign(
        &self,
        asset_id: &str,
        officer_id: &str,
        due_date: Option<DateTime<Utc>>,
        notes: Option<String>,
    ) -> Result<Assignment, LifecycleError> {
        if officer_id.trim().is_empty() {
            return Err(LifecycleError::validation("officer_id must not be blank"));
        }
        let asset = self.fetch_asset(asset_id).await?;
        if asset.status != AssetStatus::Available {
            return Err(LifecycleError::invalid_state(format!(
                "asset {} is {}, not available for assignment",
                asset_id, asset.status
            )));
        }

        let now = Utc::now();
        let assignment = Assignment {
            id: Uuid::new_v4().to_string(),
            asset_id: asset_id.to_string(),
            officer_id: officer_id.to_string(),
            assigned_date: now,
            due_date,
            return_date: None,
            status: AssignmentStatus::Active,
            notes,
        };

        let mut updated = asset.clone();
        updated.status = AssetStatus::Assigned;
        updated.updated_at = now;
        self.store.put_asset(updated, AssetStatus::Available).await?;

        if let Err(err) = self.store.add_assignment(assignment.clone()).await {
            // Dependent write failed after the commit point; put the asset
            // back so the loser's view stays consistent.
            let mut reverted = asset;
            reverted.updated_at = Utc::now();
            let _ = self.store.put_asset(reverted, AssetStatus::Assigned).await;
            return Err(err.into());
        }

        tracing::info!(asset_id, officer_id, assignment_id = %assignment.id, "asset assigned");
        self.emit(
            LifecycleEvent::new(LifecycleEventKind::AssetAssigned, asset_id)
                .subject(&assignment.id)
                .officer(officer_id),
        )
        .await;
        Ok(assignment)
    }

    /// Close an active assignment and put the asset back in circulation.
    /// A pending handover blocks the return: the asset is `PendingHandover`
    /// then, not `Assigned`.
    pub async fn return_asset(&self, assignment_id: &str) -> Result<Assignment, LifecycleError> {
        let assignment = self
            .store
            .get_assignment(assignment_id)
            .await?
            .ok_or_else(|| LifecycleError::not_found(RecordKind::Assignment, assignment_id))?;
        if !assignment.is_active() {
            return Err(LifecycleError::invalid_state(format!(
                "assignment {} is already {}",
                assignment_id, assignment.status
            )));
        }
        let asset = self.fetch_asset(&assignment.asset_id).await?;
        if asset.status != AssetStatus::Assigned {
            return Err(LifecycleError::invalid_state(format!(
                "asset {} is {}, custody cannot be returned now",
                asset.id, asset.status
            )));
        }

        let now = Utc::now();
        let mut freed = asset.clone();
        freed.status = AssetStatus::Available;
        freed.updated_at = now;
        self.store.put_asset(freed, AssetStatus::Assigned).await?;

        let mut closed = assignment.clone();
        closed.status = AssignmentStatus::Returned;
        closed.return_date = Some(now);
        if let Err(err) = self
            .store
            .put_assignment(closed.clone(), AssignmentStatus::Active)
            .await
        {
            let mut reverted = asset;
            reverted.updated_at = Utc::now();
            let _ = self.store.put_asset(reverted, AssetStatus::Available).await;
            return Err(err.into());
        }

        tracing::info!(asset_id = %closed.asset_id, assignment_id, "asset returned");
        self.emit(
            LifecycleEvent::new(LifecycleEventKind::AssetReturned, &closed.asset_id)
                .subject(assignment_id)
                .officer(&closed.officer_id),
        )
        .await;
        Ok(closed)
    }

    /// Propose a transfer of custody. `from_officer_id` is taken from the
    /// active assignment, not the caller, so the custody chain stays
    /// consistent when an administrator initiates on the holder's behalf.
    pub async fn initiate_handover(
        &self,
        asset_id: &str,
        to_officer_id: &str,
    ) -> Result<Handover, LifecycleError> {
        if to_officer_id.trim().is_empty() {
            return Err(LifecycleError::validation("to_officer_id must not be blank"));
        }
        let asset = self.fetch_asset(asset_id).await?;
        if asset.status != AssetStatus::Assigned {
            return Err(LifecycleError::invalid_state(format!(
                "asset {} is {}, handover requires an assigned asset",
                asset_id, asset.status
            )));
        }
        let active = self
            .store
            .get_active_assignment(asset_id)
            .await?
            .ok_or_else(|| {
                LifecycleError::invalid_state(format!("asset {} has no active assignment", asset_id))
            })?;
        if active.officer_id == to_officer_id {
            return Err(LifecycleError::validation(
                "handover target equals the current holder",
            ));
        }

        let now = Utc::now();
        let handover = Handover {
            id: Uuid::new_v4().to_string(),
            asset_id: asset_id.to_string(),
            from_officer_id: active.officer_id.clone(),
            to_officer_id: to_officer_id.to_string(),
            date: now,
            status: HandoverStatus::Pending,
            resolved_at: None,
        };

        let mut parked = asset.clone();
        parked.status = AssetStatus::PendingHandover;
        parked.updated_at = now;
        self.store.put_asset(parked, AssetStatus::Assigned).await?;

        if let Err(err) = self.store.add_handover(handover.clone()).await {
            let mut reverted = asset;
            reverted.updated_at = Utc::now();
            let _ = self
                .store
                .put_asset(reverted, AssetStatus::PendingHandover)
                .await;
            return Err(err.into());
        }

        tracing::info!(
            asset_id,
            handover_id = %handover.id,
            from = %handover.from_officer_id,
            to = %handover.to_officer_id,
            "handover initiated"
        );
        self.emit(
            LifecycleEvent::new(LifecycleEventKind::HandoverPending, asset_id)
                .subject(&handover.id)
                .officer(to_officer_id),
        )
        .await;
        Ok(handover)
    }

    /// Settle a pending handover. The handover status CAS is the commit
    /// point; only the winner runs the dependent assignment and asset
    /// writes, which the `PendingHandover` invariant guarantees to succeed.
    pub async fn resolve_handover(
        &self,
        handover_id: &str,
        decision: HandoverDecision,
    ) -> Result<Handover, LifecycleError> {
        let handover = self
            .store
            .get_handover(handover_id)
            .await?
            .ok_or_else(|| LifecycleError::not_found(RecordKind::Handover, handover_id))?;
        if handover.status != HandoverStatus::Pending {
            return Err(LifecycleError::invalid_state(format!(
                "handover {} is already {}",
                handover_id, handover.status
            )));
        }

        let now = Utc::now();
        let mut resolved = handover.clone();
        resolved.status = decision.as_status();
        resolved.resolved_at = Some(now);
        self.store
            .put_handover(resolved.clone(), HandoverStatus::Pending)
            .await?;

        let asset = self.fetch_asset(&handover.asset_id).await?;
        match decision {
            HandoverDecision::Completed => {
                let old = self
                    .store
                    .get_active_assignment(&handover.asset_id)
                    .await?
                    .ok_or_else(|| {
                        LifecycleError::invalid_state(format!(
                            "asset {} has no active assignment to hand over",
                            handover.asset_id
                        ))
                    })?;
                let mut closed = old.clone();
                closed.status = AssignmentStatus::Returned;
                closed.return_date = Some(now);
                self.store
                    .put_assignment(closed, AssignmentStatus::Active)
                    .await?;

                let successor = Assignment {
                    id: Uuid::new_v4().to_string(),
                    asset_id: handover.asset_id.clone(),
                    officer_id: handover.to_officer_id.clone(),
                    assigned_date: now,
                    due_date: None,
                    return_date: None,
                    status: AssignmentStatus::Active,
                    notes: None,
                };
                self.store.add_assignment(successor).await?;
            }
            HandoverDecision::Rejected => {}
        }

        // Both outcomes land the asset back on Assigned: completed custody
        // now belongs to the target, rejected custody stays with the holder.
        let mut settled = asset;
        settled.status = AssetStatus::Assigned;
        settled.updated_at = now;
        self.store
            .put_asset(settled, AssetStatus::PendingHandover)
            .await?;

        tracing::info!(
            handover_id,
            asset_id = %resolved.asset_id,
            outcome = %resolved.status,
            "handover resolved"
        );
        self.emit(
            LifecycleEvent::new(LifecycleEventKind::HandoverResolved, &resolved.asset_id)
                .subject(handover_id)
                .officer(&resolved.to_officer_id)
                .detail(resolved.status.as_str()),
        )
        .await;
        Ok(resolved)
    }

    /// Schedule maintenance on an asset still in circulation. Under the
    /// exclusive policy the asset moves to `Maintenance` and is blocked from
    /// assignment until the task reaches a terminal status.
    #[allow(clippy::too_many_arguments)]
    pub async fn schedule_maintenance(
        &self,
        asset_id: &str,
        task_type: MaintenanceType,
        priority: MaintenancePriority,
        assigned_to: &str,
        scheduled_date: DateTime<Utc>,
        cost: Option<Decimal>,
        notes: Option<String>,
    ) -> Result<MaintenanceTask, LifecycleError> {
        if assigned_to.trim().is_empty() {
            return Err(LifecycleError::validation("assigned_to must not be blank"));
        }
        let asset = self.fetch_asset(asset_id).await?;
        if !matches!(asset.status, AssetStatus::Available | AssetStatus::Assigned) {
            return Err(LifecycleError::invalid_state(format!(
                "asset {} is {}, maintenance can only be scheduled while available or assigned",
                asset_id, asset.status
            )));
        }

        let task = MaintenanceTask {
            id: Uuid::new_v4().to_string(),
            asset_id: asset_id.to_string(),
            task_type,
            priority,
            status: MaintenanceStatus::Scheduled,
            assigned_to: assigned_to.to_string(),
            scheduled_date,
            completion_date: None,
            cost,
            notes,
        };

        match self.config.maintenance_policy {
            MaintenancePolicy::NonBlocking => {
                self.store.add_task(task.clone()).await?;
            }
            MaintenancePolicy::Exclusive => {
                let previous = asset.status;
                let mut parked = asset.clone();
                parked.status = AssetStatus::Maintenance;
                parked.updated_at = Utc::now();
                self.store.put_asset(parked, previous).await?;

                if let Err(err) = self.store.add_task(task.clone()).await {
                    let mut reverted = asset;
                    reverted.updated_at = Utc::now();
                    let _ = self
                        .store
                        .put_asset(reverted, AssetStatus::Maintenance)
                        .await;
                    return Err(err.into());
                }
            }
        }

        tracing::info!(
            asset_id,
            task_id = %task.id,
            task_type = %task.task_type,
            priority = %task.priority,
            "maintenance scheduled"
        );
        self.emit(
            LifecycleEvent::new(LifecycleEventKind::MaintenanceDue, asset_id)
                .subject(&task.id)
                .officer(assigned_to)
                .detail(task.priority.as_str()),
        )
        .await;
        Ok(task)
    }

    /// Advance a maintenance task. Completion stamps `completion_date`,
    /// appends exactly one immutable history record, and freezes the task:
    /// any later status change is `InvalidState`.
    pub async fn update_maintenance_status(
        &self,
        task_id: &str,
        new_status: MaintenanceStatus,
    ) -> Result<MaintenanceTask, LifecycleError> {
        let task = self
            .store
            .get_task(task_id)
            .await?
            .ok_or_else(|| LifecycleError::not_found(RecordKind::MaintenanceTask, task_id))?;
        if !task.status.can_transition_to(new_status) {
            return Err(LifecycleError::invalid_state(format!(
                "maintenance task {} cannot move from {} to {}",
                task_id, task.status, new_status
            )));
        }

        let now = Utc::now();
        let mut updated = task.clone();
        updated.status = new_status;
        if new_status == MaintenanceStatus::Completed {
            updated.completion_date = Some(now);
        }
        self.store.put_task(updated.clone(), task.status).await?;

        if new_status == MaintenanceStatus::Completed {
            let record = MaintenanceRecord {
                id: Uuid::new_v4().to_string(),
                task_id: task_id.to_string(),
                asset_id: updated.asset_id.clone(),
                task_type: updated.task_type,
                priority: updated.priority,
                performed_by: updated.assigned_to.clone(),
                scheduled_date: updated.scheduled_date,
                completion_date: now,
                cost: updated.cost,
                notes: updated.notes.clone(),
            };
            self.store.append_maintenance_record(record).await?;
        }

        if self.config.maintenance_policy == MaintenancePolicy::Exclusive
            && new_status.is_terminal()
        {
            self.restore_after_maintenance(&updated.asset_id, now).await?;
        }

        tracing::info!(task_id, status = %new_status, "maintenance status updated");
        match new_status {
            MaintenanceStatus::Completed => {
                self.emit(
                    LifecycleEvent::new(
                        LifecycleEventKind::MaintenanceCompleted,
                        &updated.asset_id,
                    )
                    .subject(task_id)
                    .officer(&updated.assigned_to),
                )
                .await;
            }
            MaintenanceStatus::Cancelled => {
                self.emit(
                    LifecycleEvent::new(
                        LifecycleEventKind::MaintenanceCancelled,
                        &updated.asset_id,
                    )
                    .subject(task_id),
                )
                .await;
            }
            MaintenanceStatus::Scheduled | MaintenanceStatus::InProgress => {}
        }
        Ok(updated)
    }

    /// Retire an asset permanently. Administrator-only; custody must be
    /// settled first (no active assignment, no pending handover).
    pub async fn retire_asset(
        &self,
        identity: &CallerIdentity,
        asset_id: &str,
        reason: Option<&str>,
    ) -> Result<Asset, LifecycleError> {
        if !identity.is_administrator() {
            return Err(LifecycleError::Forbidden {
                reason: "only administrators may retire assets".to_string(),
            });
        }
        let asset = self.fetch_asset(asset_id).await?;
        if asset.status == AssetStatus::Retired {
            return Err(LifecycleError::invalid_state(format!(
                "asset {} is already retired",
                asset_id
            )));
        }
        if asset.status == AssetStatus::PendingHandover {
            return Err(LifecycleError::invalid_state(format!(
                "asset {} has a pending handover; settle it before retiring",
                asset_id
            )));
        }
        if self.store.get_active_assignment(asset_id).await?.is_some() {
            return Err(LifecycleError::invalid_state(format!(
                "asset {} has an active assignment; return it before retiring",
                asset_id
            )));
        }

        let previous = asset.status;
        let mut retired = asset;
        retired.status = AssetStatus::Retired;
        retired.updated_at = Utc::now();
        self.store.put_asset(retired.clone(), previous).await?;

        tracing::info!(asset_id, by = %identity.officer_id, "asset retired");
        let mut event = LifecycleEvent::new(LifecycleEventKind::AssetRetired, asset_id)
            .officer(&identity.officer_id);
        if let Some(reason) = reason {
            event = event.detail(reason);
        }
        self.emit(event).await;
        Ok(retired)
    }

    /// Put the asset back in circulation once exclusive maintenance ends.
    /// The restore target is derived from the active-assignment index, so no
    /// "previous status" field has to be stored.
    async fn restore_after_maintenance(
        &self,
        asset_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(), LifecycleError> {
        let asset = self.fetch_asset(asset_id).await?;
        if asset.status != AssetStatus::Maintenance {
            return Ok(());
        }
        let target = if self.store.get_active_assignment(asset_id).await?.is_some() {
            AssetStatus::Assigned
        } else {
            AssetStatus::Available
        };
        let mut restored = asset;
        restored.status = target;
        restored.updated_at = now;
        self.store
            .put_asset(restored, AssetStatus::Maintenance)
            .await?;
        Ok(())
    }

    async fn fetch_asset(&self, asset_id: &str) -> Result<Asset, LifecycleError> {
        self.store
            .get_asset(asset_id)
            .await?
            .ok_or_else(|| LifecycleError::not_found(RecordKind::Asset, asset_id))
    }

    async fn emit(&self, event: LifecycleEvent) {
        let kind = event.kind;
        if let Err(err) = self.sink.publish(event).await {
            // At-most-once: the transition is already committed.
            tracing::warn!(kind = %kind, error = %err, "lifecycle event dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use armory_notify::RecordingSink;
    use armory_store::InMemoryAssetStore;
    use armory_types::Role;
    use chrono::Duration;
    use rust_decimal::Decimal;

    struct Fixture {
        engine: LifecycleEngine,
        store: Arc<InMemoryAssetStore>,
        sink: Arc<RecordingSink>,
    }

    fn fixture_with(policy: MaintenancePolicy) -> Fixture {
        let store = Arc::new(InMemoryAssetStore::new());
        let sink = Arc::new(RecordingSink::new());
        let engine = LifecycleEngine::with_config(
            Arc::clone(&store) as Arc<dyn AssetStore>,
            Arc::clone(&sink) as Arc<dyn NotificationSink>,
            EngineConfig {
                maintenance_policy: policy,
            },
        );
        Fixture {
            engine,
            store,
            sink,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(MaintenancePolicy::NonBlocking)
    }

    fn inventory_officer() -> CallerIdentity {
        CallerIdentity::new("inventory-1", Role::Officer)
    }

    fn administrator() -> CallerIdentity {
        CallerIdentity::new("admin-1", Role::Administrator)
    }

    async fn registered_asset(fx: &Fixture) -> Asset {
        fx.engine
            .register_asset(
                &inventory_officer(),
                "Motorola APX900",
                AssetCategory::Radio,
                Some("SN-0042".to_string()),
                "Central",
                AssetCondition::Good,
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn assign_moves_available_asset_to_assigned() {
        let fx = fixture();
        let asset = registered_asset(&fx).await;
        let due = Utc::now() + Duration::days(7);

        let assignment = fx
            .engine
            .assign(&asset.id, "officer-x", Some(due), None)
            .await
            .unwrap();
        assert_eq!(assignment.status, AssignmentStatus::Active);
        assert_eq!(assignment.officer_id, "officer-x");

        let stored = fx.store.get_asset(&asset.id).await.unwrap().unwrap();
        assert_eq!(stored.status, AssetStatus::Assigned);

        let kinds = fx.sink.kinds().await;
        assert!(kinds.contains(&LifecycleEventKind::AssetAssigned));
    }

    #[tokio::test]
    async fn assign_non_available_asset_fails_and_leaves_state() {
        let fx = fixture();
        let asset = registered_asset(&fx).await;
        fx.engine.assign(&asset.id, "officer-x", None, None).await.unwrap();

        let err = fx
            .engine
            .assign(&asset.id, "officer-y", None, None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "invalid_state");

        let stored = fx.store.get_asset(&asset.id).await.unwrap().unwrap();
        assert_eq!(stored.status, AssetStatus::Assigned);
        let active = fx.store.get_active_assignment(&asset.id).await.unwrap().unwrap();
        assert_eq!(active.officer_id, "officer-x");
    }

    #[tokio::test]
    async fn concurrent_assign_has_exactly_one_winner() {
        let fx = fixture();
        let asset = registered_asset(&fx).await;

        let (a, b) = tokio::join!(
            fx.engine.assign(&asset.id, "officer-x", None, None),
            fx.engine.assign(&asset.id, "officer-y", None, None),
        );
        let outcomes = [a, b];
        let wins = outcomes.iter().filter(|r| r.is_ok()).count();
        assert_eq!(wins, 1);
        for outcome in &outcomes {
            if let Err(err) = outcome {
                assert!(matches!(err.code(), "conflict" | "invalid_state"));
            }
        }

        let assignments = fx.store.list_assignments().await.unwrap();
        assert_eq!(assignments.len(), 1);
    }

    #[tokio::test]
    async fn return_closes_assignment_and_frees_asset() {
        let fx = fixture();
        let asset = registered_asset(&fx).await;
        let assignment = fx.engine.assign(&asset.id, "officer-x", None, None).await.unwrap();

        let closed = fx.engine.return_asset(&assignment.id).await.unwrap();
        assert_eq!(closed.status, AssignmentStatus::Returned);
        assert!(closed.return_date.is_some());

        let stored = fx.store.get_asset(&asset.id).await.unwrap().unwrap();
        assert_eq!(stored.status, AssetStatus::Available);

        let err = fx.engine.return_asset(&assignment.id).await.unwrap_err();
        assert_eq!(err.code(), "invalid_state");
    }

    #[tokio::test]
    async fn pending_handover_blocks_return() {
        let fx = fixture();
        let asset = registered_asset(&fx).await;
        let assignment = fx.engine.assign(&asset.id, "officer-x", None, None).await.unwrap();
        fx.engine.initiate_handover(&asset.id, "officer-y").await.unwrap();

        let err = fx.engine.return_asset(&assignment.id).await.unwrap_err();
        assert_eq!(err.code(), "invalid_state");
        let stored = fx.store.get_asset(&asset.id).await.unwrap().unwrap();
        assert_eq!(stored.status, AssetStatus::PendingHandover);
    }

    #[tokio::test]
    async fn initiate_handover_parks_asset_pending() {
        let fx = fixture();
        let asset = registered_asset(&fx).await;
        fx.engine.assign(&asset.id, "officer-x", None, None).await.unwrap();

        let handover = fx.engine.initiate_handover(&asset.id, "officer-y").await.unwrap();
        assert_eq!(handover.status, HandoverStatus::Pending);
        assert_eq!(handover.from_officer_id, "officer-x");
        assert_eq!(handover.to_officer_id, "officer-y");

        let stored = fx.store.get_asset(&asset.id).await.unwrap().unwrap();
        assert_eq!(stored.status, AssetStatus::PendingHandover);
    }

    #[tokio::test]
    async fn handover_to_current_holder_is_validation_error() {
        let fx = fixture();
        let asset = registered_asset(&fx).await;
        fx.engine.assign(&asset.id, "officer-x", None, None).await.unwrap();

        let err = fx
            .engine
            .initiate_handover(&asset.id, "officer-x")
            .await
            .unwrap_err();
        assert_eq!(err.code(), "validation");
    }

    #[tokio::test]
    async fn handover_requires_assigned_asset() {
        let fx = fixture();
        let asset = registered_asset(&fx).await;
        let err = fx
            .engine
            .initiate_handover(&asset.id, "officer-y")
            .await
            .unwrap_err();
        assert_eq!(err.code(), "invalid_state");
    }

    #[tokio::test]
    async fn completed_handover_swaps_custody() {
        let fx = fixture();
        let asset = registered_asset(&fx).await;
        let original = fx.engine.assign(&asset.id, "officer-x", None, None).await.unwrap();
        let handover = fx.engine.initiate_handover(&asset.id, "officer-y").await.unwrap();

        let resolved = fx
            .engine
            .resolve_handover(&handover.id, HandoverDecision::Completed)
            .await
            .unwrap();
        assert_eq!(resolved.status, HandoverStatus::Completed);
        assert!(resolved.resolved_at.is_some());

        let old = fx.store.get_assignment(&original.id).await.unwrap().unwrap();
        assert_eq!(old.status, AssignmentStatus::Returned);

        let active = fx.store.get_active_assignment(&asset.id).await.unwrap().unwrap();
        assert_eq!(active.officer_id, "officer-y");
        assert_eq!(active.status, AssignmentStatus::Active);

        let stored = fx.store.get_asset(&asset.id).await.unwrap().unwrap();
        assert_eq!(stored.status, AssetStatus::Assigned);
    }

    #[tokio::test]
    async fn rejected_handover_restores_original_custody() {
        let fx = fixture();
        let asset = registered_asset(&fx).await;
        let original = fx.engine.assign(&asset.id, "officer-x", None, None).await.unwrap();
        let handover = fx.engine.initiate_handover(&asset.id, "officer-y").await.unwrap();

        fx.engine
            .resolve_handover(&handover.id, HandoverDecision::Rejected)
            .await
            .unwrap();

        let stored = fx.store.get_asset(&asset.id).await.unwrap().unwrap();
        assert_eq!(stored.status, AssetStatus::Assigned);

        let active = fx.store.get_active_assignment(&asset.id).await.unwrap().unwrap();
        assert_eq!(active.id, original.id);
        assert_eq!(active.officer_id, "officer-x");
        assert_eq!(active.status, AssignmentStatus::Active);
        assert!(active.return_date.is_none());
    }

    #[tokio::test]
    async fn resolving_twice_is_invalid_state() {
        let fx = fixture();
        let asset = registered_asset(&fx).await;
        fx.engine.assign(&asset.id, "officer-x", None, None).await.unwrap();
        let handover = fx.engine.initiate_handover(&asset.id, "officer-y").await.unwrap();
        fx.engine
            .resolve_handover(&handover.id, HandoverDecision::Rejected)
            .await
            .unwrap();

        let err = fx
            .engine
            .resolve_handover(&handover.id, HandoverDecision::Completed)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "invalid_state");
    }

    #[tokio::test]
    async fn completed_task_appends_one_frozen_history_record() {
        let fx = fixture();
        let asset = registered_asset(&fx).await;
        let task = fx
            .engine
            .schedule_maintenance(
                &asset.id,
                MaintenanceType::Corrective,
                MaintenancePriority::High,
                "tech-1",
                Utc::now(),
                Some(Decimal::new(12_50, 2)),
                None,
            )
            .await
            .unwrap();

        let done = fx
            .engine
            .update_maintenance_status(&task.id, MaintenanceStatus::Completed)
            .await
            .unwrap();
        assert!(done.completion_date.is_some());

        let err = fx
            .engine
            .update_maintenance_status(&task.id, MaintenanceStatus::Completed)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "invalid_state");

        let history = fx.store.list_maintenance_history(&asset.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].task_id, task.id);
        assert_eq!(history[0].cost, Some(Decimal::new(12_50, 2)));
        assert_eq!(history[0].performed_by, "tech-1");
    }

    #[tokio::test]
    async fn nonblocking_maintenance_leaves_asset_assignable() {
        let fx = fixture();
        let asset = registered_asset(&fx).await;
        fx.engine
            .schedule_maintenance(
                &asset.id,
                MaintenanceType::Preventive,
                MaintenancePriority::Low,
                "tech-1",
                Utc::now(),
                None,
                None,
            )
            .await
            .unwrap();

        let stored = fx.store.get_asset(&asset.id).await.unwrap().unwrap();
        assert_eq!(stored.status, AssetStatus::Available);
        fx.engine.assign(&asset.id, "officer-x", None, None).await.unwrap();
    }

    #[tokio::test]
    async fn exclusive_maintenance_blocks_assignment_until_terminal() {
        let fx = fixture_with(MaintenancePolicy::Exclusive);
        let asset = registered_asset(&fx).await;
        let task = fx
            .engine
            .schedule_maintenance(
                &asset.id,
                MaintenanceType::Calibration,
                MaintenancePriority::Medium,
                "tech-1",
                Utc::now(),
                None,
                None,
            )
            .await
            .unwrap();

        let stored = fx.store.get_asset(&asset.id).await.unwrap().unwrap();
        assert_eq!(stored.status, AssetStatus::Maintenance);
        let err = fx.engine.assign(&asset.id, "officer-x", None, None).await.unwrap_err();
        assert_eq!(err.code(), "invalid_state");

        fx.engine
            .update_maintenance_status(&task.id, MaintenanceStatus::InProgress)
            .await
            .unwrap();
        fx.engine
            .update_maintenance_status(&task.id, MaintenanceStatus::Completed)
            .await
            .unwrap();

        let restored = fx.store.get_asset(&asset.id).await.unwrap().unwrap();
        assert_eq!(restored.status, AssetStatus::Available);
        fx.engine.assign(&asset.id, "officer-x", None, None).await.unwrap();
    }

    #[tokio::test]
    async fn exclusive_maintenance_restores_assigned_when_custody_held() {
        let fx = fixture_with(MaintenancePolicy::Exclusive);
        let asset = registered_asset(&fx).await;
        fx.engine.assign(&asset.id, "officer-x", None, None).await.unwrap();
        let task = fx
            .engine
            .schedule_maintenance(
                &asset.id,
                MaintenanceType::Preventive,
                MaintenancePriority::Low,
                "tech-1",
                Utc::now(),
                None,
                None,
            )
            .await
            .unwrap();

        fx.engine
            .update_maintenance_status(&task.id, MaintenanceStatus::Cancelled)
            .await
            .unwrap();
        let restored = fx.store.get_asset(&asset.id).await.unwrap().unwrap();
        assert_eq!(restored.status, AssetStatus::Assigned);
    }

    #[tokio::test]
    async fn retire_is_administrator_only_and_needs_settled_custody() {
        let fx = fixture();
        let asset = registered_asset(&fx).await;

        let err = fx
            .engine
            .retire_asset(&inventory_officer(), &asset.id, None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "forbidden");

        fx.engine.assign(&asset.id, "officer-x", None, None).await.unwrap();
        let err = fx
            .engine
            .retire_asset(&administrator(), &asset.id, None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "invalid_state");

        let active = fx.store.get_active_assignment(&asset.id).await.unwrap().unwrap();
        fx.engine.return_asset(&active.id).await.unwrap();

        let retired = fx
            .engine
            .retire_asset(&administrator(), &asset.id, Some("damaged beyond repair"))
            .await
            .unwrap();
        assert_eq!(retired.status, AssetStatus::Retired);

        let err = fx
            .engine
            .retire_asset(&administrator(), &asset.id, None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "invalid_state");
    }

    #[tokio::test]
    async fn register_rejects_blank_fields() {
        let fx = fixture();
        let err = fx
            .engine
            .register_asset(
                &inventory_officer(),
                "   ",
                AssetCategory::Laptop,
                None,
                "Central",
                AssetCondition::New,
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "validation");
    }

    #[tokio::test]
    async fn every_mutation_publishes_an_event() {
        let fx = fixture();
        let asset = registered_asset(&fx).await;
        let assignment = fx.engine.assign(&asset.id, "officer-x", None, None).await.unwrap();
        fx.engine.return_asset(&assignment.id).await.unwrap();

        let kinds = fx.sink.kinds().await;
        assert_eq!(
            kinds,
            vec![
                LifecycleEventKind::AssetRegistered,
                LifecycleEventKind::AssetAssigned,
                LifecycleEventKind::AssetReturned,
            ]
        );
    }
}
