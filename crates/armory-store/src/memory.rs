//! In-memory asset store with conditional writes.

use armory_types::{
    Asset, AssetStatus, AssetStore, Assignment, AssignmentStatus, Handover, HandoverStatus,
    MaintenanceRecord, MaintenanceStatus, MaintenanceTask, RecordKind, StoreError,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Row wrapper carrying a monotonic insertion sequence so listings come back
/// in stable insertion order regardless of hash-map iteration.
struct Entry<T> {
    seq: u64,
    value: T,
}

struct Table<T> {
    rows: HashMap<String, Entry<T>>,
    next_seq: u64,
}

impl<T: Clone> Table<T> {
    fn new() -> Self {
        Self {
            rows: HashMap::new(),
            next_seq: 0,
        }
    }

    fn insert(&mut self, id: String, value: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.rows.insert(id, Entry { seq, value });
    }

    fn get(&self, id: &str) -> Option<T> {
        self.rows.get(id).map(|e| e.value.clone())
    }

    fn snapshot(&self) -> Vec<T> {
        let mut entries: Vec<&Entry<T>> = self.rows.values().collect();
        entries.sort_by_key(|e| e.seq);
        entries.into_iter().map(|e| e.value.clone()).collect()
    }
}

/// In-memory implementation of [`AssetStore`].
///
/// Every conditional `put_*` compares the stored record's status against the
/// caller's expectation under the table's write lock, so per-record writes
/// linearize without a global mutex. The active-assignment index is
/// maintained under the assignments write lock and rejects a second active
/// assignment for the same asset.
pub struct InMemoryAssetStore {
    assets: Arc<RwLock<Table<Asset>>>,
    assignments: Arc<RwLock<AssignmentTable>>,
    handovers: Arc<RwLock<Table<Handover>>>,
    tasks: Arc<RwLock<Table<MaintenanceTask>>>,
    /// Append-only, insertion order.
    history: Arc<RwLock<Vec<MaintenanceRecord>>>,
}

struct AssignmentTable {
    table: Table<Assignment>,
    /// asset_id -> assignment_id of the single active assignment.
    active_index: HashMap<String, String>,
}

impl InMemoryAssetStore {
    pub fn new() -> Self {
        Self {
            assets: Arc::new(RwLock::new(Table::new())),
            assignments: Arc::new(RwLock::new(AssignmentTable {
                table: Table::new(),
                active_index: HashMap::new(),
            })),
            handovers: Arc::new(RwLock::new(Table::new())),
            tasks: Arc::new(RwLock::new(Table::new())),
            history: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for InMemoryAssetStore {
    fn default() -> Self {
        Self::new()
    }
}

fn mismatch(
    kind: RecordKind,
    id: &str,
    expected: impl ToString,
    actual: impl ToString,
) -> StoreError {
    StoreError::StatusMismatch {
        kind,
        id: id.to_string(),
        expected: expected.to_string(),
        actual: actual.to_string(),
    }
}

#[async_trait::async_trait]
impl AssetStore for InMemoryAssetStore {
    async fn add_asset(&self, asset: Asset) -> Result<(), StoreError> {
        let mut guard = self.assets.write().await;
        if guard.rows.contains_key(&asset.id) {
            return Err(StoreError::AlreadyExists {
                kind: RecordKind::Asset,
                id: asset.id,
            });
        }
        guard.insert(asset.id.clone(), asset);
        Ok(())
    }

    async fn get_asset(&self, id: &str) -> Result<Option<Asset>, StoreError> {
        Ok(self.assets.read().await.get(id))
    }

    async fn put_asset(&self, asset: Asset, expected: AssetStatus) -> Result<(), StoreError> {
        let mut guard = self.assets.write().await;
        let entry = guard.rows.get_mut(&asset.id).ok_or_else(|| StoreError::NotFound {
            kind: RecordKind::Asset,
            id: asset.id.clone(),
        })?;
        if entry.value.status != expected {
            return Err(mismatch(
                RecordKind::Asset,
                &asset.id,
                expected,
                entry.value.status,
            ));
        }
        entry.value = asset;
        Ok(())
    }

    async fn list_assets(&self) -> Result<Vec<Asset>, StoreError> {
        Ok(self.assets.read().await.snapshot())
    }

    async fn add_assignment(&self, assignment: Assignment) -> Result<(), StoreError> {
        let mut guard = self.assignments.write().await;
        if guard.table.rows.contains_key(&assignment.id) {
            return Err(StoreError::AlreadyExists {
                kind: RecordKind::Assignment,
                id: assignment.id,
            });
        }
        if assignment.is_active() && guard.active_index.contains_key(&assignment.asset_id) {
            return Err(StoreError::ActiveAssignmentExists {
                asset_id: assignment.asset_id,
            });
        }
        if assignment.is_active() {
            guard
                .active_index
                .insert(assignment.asset_id.clone(), assignment.id.clone());
        }
        guard.table.insert(assignment.id.clone(), assignment);
        Ok(())
    }

    async fn get_assignment(&self, id: &str) -> Result<Option<Assignment>, StoreError> {
        Ok(self.assignments.read().await.table.get(id))
    }

    async fn put_assignment(
        &self,
        assignment: Assignment,
        expected: AssignmentStatus,
    ) -> Result<(), StoreError> {
        let mut guard = self.assignments.write().await;
        let current = match guard.table.rows.get(&assignment.id) {
            Some(e) => e.value.clone(),
            None => {
                return Err(StoreError::NotFound {
                    kind: RecordKind::Assignment,
                    id: assignment.id,
                })
            }
        };
        if current.status != expected {
            return Err(mismatch(
                RecordKind::Assignment,
                &assignment.id,
                expected.as_str(),
                current.status.as_str(),
            ));
        }
        if assignment.is_active() && !current.is_active() {
            // Re-activating a closed assignment must respect the index.
            if let Some(existing) = guard.active_index.get(&assignment.asset_id) {
                if existing != &assignment.id {
                    return Err(StoreError::ActiveAssignmentExists {
                        asset_id: assignment.asset_id,
                    });
                }
            }
            guard
                .active_index
                .insert(assignment.asset_id.clone(), assignment.id.clone());
        }
        if !assignment.is_active() && current.is_active() {
            guard.active_index.remove(&assignment.asset_id);
        }
        let entry = guard
            .table
            .rows
            .get_mut(&assignment.id)
            .ok_or_else(|| StoreError::NotFound {
                kind: RecordKind::Assignment,
                id: assignment.id.clone(),
            })?;
        entry.value = assignment;
        Ok(())
    }

    async fn get_active_assignment(
        &self,
        asset_id: &str,
    ) -> Result<Option<Assignment>, StoreError> {
        let guard = self.assignments.read().await;
        Ok(guard
            .active_index
            .get(asset_id)
            .and_then(|id| guard.table.get(id)))
    }

    async fn list_assignments(&self) -> Result<Vec<Assignment>, StoreError> {
        Ok(self.assignments.read().await.table.snapshot())
    }

    async fn add_handover(&self, handover: Handover) -> Result<(), StoreError> {
        let mut guard = self.handovers.write().await;
        if guard.rows.contains_key(&handover.id) {
            return Err(StoreError::AlreadyExists {
                kind: RecordKind::Handover,
                id: handover.id,
            });
        }
        guard.insert(handover.id.clone(), handover);
        Ok(())
    }

    async fn get_handover(&self, id: &str) -> Result<Option<Handover>, StoreError> {
        Ok(self.handovers.read().await.get(id))
    }

    async fn put_handover(
        &self,
        handover: Handover,
        expected: HandoverStatus,
    ) -> Result<(), StoreError> {
        let mut guard = self.handovers.write().await;
        let entry = guard
            .rows
            .get_mut(&handover.id)
            .ok_or_else(|| StoreError::NotFound {
                kind: RecordKind::Handover,
                id: handover.id.clone(),
            })?;
        if entry.value.status != expected {
            return Err(mismatch(
                RecordKind::Handover,
                &handover.id,
                expected.as_str(),
                entry.value.status.as_str(),
            ));
        }
        entry.value = handover;
        Ok(())
    }

    async fn list_handovers(&self) -> Result<Vec<Handover>, StoreError> {
        Ok(self.handovers.read().await.snapshot())
    }

    async fn add_task(&self, task: MaintenanceTask) -> Result<(), StoreError> {
        let mut guard = self.tasks.write().await;
        if guard.rows.contains_key(&task.id) {
            return Err(StoreError::AlreadyExists {
                kind: RecordKind::MaintenanceTask,
                id: task.id,
            });
        }
        guard.insert(task.id.clone(), task);
        Ok(())
    }

    async fn get_task(&self, id: &str) -> Result<Option<MaintenanceTask>, StoreError> {
        Ok(self.tasks.read().await.get(id))
    }

    async fn put_task(
        &self,
        task: MaintenanceTask,
        expected: MaintenanceStatus,
    ) -> Result<(), StoreError> {
        let mut guard = self.tasks.write().await;
        let entry = guard.rows.get_mut(&task.id).ok_or_else(|| StoreError::NotFound {
            kind: RecordKind::MaintenanceTask,
            id: task.id.clone(),
        })?;
        if entry.value.status != expected {
            return Err(mismatch(
                RecordKind::MaintenanceTask,
                &task.id,
                expected.as_str(),
                entry.value.status.as_str(),
            ));
        }
        entry.value = task;
        Ok(())
    }

    async fn list_tasks(&self) -> Result<Vec<MaintenanceTask>, StoreError> {
        Ok(self.tasks.read().await.snapshot())
    }

    async fn append_maintenance_record(
        &self,
        record: MaintenanceRecord,
    ) -> Result<(), StoreError> {
        self.history.write().await.push(record);
        Ok(())
    }

    async fn list_maintenance_history(
        &self,
        asset_id: &str,
    ) -> Result<Vec<MaintenanceRecord>, StoreError> {
        let guard = self.history.read().await;
        Ok(guard
            .iter()
            .filter(|r| r.asset_id == asset_id)
            .cloned()
            .collect())
    }
}
