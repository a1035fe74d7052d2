//! Snapshot queries over the asset store.
//!
//! Everything here reads a full insertion-ordered snapshot, filters it, and
//! cuts an offset/limit window. Results may run stale by one read against
//! concurrent writers; retrying is always safe.

use armory_types::{
    Asset, AssetCategory, AssetStatus, AssetStore, Assignment, AssignmentStatus, AssignmentView,
    Handover, HandoverStatus, MaintenanceRecord, MaintenanceStatus, MaintenanceTask, Paged,
    StoreError,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

const DEFAULT_LIMIT: usize = 50;

/// Offset/limit window. A zero limit falls back to the default.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub limit: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Page {
    fn limit(&self) -> usize {
        if self.limit == 0 {
            DEFAULT_LIMIT
        } else {
            self.limit
        }
    }

    fn cut<T>(&self, items: Vec<T>) -> Paged<T> {
        let total = items.len();
        let limit = self.limit();
        let window = items.into_iter().skip(self.offset).take(limit).collect();
        Paged {
            items: window,
            total,
            offset: self.offset,
            limit,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AssetFilter {
    /// Case-insensitive substring match on name, serial number, or category.
    pub text: Option<String>,
    pub category: Option<AssetCategory>,
    pub status: Option<AssetStatus>,
    pub location: Option<String>,
    pub page: Page,
}

#[derive(Debug, Clone, Default)]
pub struct AssignmentFilter {
    pub officer_id: Option<String>,
    pub asset_id: Option<String>,
    /// Matched against the effective status, so `Overdue` finds active
    /// assignments whose due date has passed.
    pub status: Option<AssignmentStatus>,
    pub page: Page,
}

#[derive(Debug, Clone, Default)]
pub struct HandoverFilter {
    pub asset_id: Option<String>,
    pub status: Option<HandoverStatus>,
    pub page: Page,
}

#[derive(Debug, Clone, Default)]
pub struct MaintenanceFilter {
    pub asset_id: Option<String>,
    pub status: Option<MaintenanceStatus>,
    pub page: Page,
}

/// Read-only query API over [`AssetStore`] snapshots.
pub struct QueryService {
    store: Arc<dyn AssetStore>,
}

impl QueryService {
    pub fn new(store: Arc<dyn AssetStore>) -> Self {
        Self { store }
    }

    pub async fn search_assets(&self, filter: &AssetFilter) -> Result<Paged<Asset>, StoreError> {
        let needle = filter.text.as_deref().map(str::to_lowercase);
        let location = filter.location.as_deref().map(str::to_lowercase);
        let matches: Vec<Asset> = self
            .store
            .list_assets()
            .await?
            .into_iter()
            .filter(|a| filter.category.is_none_or(|c| a.category == c))
            .filter(|a| filter.status.is_none_or(|s| a.status == s))
            .filter(|a| {
                location
                    .as_deref()
                    .is_none_or(|l| a.location.to_lowercase() == l)
            })
            .filter(|a| {
                needle.as_deref().is_none_or(|n| {
                    a.name.to_lowercase().contains(n)
                        || a.serial_number
                            .as_deref()
                            .is_some_and(|s| s.to_lowercase().contains(n))
                        || a.category.as_str().contains(n)
                })
            })
            .collect();
        Ok(filter.page.cut(matches))
    }

    /// Assignments with their status as observed now: `Overdue` is derived
    /// at read time, never read back from the store.
    pub async fn list_assignments(
        &self,
        filter: &AssignmentFilter,
    ) -> Result<Paged<AssignmentView>, StoreError> {
        let now = Utc::now();
        let matches: Vec<AssignmentView> = self
            .store
            .list_assignments()
            .await?
            .into_iter()
            .filter(|a| {
                filter
                    .officer_id
                    .as_deref()
                    .is_none_or(|o| a.officer_id == o)
            })
            .filter(|a| filter.asset_id.as_deref().is_none_or(|id| a.asset_id == id))
            .map(|a| AssignmentView::observed_at(a, now))
            .filter(|v| filter.status.is_none_or(|s| v.effective_status == s))
            .collect();
        Ok(filter.page.cut(matches))
    }

    pub async fn list_handovers(
        &self,
        filter: &HandoverFilter,
    ) -> Result<Paged<Handover>, StoreError> {
        let matches: Vec<Handover> = self
            .store
            .list_handovers()
            .await?
            .into_iter()
            .filter(|h| filter.asset_id.as_deref().is_none_or(|id| h.asset_id == id))
            .filter(|h| filter.status.is_none_or(|s| h.status == s))
            .collect();
        Ok(filter.page.cut(matches))
    }

    pub async fn list_maintenance(
        &self,
        filter: &MaintenanceFilter,
    ) -> Result<Paged<MaintenanceTask>, StoreError> {
        let matches: Vec<MaintenanceTask> = self
            .store
            .list_tasks()
            .await?
            .into_iter()
            .filter(|t| filter.asset_id.as_deref().is_none_or(|id| t.asset_id == id))
            .filter(|t| filter.status.is_none_or(|s| t.status == s))
            .collect();
        Ok(filter.page.cut(matches))
    }

    pub async fn maintenance_history(
        &self,
        asset_id: &str,
    ) -> Result<Vec<MaintenanceRecord>, StoreError> {
        self.store.list_maintenance_history(asset_id).await
    }
}
