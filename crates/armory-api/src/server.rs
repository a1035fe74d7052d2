//! Axum router and handlers.
//!
//! Responses use the `{code, message, data}` envelope with the domain code
//! in the body. Caller identity is resolved once here, at the boundary, and
//! passed into the engine; missing identities fall back to "Unknown".

use armory_engine::LifecycleEngine;
use armory_query::{
    AssetFilter, AssignmentFilter, HandoverFilter, MaintenanceFilter, Page, QueryService,
};
use armory_types::{
    AssetCategory, AssetStatus, AssignAssetRequest, Assignment, AssignmentStatus, AssignmentView,
    Asset, BaseResponse, CallerIdentity, Handover, HandoverStatus, InitiateHandoverRequest,
    LifecycleError, MaintenanceRecord, MaintenanceStatus, MaintenanceTask, Paged,
    RegisterAssetRequest, ResolveHandoverRequest, RetireAssetRequest, ReturnAssetRequest, Role,
    ScheduleMaintenanceRequest, StoreError, UpdateMaintenanceRequest,
};
use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub struct AppState {
    pub engine: Arc<LifecycleEngine>,
    pub query: Arc<QueryService>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/inventory/assets/register", post(handle_register))
        .route("/inventory/assets/assign", post(handle_assign))
        .route("/inventory/assets/return", post(handle_return))
        .route("/inventory/assets/retire", post(handle_retire))
        .route("/inventory/handovers/initiate", post(handle_initiate))
        .route("/inventory/handovers/resolve", post(handle_resolve))
        .route("/inventory/maintenance/schedule", post(handle_schedule))
        .route("/inventory/maintenance/update", post(handle_update_maintenance))
        .route("/inventory/assets", get(handle_search_assets))
        .route("/inventory/assignments", get(handle_list_assignments))
        .route("/inventory/handovers", get(handle_list_handovers))
        .route("/inventory/maintenance", get(handle_list_maintenance))
        .route("/inventory/maintenance/history", get(handle_history))
        .route("/health", get(handle_health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn identity(requested_by: &Option<String>, role: Option<Role>) -> CallerIdentity {
    CallerIdentity::resolve(requested_by.as_deref(), role)
}

fn failure<T>(err: LifecycleError) -> BaseResponse<T> {
    let code = match err.code() {
        "validation" => 400,
        "forbidden" => 403,
        "not_found" => 404,
        "invalid_state" | "conflict" => 409,
        _ => 500,
    };
    BaseResponse::error(code, err.to_string())
}

fn store_failure<T>(err: StoreError) -> BaseResponse<T> {
    BaseResponse::error(500, err.to_string())
}

async fn handle_register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterAssetRequest>,
) -> Json<BaseResponse<Asset>> {
    let caller = identity(&req.requested_by, req.requested_role);
    let category = AssetCategory::parse(&req.category);
    match state
        .engine
        .register_asset(
            &caller,
            &req.name,
            category,
            req.serial_number.clone(),
            &req.location,
            req.condition,
        )
        .await
    {
        Ok(asset) => Json(BaseResponse::ok(asset)),
        Err(err) => Json(failure(err)),
    }
}

async fn handle_assign(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AssignAssetRequest>,
) -> Json<BaseResponse<Assignment>> {
    match state
        .engine
        .assign(&req.asset_id, &req.officer_id, req.due_date, req.notes.clone())
        .await
    {
        Ok(assignment) => Json(BaseResponse::ok(assignment)),
        Err(err) => Json(failure(err)),
    }
}

async fn handle_return(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReturnAssetRequest>,
) -> Json<BaseResponse<Assignment>> {
    match state.engine.return_asset(&req.assignment_id).await {
        Ok(assignment) => Json(BaseResponse::ok(assignment)),
        Err(err) => Json(failure(err)),
    }
}

async fn handle_retire(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RetireAssetRequest>,
) -> Json<BaseResponse<Asset>> {
    let caller = identity(&req.requested_by, req.requested_role);
    match state
        .engine
        .retire_asset(&caller, &req.asset_id, req.reason.as_deref())
        .await
    {
        Ok(asset) => Json(BaseResponse::ok(asset)),
        Err(err) => Json(failure(err)),
    }
}

async fn handle_initiate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<InitiateHandoverRequest>,
) -> Json<BaseResponse<Handover>> {
    match state
        .engine
        .initiate_handover(&req.asset_id, &req.to_officer_id)
        .await
    {
        Ok(handover) => Json(BaseResponse::ok(handover)),
        Err(err) => Json(failure(err)),
    }
}

async fn handle_resolve(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResolveHandoverRequest>,
) -> Json<BaseResponse<Handover>> {
    match state
        .engine
        .resolve_handover(&req.handover_id, req.decision)
        .await
    {
        Ok(handover) => Json(BaseResponse::ok(handover)),
        Err(err) => Json(failure(err)),
    }
}

async fn handle_schedule(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ScheduleMaintenanceRequest>,
) -> Json<BaseResponse<MaintenanceTask>> {
    match state
        .engine
        .schedule_maintenance(
            &req.asset_id,
            req.task_type,
            req.priority,
            &req.assigned_to,
            req.scheduled_date,
            req.cost,
            req.notes.clone(),
        )
        .await
    {
        Ok(task) => Json(BaseResponse::ok(task)),
        Err(err) => Json(failure(err)),
    }
}

async fn handle_update_maintenance(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateMaintenanceRequest>,
) -> Json<BaseResponse<MaintenanceTask>> {
    match state
        .engine
        .update_maintenance_status(&req.task_id, req.new_status)
        .await
    {
        Ok(task) => Json(BaseResponse::ok(task)),
        Err(err) => Json(failure(err)),
    }
}

#[derive(Debug, Deserialize)]
pub struct AssetSearchQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub status: Option<AssetStatus>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub limit: usize,
}

async fn handle_search_assets(
    State(state): State<Arc<AppState>>,
    Query(q): Query<AssetSearchQuery>,
) -> Json<BaseResponse<Paged<Asset>>> {
    let filter = AssetFilter {
        text: q.q,
        category: q.category.as_deref().map(AssetCategory::parse),
        status: q.status,
        location: q.location,
        page: Page {
            offset: q.offset,
            limit: q.limit,
        },
    };
    match state.query.search_assets(&filter).await {
        Ok(paged) => Json(BaseResponse::ok(paged)),
        Err(err) => Json(store_failure(err)),
    }
}

#[derive(Debug, Deserialize)]
pub struct AssignmentListQuery {
    #[serde(default)]
    pub officer_id: Option<String>,
    #[serde(default)]
    pub asset_id: Option<String>,
    #[serde(default)]
    pub status: Option<AssignmentStatus>,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub limit: usize,
}

async fn handle_list_assignments(
    State(state): State<Arc<AppState>>,
    Query(q): Query<AssignmentListQuery>,
) -> Json<BaseResponse<Paged<AssignmentView>>> {
    let filter = AssignmentFilter {
        officer_id: q.officer_id,
        asset_id: q.asset_id,
        status: q.status,
        page: Page {
            offset: q.offset,
            limit: q.limit,
        },
    };
    match state.query.list_assignments(&filter).await {
        Ok(paged) => Json(BaseResponse::ok(paged)),
        Err(err) => Json(store_failure(err)),
    }
}

#[derive(Debug, Deserialize)]
pub struct HandoverListQuery {
    #[serde(default)]
    pub asset_id: Option<String>,
    #[serde(default)]
    pub status: Option<HandoverStatus>,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub limit: usize,
}

async fn handle_list_handovers(
    State(state): State<Arc<AppState>>,
    Query(q): Query<HandoverListQuery>,
) -> Json<BaseResponse<Paged<Handover>>> {
    let filter = HandoverFilter {
        asset_id: q.asset_id,
        status: q.status,
        page: Page {
            offset: q.offset,
            limit: q.limit,
        },
    };
    match state.query.list_handovers(&filter).await {
        Ok(paged) => Json(BaseResponse::ok(paged)),
        Err(err) => Json(store_failure(err)),
    }
}

#[derive(Debug, Deserialize)]
pub struct MaintenanceListQuery {
    #[serde(default)]
    pub asset_id: Option<String>,
    #[serde(default)]
    pub status: Option<MaintenanceStatus>,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub limit: usize,
}

async fn handle_list_maintenance(
    State(state): State<Arc<AppState>>,
    Query(q): Query<MaintenanceListQuery>,
) -> Json<BaseResponse<Paged<MaintenanceTask>>> {
    let filter = MaintenanceFilter {
        asset_id: q.asset_id,
        status: q.status,
        page: Page {
            offset: q.offset,
            limit: q.limit,
        },
    };
    match state.query.list_maintenance(&filter).await {
        Ok(paged) => Json(BaseResponse::ok(paged)),
        Err(err) => Json(store_failure(err)),
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub asset_id: String,
}

async fn handle_history(
    State(state): State<Arc<AppState>>,
    Query(q): Query<HistoryQuery>,
) -> Json<BaseResponse<Vec<MaintenanceRecord>>> {
    match state.query.maintenance_history(&q.asset_id).await {
        Ok(records) => Json(BaseResponse::ok(records)),
        Err(err) => Json(store_failure(err)),
    }
}

async fn handle_health() -> &'static str {
    "ok"
}
