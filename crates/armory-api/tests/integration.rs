//! Integration tests: full custody flows driven through the router.

use armory_api::server::{self, AppState};
use armory_engine::{EngineConfig, LifecycleEngine};
use armory_notify::RecordingSink;
use armory_query::QueryService;
use armory_store::InMemoryAssetStore;
use armory_types::{AssetStore, LifecycleEventKind, MaintenancePolicy, NotificationSink};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

fn test_app_with(policy: MaintenancePolicy) -> (axum::Router, Arc<RecordingSink>) {
    let store: Arc<dyn AssetStore> = Arc::new(InMemoryAssetStore::new());
    let sink = Arc::new(RecordingSink::new());
    let engine = Arc::new(LifecycleEngine::with_config(
        Arc::clone(&store),
        Arc::clone(&sink) as Arc<dyn NotificationSink>,
        EngineConfig {
            maintenance_policy: policy,
        },
    ));
    let query = Arc::new(QueryService::new(store));
    (
        server::router(Arc::new(AppState { engine, query })),
        sink,
    )
}

fn test_app() -> (axum::Router, Arc<RecordingSink>) {
    test_app_with(MaintenancePolicy::NonBlocking)
}

async fn post(app: &axum::Router, uri: &str, body: Value) -> Value {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(app: &axum::Router, uri: &str) -> Value {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn register_asset(app: &axum::Router, name: &str) -> String {
    let res = post(
        app,
        "/inventory/assets/register",
        json!({
            "name": name,
            "category": "radio",
            "serial_number": format!("SN-{}", name),
            "location": "Central",
            "requested_by": "inventory-1"
        }),
    )
    .await;
    assert_eq!(res["code"], 200);
    res["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn register_assign_return_flow() {
    let (app, _) = test_app();
    let asset_id = register_asset(&app, "Motorola APX900").await;

    let assigned = post(
        &app,
        "/inventory/assets/assign",
        json!({
            "asset_id": asset_id,
            "officer_id": "officer-x",
            "due_date": "2026-09-05T00:00:00Z"
        }),
    )
    .await;
    assert_eq!(assigned["code"], 200);
    assert_eq!(assigned["data"]["status"], "active");
    let assignment_id = assigned["data"]["id"].as_str().unwrap().to_string();

    let listed = get(&app, "/inventory/assignments?officer_id=officer-x").await;
    assert_eq!(listed["data"]["total"], 1);
    assert_eq!(listed["data"]["items"][0]["effective_status"], "active");

    let returned = post(
        &app,
        "/inventory/assets/return",
        json!({ "assignment_id": assignment_id }),
    )
    .await;
    assert_eq!(returned["code"], 200);
    assert_eq!(returned["data"]["status"], "returned");

    let search = get(&app, "/inventory/assets?status=available").await;
    assert_eq!(search["data"]["total"], 1);
    assert_eq!(search["data"]["items"][0]["id"], asset_id.as_str());
}

#[tokio::test]
async fn completed_handover_swaps_custody_end_to_end() {
    let (app, sink) = test_app();
    let asset_id = register_asset(&app, "Axon Body 3").await;
    post(
        &app,
        "/inventory/assets/assign",
        json!({ "asset_id": asset_id, "officer_id": "officer-x" }),
    )
    .await;

    let initiated = post(
        &app,
        "/inventory/handovers/initiate",
        json!({ "asset_id": asset_id, "to_officer_id": "officer-y" }),
    )
    .await;
    assert_eq!(initiated["code"], 200);
    assert_eq!(initiated["data"]["status"], "pending");
    assert_eq!(initiated["data"]["from_officer_id"], "officer-x");
    let handover_id = initiated["data"]["id"].as_str().unwrap().to_string();

    let pending = get(&app, "/inventory/assets?status=pending_handover").await;
    assert_eq!(pending["data"]["total"], 1);

    let resolved = post(
        &app,
        "/inventory/handovers/resolve",
        json!({ "handover_id": handover_id, "decision": "completed" }),
    )
    .await;
    assert_eq!(resolved["code"], 200);
    assert_eq!(resolved["data"]["status"], "completed");

    let active = get(
        &app,
        &format!("/inventory/assignments?asset_id={}&status=active", asset_id),
    )
    .await;
    assert_eq!(active["data"]["total"], 1);
    assert_eq!(active["data"]["items"][0]["officer_id"], "officer-y");

    let kinds = sink.kinds().await;
    assert!(kinds.contains(&LifecycleEventKind::HandoverPending));
    assert!(kinds.contains(&LifecycleEventKind::HandoverResolved));
}

#[tokio::test]
async fn rejected_handover_keeps_original_holder() {
    let (app, _) = test_app();
    let asset_id = register_asset(&app, "Dell Latitude").await;
    post(
        &app,
        "/inventory/assets/assign",
        json!({ "asset_id": asset_id, "officer_id": "officer-x" }),
    )
    .await;
    let initiated = post(
        &app,
        "/inventory/handovers/initiate",
        json!({ "asset_id": asset_id, "to_officer_id": "officer-y" }),
    )
    .await;
    let handover_id = initiated["data"]["id"].as_str().unwrap();

    let resolved = post(
        &app,
        "/inventory/handovers/resolve",
        json!({ "handover_id": handover_id, "decision": "rejected" }),
    )
    .await;
    assert_eq!(resolved["data"]["status"], "rejected");

    let active = get(
        &app,
        &format!("/inventory/assignments?asset_id={}&status=active", asset_id),
    )
    .await;
    assert_eq!(active["data"]["total"], 1);
    assert_eq!(active["data"]["items"][0]["officer_id"], "officer-x");

    let search = get(&app, "/inventory/assets?status=assigned").await;
    assert_eq!(search["data"]["total"], 1);
}

#[tokio::test]
async fn domain_errors_map_to_envelope_codes() {
    let (app, _) = test_app();

    // Unknown asset -> 404.
    let res = post(
        &app,
        "/inventory/assets/assign",
        json!({ "asset_id": "missing", "officer_id": "officer-x" }),
    )
    .await;
    assert_eq!(res["code"], 404);

    let asset_id = register_asset(&app, "Glock 17").await;
    post(
        &app,
        "/inventory/assets/assign",
        json!({ "asset_id": asset_id, "officer_id": "officer-x" }),
    )
    .await;

    // Double assignment -> 409.
    let res = post(
        &app,
        "/inventory/assets/assign",
        json!({ "asset_id": asset_id, "officer_id": "officer-y" }),
    )
    .await;
    assert_eq!(res["code"], 409);

    // Handover to the current holder -> 400.
    let res = post(
        &app,
        "/inventory/handovers/initiate",
        json!({ "asset_id": asset_id, "to_officer_id": "officer-x" }),
    )
    .await;
    assert_eq!(res["code"], 400);

    // Retire without administrator role -> 403.
    let res = post(
        &app,
        "/inventory/assets/retire",
        json!({ "asset_id": asset_id, "requested_by": "officer-x" }),
    )
    .await;
    assert_eq!(res["code"], 403);
}

#[tokio::test]
async fn retire_requires_settled_custody_then_succeeds() {
    let (app, _) = test_app();
    let asset_id = register_asset(&app, "Taser X26").await;

    let retired = post(
        &app,
        "/inventory/assets/retire",
        json!({
            "asset_id": asset_id,
            "reason": "damaged beyond repair",
            "requested_by": "admin-1",
            "requested_role": "administrator"
        }),
    )
    .await;
    assert_eq!(retired["code"], 200);
    assert_eq!(retired["data"]["status"], "retired");

    // Retired assets never leave the listing; no hard delete.
    let search = get(&app, "/inventory/assets?status=retired").await;
    assert_eq!(search["data"]["total"], 1);

    let again = post(
        &app,
        "/inventory/assets/retire",
        json!({
            "asset_id": asset_id,
            "requested_by": "admin-1",
            "requested_role": "administrator"
        }),
    )
    .await;
    assert_eq!(again["code"], 409);
}

#[tokio::test]
async fn maintenance_completion_appends_history_once() {
    let (app, _) = test_app();
    let asset_id = register_asset(&app, "Motorola APX900").await;

    let scheduled = post(
        &app,
        "/inventory/maintenance/schedule",
        json!({
            "asset_id": asset_id,
            "task_type": "corrective",
            "priority": "high",
            "assigned_to": "tech-1",
            "scheduled_date": "2026-09-01T09:00:00Z",
            "cost": "125.50"
        }),
    )
    .await;
    assert_eq!(scheduled["code"], 200);
    let task_id = scheduled["data"]["id"].as_str().unwrap().to_string();

    let completed = post(
        &app,
        "/inventory/maintenance/update",
        json!({ "task_id": task_id, "new_status": "completed" }),
    )
    .await;
    assert_eq!(completed["code"], 200);
    assert!(completed["data"]["completion_date"].is_string());

    let history = get(
        &app,
        &format!("/inventory/maintenance/history?asset_id={}", asset_id),
    )
    .await;
    let records = history["data"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["performed_by"], "tech-1");
    assert_eq!(records[0]["cost"], "125.50");

    // Completing twice is rejected and appends nothing.
    let again = post(
        &app,
        "/inventory/maintenance/update",
        json!({ "task_id": task_id, "new_status": "completed" }),
    )
    .await;
    assert_eq!(again["code"], 409);
    let history = get(
        &app,
        &format!("/inventory/maintenance/history?asset_id={}", asset_id),
    )
    .await;
    assert_eq!(history["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn exclusive_policy_blocks_assignment_during_maintenance() {
    let (app, _) = test_app_with(MaintenancePolicy::Exclusive);
    let asset_id = register_asset(&app, "Dell Latitude").await;

    post(
        &app,
        "/inventory/maintenance/schedule",
        json!({
            "asset_id": asset_id,
            "task_type": "calibration",
            "priority": "medium",
            "assigned_to": "tech-1",
            "scheduled_date": "2026-09-01T09:00:00Z"
        }),
    )
    .await;

    let res = post(
        &app,
        "/inventory/assets/assign",
        json!({ "asset_id": asset_id, "officer_id": "officer-x" }),
    )
    .await;
    assert_eq!(res["code"], 409);

    let search = get(&app, "/inventory/assets?status=maintenance").await;
    assert_eq!(search["data"]["total"], 1);
}

#[tokio::test]
async fn asset_search_filters_and_paginates() {
    let (app, _) = test_app();
    for name in ["Radio Alpha", "Radio Bravo", "Radio Charlie"] {
        register_asset(&app, name).await;
    }

    let by_text = get(&app, "/inventory/assets?q=bravo").await;
    assert_eq!(by_text["data"]["total"], 1);
    assert_eq!(by_text["data"]["items"][0]["name"], "Radio Bravo");

    let page = get(&app, "/inventory/assets?limit=2&offset=2").await;
    assert_eq!(page["data"]["total"], 3);
    assert_eq!(page["data"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(page["data"]["items"][0]["name"], "Radio Charlie");

    let by_category = get(&app, "/inventory/assets?category=radio").await;
    assert_eq!(by_category["data"]["total"], 3);
}

#[tokio::test]
async fn health_endpoint() {
    let (app, _) = test_app();
    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}
