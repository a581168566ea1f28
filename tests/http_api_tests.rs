#![cfg(feature = "http_api")]

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use taskplan::{Plan, PlanDocument, RegistrationSettings, http_api};
use tower::util::ServiceExt;

fn new_router() -> axum::Router {
    let state = http_api::AppState::new(Plan::new("Launch"), RegistrationSettings::default());
    http_api::router(state)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn plan_editing_and_scheduling_via_http_api() {
    let app = new_router();

    // Anchor the root
    let document = json!({
        "data": {"id": "root", "text": "Launch", "endDate": "2024-01-10"},
        "connections": []
    });
    let response = app
        .clone()
        .oneshot(json_request("PUT", "/plan", document))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Add a prerequisite
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/plan/nodes",
            json!({"parent_id": "root", "text": "Design", "side": "before", "effort": 2}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = read_json(response).await;
    assert_eq!(created["id"], "task-1");

    // Schedule as of a fixed day
    let response = app
        .clone()
        .oneshot(json_request("POST", "/schedule", json!({"today": "2024-01-01"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let scheduled: PlanDocument = serde_json::from_slice(&bytes).unwrap();
    let design = &scheduled.data.children[0];
    assert_eq!(design.start_date.unwrap().to_string(), "2024-01-08");
    assert_eq!(design.end_date.unwrap().to_string(), "2024-01-09");

    // Critical path covers both tasks
    let response = app
        .clone()
        .oneshot(empty_request("GET", "/critical-path"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let analysis = read_json(response).await;
    assert_eq!(analysis["critical_node_ids"], json!(["root", "task-1"]));
    assert_eq!(analysis["critical_chain"], json!(["task-1", "root"]));

    // Delete the task
    let response = app
        .clone()
        .oneshot(empty_request("DELETE", "/plan/nodes/task-1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let removed = read_json(response).await;
    assert_eq!(removed["removed"], json!(["task-1"]));
}

#[tokio::test]
async fn edge_errors_map_to_status_codes() {
    let app = new_router();
    for text in ["A", "B"] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/plan/nodes",
                json!({"parent_id": "root", "text": text}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/plan/edges",
            json!({"from_id": "task-1", "to_id": "task-2"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(read_json(response).await["id"], "conn-1");

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/plan/edges",
            json!({"from_id": "task-2", "to_id": "task-1"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(read_json(response).await["error"], "conflict");

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/plan/edges",
            json!({"from_id": "task-1", "to_id": "task-1"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", "/plan/edges/conn-7"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", "/plan/edges/conn-1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn move_and_detach_tasks() {
    let app = new_router();
    for text in ["A", "B"] {
        app.clone()
            .oneshot(json_request(
                "POST",
                "/plan/nodes",
                json!({"parent_id": "root", "text": text}),
            ))
            .await
            .unwrap();
    }

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/plan/nodes/task-2/move",
            json!({"new_parent_id": "task-1"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/plan/nodes/task-1/move",
            json!({"new_parent_id": "task-2"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(empty_request("POST", "/plan/nodes/task-2/detach"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(empty_request("POST", "/plan/nodes/missing/detach"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let plan = read_json(app.clone().oneshot(empty_request("GET", "/plan")).await.unwrap()).await;
    let children = plan["data"]["children"].as_array().unwrap();
    assert_eq!(children.len(), 2);
    assert_eq!(children[1]["id"], "task-2");
    assert_eq!(children[1]["side"], "after");
}

#[tokio::test]
async fn settings_drive_the_registration_payload() {
    let app = new_router();

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/registration-payload"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/settings",
            json!({"relation_mode": "dependency", "create_root_issue": true}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    app.clone()
        .oneshot(json_request(
            "POST",
            "/plan/nodes",
            json!({"parent_id": "root", "text": "Build"}),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/registration-payload"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload["relation_mode"], "dependency");
    assert_eq!(payload["tasks"][0]["id"], "root");
    assert_eq!(payload["tasks"][1]["dependencies"], json!(["root"]));

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/health"))
        .await
        .unwrap();
    assert_eq!(read_json(response).await["status"], "ok");
}

#[tokio::test]
async fn invalid_schedule_date_is_rejected() {
    let app = new_router();
    let response = app
        .clone()
        .oneshot(json_request("POST", "/schedule", json!({"today": "someday"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
