use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::json;
use tower::ServiceExt;

use super::common::*;
use crate::applications::{application_router, ApplicationService};

fn router() -> Router {
    let service = ApplicationService::new(
        Arc::new(MemoryRepository::default()),
        Arc::new(scoring_engine()),
    );
    application_router(Arc::new(service))
}

async fn send_json(
    router: &Router,
    method: Method,
    uri: &str,
    payload: serde_json::Value,
) -> axum::response::Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request should build");
    router
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond")
}

async fn send_get(router: &Router, uri: &str) -> axum::response::Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    router
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond")
}

fn submission_payload(candidate: &str, criteria: &str, with_resume: bool) -> serde_json::Value {
    let mut payload = json!({
        "candidate_id": candidate,
        "criteria": posting_criteria(criteria),
        "as_of": "2025-07-01",
    });
    if with_resume {
        payload["resume"] = json!(matching_resume());
    }
    payload
}

async fn submit(router: &Router, candidate: &str, criteria: &str) -> serde_json::Value {
    let response = send_json(
        router,
        Method::POST,
        "/api/v1/applications",
        submission_payload(candidate, criteria, true),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    read_json_body(response).await
}

#[tokio::test]
async fn submit_route_returns_created_records() {
    let router = router();

    let response = send_json(
        &router,
        Method::POST,
        "/api/v1/applications",
        submission_payload("cand-1", "crit-1", true),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json_body(response).await;
    assert!(body["id"].as_str().unwrap_or_default().starts_with("app-"));
    assert_eq!(body["status"], "pending");
    assert_eq!(body["version"], 1);
    assert_eq!(body["score"]["overall"], 100);
    assert_eq!(body["transitions"], json!([]));
}

#[tokio::test]
async fn submit_route_accepts_unscored_submissions() {
    let router = router();

    let response = send_json(
        &router,
        Method::POST,
        "/api/v1/applications",
        submission_payload("cand-1", "crit-1", false),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json_body(response).await;
    assert!(body["score"].is_null());
}

#[tokio::test]
async fn submit_route_rejects_invalid_criteria() {
    let router = router();
    let mut payload = submission_payload("cand-1", "crit-1", true);
    payload["criteria"]["required_skills"][0]["weight"] = json!(-1.0);

    let response = send_json(&router, Method::POST, "/api/v1/applications", payload).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert!(body["error"].as_str().unwrap_or_default().contains("weight"));
}

#[tokio::test]
async fn status_route_returns_the_stored_record() {
    let router = router();
    let created = submit(&router, "cand-1", "crit-1").await;
    let id = created["id"].as_str().expect("id should be a string");

    let response = send_get(&router, &format!("/api/v1/applications/{id}")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["id"], created["id"]);
    assert_eq!(body["status"], "pending");
}

#[tokio::test]
async fn status_route_returns_not_found_for_unknown_ids() {
    let response = send_get(&router(), "/api/v1/applications/app-999999").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn transition_route_applies_legal_moves() {
    let router = router();
    let created = submit(&router, "cand-1", "crit-1").await;
    let id = created["id"].as_str().expect("id should be a string");

    let response = send_json(
        &router,
        Method::POST,
        &format!("/api/v1/applications/{id}/transition"),
        json!({
            "requested_status": "under_review",
            "actor": "reviewer-7",
            "version": 1,
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["status"], "under_review");
    assert_eq!(body["version"], 2);
    assert_eq!(body["transitions"][0]["actor"], "reviewer-7");
}

#[tokio::test]
async fn transition_route_conflicts_on_illegal_moves() {
    let router = router();
    let created = submit(&router, "cand-1", "crit-1").await;
    let id = created["id"].as_str().expect("id should be a string");

    let response = send_json(
        &router,
        Method::POST,
        &format!("/api/v1/applications/{id}/transition"),
        json!({
            "requested_status": "accepted",
            "actor": "reviewer-7",
            "version": 1,
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = read_json_body(response).await;
    assert!(body["error"].as_str().unwrap_or_default().contains("cannot move"));
}

#[tokio::test]
async fn transition_route_fails_preconditions_on_stale_tokens() {
    let router = router();
    let created = submit(&router, "cand-1", "crit-1").await;
    let id = created["id"].as_str().expect("id should be a string");
    let uri = format!("/api/v1/applications/{id}/transition");

    let first = send_json(
        &router,
        Method::POST,
        &uri,
        json!({ "requested_status": "under_review", "actor": "reviewer-a", "version": 1 }),
    )
    .await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = send_json(
        &router,
        Method::POST,
        &uri,
        json!({ "requested_status": "shortlisted", "actor": "reviewer-b", "version": 1 }),
    )
    .await;

    assert_eq!(second.status(), StatusCode::PRECONDITION_FAILED);
    let body = read_json_body(second).await;
    assert_eq!(body["current_version"], 2);
}

#[tokio::test]
async fn transition_route_rejects_unknown_statuses() {
    let router = router();
    let created = submit(&router, "cand-1", "crit-1").await;
    let id = created["id"].as_str().expect("id should be a string");

    let response = send_json(
        &router,
        Method::POST,
        &format!("/api/v1/applications/{id}/transition"),
        json!({
            "requested_status": "archived",
            "actor": "reviewer-7",
            "version": 1,
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn opportunity_listing_orders_scored_records_first() {
    let router = router();
    submit(&router, "cand-scored", "crit-list").await;

    let unscored = send_json(
        &router,
        Method::POST,
        "/api/v1/applications",
        submission_payload("cand-unscored", "crit-list", false),
    )
    .await;
    assert_eq!(unscored.status(), StatusCode::CREATED);

    let response = send_get(&router, "/api/v1/opportunities/crit-list/applications").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["criteria_id"], "crit-list");
    let applications = body["applications"].as_array().expect("array expected");
    assert_eq!(applications.len(), 2);
    assert!(!applications[0]["score"].is_null());
    assert!(applications[1]["score"].is_null());
}
