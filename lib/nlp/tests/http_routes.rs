// SPDX-FileCopyrightText: Copyright (c) 2025-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use common::{ScriptedClassifier, failing_service, service_with};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use wanderto_nlp::http::{HttpService, router};

async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn labels(categories: &Value) -> Vec<String> {
    categories
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["label"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_categories_lists_configured_labels() {
    let app = router(service_with(Arc::new(ScriptedClassifier::default()), 2, 20));
    let (status, body) = send(app, get("/categories")).await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body, json!({"categories": ["alpha", "beta", "gamma"]}));
}

#[tokio::test]
async fn test_classify_returns_ranked_categories() {
    let app = router(service_with(Arc::new(ScriptedClassifier::default()), 2, 20));
    let (status, body) = send(
        app,
        post_json("/classify", json!({"text": "anything", "threshold": 0.3})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(labels(&body["categories"]), vec!["beta", "gamma"]);
}

#[tokio::test]
async fn test_classify_uses_default_threshold() {
    let app = router(service_with(Arc::new(ScriptedClassifier::default()), 2, 20));
    let (status, body) = send(app, post_json("/classify", json!({"text": "anything"}))).await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(labels(&body["categories"]), vec!["beta", "gamma", "alpha"]);
}

#[tokio::test]
async fn test_classify_failure_is_server_error() {
    let app = router(service_with(Arc::new(ScriptedClassifier::default()), 2, 20));
    let (status, body) = send(app, post_json("/classify", json!({"text": "fail please"}))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert!(body["detail"].as_str().unwrap().contains("scripted failure"));
}

#[tokio::test]
async fn test_malformed_body_is_client_error() {
    let app = router(service_with(Arc::new(ScriptedClassifier::default()), 2, 20));
    let (status, _) = send(app, post_json("/classify", json!({"threshold": 0.2}))).await;
    assert!(status.is_client_error(), "status was {status}");

    let app = router(service_with(Arc::new(ScriptedClassifier::default()), 2, 20));
    let (status, _) = send(app, post_json("/batch", json!({"events": "nope"}))).await;
    assert!(status.is_client_error(), "status was {status}");
}

#[tokio::test]
async fn test_batch_preserves_order_and_isolates_failures() {
    let app = router(service_with(Arc::new(ScriptedClassifier::default()), 2, 20));
    let request = json!({
        "events": [
            {"id": "a", "text": "sleep:30 slow"},
            {"id": "b", "text": "fail here"},
            {"id": "c", "text": "quick"},
            {"id": "d", "text": "panic here"},
            {"id": "e", "text": "last", "threshold": 0.6},
        ],
        "threshold": 0.15
    });
    let (status, body) = send(app, post_json("/batch", request)).await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    let results = body["results"].as_array().unwrap();
    let ids: Vec<_> = results.iter().map(|r| r["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["a", "b", "c", "d", "e"]);

    assert_eq!(labels(&results[0]["categories"]), vec!["beta", "gamma", "alpha"]);
    assert!(labels(&results[1]["categories"]).is_empty());
    assert_eq!(labels(&results[2]["categories"]), vec!["beta", "gamma", "alpha"]);
    assert!(labels(&results[3]["categories"]).is_empty());
    assert_eq!(labels(&results[4]["categories"]), vec!["beta"]);
}

#[tokio::test]
async fn test_empty_batch() {
    let app = router(service_with(Arc::new(ScriptedClassifier::default()), 2, 20));
    let (status, body) = send(app, post_json("/batch", json!({"events": []}))).await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body, json!({"results": []}));
}

#[tokio::test]
async fn test_oversized_batch_is_still_processed() {
    let app = router(service_with(Arc::new(ScriptedClassifier::default()), 1, 2));
    let events: Vec<_> = (0..5)
        .map(|i| json!({"id": format!("e{i}"), "text": "text"}))
        .collect();
    let (status, body) = send(app, post_json("/batch", json!({"events": events}))).await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["results"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_health_reports_config() {
    let app = router(service_with(Arc::new(ScriptedClassifier::default()), 2, 20));
    let (status, body) = send(app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["config"]["max_workers"], 2);
    assert_eq!(body["config"]["max_batch_size"], 20);
    assert_eq!(body["config"]["device"], "cpu");
}

#[tokio::test]
async fn test_health_fails_when_backend_fails() {
    let app = router(failing_service());
    let (status, body) = send(app, get("/health")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert!(body["detail"].as_str().unwrap().contains("health check failed"));
}

#[tokio::test]
async fn test_metrics_exposes_service_counters() {
    let service = service_with(Arc::new(ScriptedClassifier::default()), 2, 20);
    let (status, _) = send(router(service.clone()), get("/categories")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(router(service), get("/metrics")).await;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(body).unwrap();
    assert!(text.contains("wanderto_nlp_requests_total"));
}

#[tokio::test]
async fn test_metrics_exposes_pool_counters() {
    let service = service_with(Arc::new(ScriptedClassifier::default()), 2, 20);
    let request = json!({"events": [
        {"id": "a", "text": "one"},
        {"id": "b", "text": "two"},
        {"id": "c", "text": "three"},
    ]});
    let (status, _) = send(router(service.clone()), post_json("/batch", request)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(router(service), get("/metrics")).await;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(body).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines.contains(&"wanderto_nlp_pool_tasks_submitted_total 3"), "{text}");
    assert!(lines.contains(&"wanderto_nlp_pool_tasks_completed_total 3"), "{text}");
    assert!(lines.contains(&"wanderto_nlp_pool_active_tasks 0"), "{text}");
    assert!(text.contains("wanderto_nlp_pool_peak_active_tasks"));
}

#[tokio::test]
async fn test_http_service_lifecycle() {
    let service = service_with(Arc::new(ScriptedClassifier::default()), 1, 20);
    let http = HttpService::builder()
        .service(service)
        .host("127.0.0.1")
        .port(0)
        .build()
        .unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let token = CancellationToken::new();
    let handle = tokio::spawn(http.serve(listener, token.clone()));

    tokio::time::sleep(Duration::from_millis(50)).await;
    token.cancel();

    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server did not shut down")
        .unwrap();
    assert!(result.is_ok());
}
