//! HTTP surface, driven through the router without binding a socket.

mod fixtures;

use axum::body::Body;
use axum::http::{header, Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use fixtures::*;
use metrics_exporter_prometheus::PrometheusBuilder;
use store_visits::app_state::AppState;
use store_visits::routes;
use store_visits::routes::metrics::MetricsState;
use store_visits::services::analysis::SimulatedAnalyzer;
use store_visits::services::ids::SequentialJobIds;
use store_visits::services::pipeline::{Pipeline, PipelineSettings};

fn build_test_app() -> (Router, AppState) {
    let pipeline = Pipeline::start(
        PipelineSettings::default(),
        Arc::new(SimulatedAnalyzer::new(Duration::ZERO)),
        Arc::new(SequentialJobIds::new()),
        store_master(),
    )
    .expect("pipeline starts");
    let state = AppState::new(pipeline);
    (routes::router(state.clone()), state)
}

fn submit_body(store_id: &str, urls: &[&str]) -> String {
    serde_json::to_string(&request(vec![visit(store_id, urls)])).unwrap()
}

async fn get(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn post_json(app: &Router, uri: &str, body: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Poll the status endpoint until the job leaves `pending`.
async fn poll_status(app: &Router, job_id: u64) -> Value {
    for _ in 0..500 {
        let response = get(app, &format!("/api/status?jobid={job_id}")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        if json["status"] != "pending" {
            return json;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {job_id} never left pending");
}

#[tokio::test]
async fn test_root_reports_live() {
    let (app, _) = build_test_app();
    let response = get(&app, "/").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "API is Live");
}

#[tokio::test]
async fn test_submit_poll_and_list_visits() {
    let (app, _) = build_test_app();

    let response = post_json(&app, "/api/submit", &submit_body("S1", &["u1", "u2"])).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let job_id = body_json(response).await["job_id"].as_u64().unwrap();
    assert_eq!(job_id, 1);

    let status = poll_status(&app, job_id).await;
    assert_eq!(status["status"], "completed");
    assert_eq!(status["job_id"], job_id);
    assert_eq!(status["error"], json!([]));

    let response = get(&app, "/api/visits").await;
    assert_eq!(response.status(), StatusCode::OK);
    let visits = body_json(response).await;
    let visits = visits.as_array().unwrap();
    assert_eq!(visits.len(), 1);
    assert_eq!(visits[0]["store_id"], "S1");
    assert_eq!(visits[0]["store_name"], "Kirana Corner");
    assert_eq!(visits[0]["area"], "7100001");

    let data = visits[0]["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    for point in data {
        assert_eq!(point["date"], VISIT_TIME);
        let perimeter = point["perimeter"].as_f64().unwrap();
        assert!((0.0..100.0).contains(&perimeter));
    }
}

#[tokio::test]
async fn test_submit_accepts_trailing_slash() {
    let (app, state) = build_test_app();

    let response = post_json(&app, "/api/submit/", &submit_body("S2", &["u1"])).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let job_id = body_json(response).await["job_id"].as_u64().unwrap();

    assert_eq!(poll_status(&app, job_id).await["status"], "completed");
    assert_eq!(state.pipeline.store().job_count(), 1);
}

#[tokio::test]
async fn test_validation_failures_are_bad_requests() {
    let (app, state) = build_test_app();
    let cases = [
        (
            r#"{"count":2,"visits":[{"store_id":"S1","image_url":["u1"],"visit_time":""}]}"#,
            "count mismatch",
        ),
        (r#"{"count":0,"visits":[]}"#, "empty request"),
        (
            r#"{"count":1,"visits":[{"store_id":"","image_url":["u1"],"visit_time":""}]}"#,
            "missing fields",
        ),
    ];

    for (body, message) in cases {
        let response = post_json(&app, "/api/submit", body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], message);
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }

    assert_eq!(state.pipeline.store().job_count(), 0);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let (app, _) = build_test_app();
    let response = post_json(&app, "/api/submit", "{not json").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_status_query_errors() {
    let (app, _) = build_test_app();

    let missing = get(&app, "/api/status").await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(missing).await["error"], "Missing job id parameter");

    let invalid = get(&app, "/api/status?jobid=abc").await;
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

    let unknown = get(&app, "/api/status?jobid=424242").await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(unknown).await["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_visits_empty_before_any_job() {
    let (app, _) = build_test_app();
    let response = get(&app, "/api/visits").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn test_health_degrades_after_shutdown() {
    let (app, state) = build_test_app();

    let response = get(&app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["checks"]["queue"]["capacity"], 5);
    assert_eq!(json["checks"]["workers"]["active"], 2);

    state.pipeline.shutdown().await;

    let response = get(&app, "/health").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["queue"]["status"], "error");
}

#[tokio::test]
async fn test_metrics_scrape_reports_queue_depth() {
    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();
    metrics::set_global_recorder(recorder).expect("only this test installs a recorder");

    let (app, state) = build_test_app();
    let app = app.merge(routes::metrics::router(MetricsState {
        handle: Arc::new(handle),
        pipeline: Arc::clone(&state.pipeline),
    }));

    let response = get(&app, "/metrics").await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let scrape = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(scrape.contains("visit_queue_depth"), "scrape was: {scrape}");
    assert!(scrape.contains("visit_workers_active"));
}
