//! HTTP API tests
//!
//! Drives the router in-process with `tower::ServiceExt::oneshot`, using the
//! embedded sample catalog.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use medmatch::utils::validation::{MAX_BATCH_NAMES, MAX_NAME_CHARS};
use medmatch::web::server::{build_router, AppState};
use medmatch::{NormalizationProfile, ReferenceCatalog};

fn app() -> Router {
    let catalog = ReferenceCatalog::load_embedded(NormalizationProfile::Extended).unwrap();
    build_router(Arc::new(AppState { catalog }))
}

async fn send(request: Request<Body>) -> (StatusCode, Value, axum::http::HeaderMap) {
    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body, headers)
}

async fn post_json(uri: &str, body: &Value) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, body, _) = send(request).await;
    (status, body)
}

#[tokio::test]
async fn test_health() {
    let (status, body, headers) = send(Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
}

#[tokio::test]
async fn test_normalize_endpoint() {
    let (status, body) = post_json(
        "/api/normalize",
        &json!({"names": ["ロキソニン錠60mg（三和）", ""]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["normalized"], "ロキソニン");
    assert_eq!(results[0]["prefix"], "");
    assert_eq!(results[0]["suffix"], "錠60mg（三和）");
    assert!(results[0].get("core").is_none());
    assert_eq!(results[1]["normalized"], "");
}

#[tokio::test]
async fn test_fuzzy_match_defaults_to_levenshtein() {
    let (status, body) = post_json(
        "/api/fuzzy-match",
        &json!({"drugs": ["ロキソニン錠60mg", "ブルゼニド錠12mg"]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results[0]["input"], "ロキソニン錠60mg");
    assert_eq!(results[0]["best_match"], "ロキソニン錠60mg");
    assert_eq!(results[0]["score"], 1.0);
    assert_eq!(results[0]["status"], "unmodified");

    assert_eq!(results[1]["best_match"], "プルゼニド錠12mg");
    assert_eq!(results[1]["score"], 0.8);
    assert_eq!(results[1]["status"], "modified");
    assert!(body.get("candidates").is_none());
}

#[tokio::test]
async fn test_fuzzy_match_with_overrides() {
    let (status, body) = post_json(
        "/api/fuzzy-match",
        &json!({
            "drugs": ["ブルゼニド"],
            "algorithm": "fragment",
            "display_name": true,
            "candidates": 3
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"][0]["best_match"], "プルゼニド錠12mg");
    assert_eq!(body["results"][0]["status"], "unmodified");

    let candidates = body["candidates"][0].as_array().unwrap();
    assert_eq!(candidates.len(), 3);
    assert_eq!(candidates[0]["field"], "brand");
    assert_eq!(candidates[0]["name"], "プルゼニド錠12mg");
}

#[tokio::test]
async fn test_fuzzy_match_empty_batch_is_ok() {
    let (status, body) = post_json("/api/fuzzy-match", &json!({"drugs": []})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"], json!([]));
}

#[tokio::test]
async fn test_fuzzy_match_rejects_missing_or_non_array_drugs() {
    for body in [json!({}), json!({"drugs": "ロキソニン"}), json!({"drugs": [1, 2]})] {
        let (status, response) = post_json("/api/fuzzy-match", &body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(response["error_type"], "invalid_request");
        assert!(response["error"].is_string());
    }
}

#[tokio::test]
async fn test_fuzzy_match_enforces_limits() {
    let too_many: Vec<&str> = vec!["ロキソニン"; MAX_BATCH_NAMES + 1];
    let (status, body) = post_json("/api/fuzzy-match", &json!({"drugs": too_many})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "too_many_names");

    let long_name = "ア".repeat(MAX_NAME_CHARS + 1);
    let (status, body) = post_json("/api/fuzzy-match", &json!({"drugs": ["ok", long_name]})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "name_too_long");
}

#[tokio::test]
async fn test_segments_endpoint() {
    let (status, body) = post_json(
        "/api/segments",
        &json!({
            "lines": [
                {"text": "Rp.1", "confidence": 0.95, "segments": [{"value": "Rp.1", "label": "other"}]},
                {"text": "ガスター錠20mg 2錠", "confidence": 0.9, "segments": [
                    {"value": "ガスター錠", "label": "drug"},
                    {"value": "20mg", "label": "dosage"},
                    {"value": " 2錠", "label": "usage"}
                ]}
            ]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let matches = body["matches"].as_array().unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["input"], "ガスター錠");
    assert_eq!(matches[0]["normalized"], "ガスター");
    assert_eq!(matches[0]["best_match"], "ガスター錠");
    assert_eq!(matches[0]["source_line"], 1);
    assert_eq!(matches[0]["confidence"], 0.9);
    assert_eq!(matches[0]["status"], "unmodified");
}

#[tokio::test]
async fn test_catalog_summary() {
    let (status, body, _) = send(Request::get("/api/catalog").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"], "extended");

    let total = body["total"].as_u64().unwrap();
    let summed: u64 = body["categories"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["count"].as_u64().unwrap())
        .sum();
    assert_eq!(total, summed);
    assert!(total > 0);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (status, _, _) = send(Request::get("/api/identify").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
