//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use region_cache::{api::create_router, AppState, Broadcaster, CacheConfig, Expiration, MemoryStore};
use serde_json::Value;
use std::time::Duration;
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> Router {
    create_app_with(&CacheConfig::default())
}

fn create_app_with(config: &CacheConfig) -> Router {
    let state = AppState::with_broadcaster(MemoryStore::from_config(config), config, Broadcaster::new());
    create_router(state)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

// == Add Endpoint Tests ==

#[tokio::test]
async fn test_add_endpoint_success() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/entries/Test_Key?region=Users")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"value":"test_value"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["key"], "Test_Key");
    assert_eq!(json["region"], "users");
    assert_eq!(json["added"], true);
}

#[tokio::test]
async fn test_add_existing_entry_is_not_overwritten() {
    let app = create_test_app();

    send(&app, "PUT", "/entries/k", Some(r#"{"value":"first"}"#)).await;
    let (status, json) = send(&app, "PUT", "/entries/k", Some(r#"{"value":"second"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["added"], false);

    let (_, json) = send(&app, "GET", "/entries/k", None).await;
    assert_eq!(json["value"], "first");
}

// == Get Endpoint Tests ==

#[tokio::test]
async fn test_get_endpoint_success() {
    let app = create_test_app();

    send(&app, "PUT", "/entries/k?region=a", Some(r#"{"value":"v"}"#)).await;
    let (status, json) = send(&app, "GET", "/entries/K?region=A", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["value"], "v");
    assert_eq!(json["region"], "a");
}

#[tokio::test]
async fn test_get_endpoint_not_found() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/entries/nonexistent", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json.get("error").is_some());
}

#[tokio::test]
async fn test_regions_do_not_share_keys() {
    let app = create_test_app();

    send(&app, "PUT", "/entries/k?region=a", Some(r#"{"value":"v"}"#)).await;
    let (status, _) = send(&app, "GET", "/entries/k?region=b", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "GET", "/entries/k", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// == Remove Endpoint Tests ==

#[tokio::test]
async fn test_remove_endpoint() {
    let app = create_test_app();

    send(&app, "PUT", "/entries/k", Some(r#"{"value":"v"}"#)).await;

    let (status, json) = send(&app, "DELETE", "/entries/k", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["removed"], true);

    let (_, json) = send(&app, "DELETE", "/entries/k", None).await;
    assert_eq!(json["removed"], false);

    let (status, _) = send(&app, "GET", "/entries/k", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// == Region Clearing Tests ==

#[tokio::test]
async fn test_clear_region_endpoint() {
    let app = create_test_app();

    send(&app, "PUT", "/entries/k?region=a", Some(r#"{"value":"1"}"#)).await;
    send(&app, "PUT", "/entries/k?region=b", Some(r#"{"value":"2"}"#)).await;

    let (status, json) = send(&app, "DELETE", "/regions/A", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["region"], "a");
    assert_eq!(json["cleared"], 1);

    let (status, _) = send(&app, "GET", "/entries/k?region=a", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "GET", "/entries/k?region=b", None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = send(&app, "DELETE", "/regions/a", None).await;
    assert_eq!(json["cleared"], 0);
}

#[tokio::test]
async fn test_clear_all_endpoint() {
    let app = create_test_app();

    send(&app, "PUT", "/entries/a", Some(r#"{"value":"1"}"#)).await;
    send(&app, "PUT", "/entries/b?region=x", Some(r#"{"value":"2"}"#)).await;

    let (status, json) = send(&app, "DELETE", "/regions", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["cleared"], 2);
    assert!(json.get("region").is_none());

    let (_, stats) = send(&app, "GET", "/stats", None).await;
    assert_eq!(stats["size"], 0);
}

// == Stats Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint() {
    let app = create_test_app();

    send(&app, "PUT", "/entries/a", Some(r#"{"value":"1"}"#)).await;
    send(&app, "PUT", "/entries/b?region=orders", Some(r#"{"value":"2"}"#)).await;
    send(&app, "PUT", "/entries/c?region=Orders", Some(r#"{"value":"3"}"#)).await;
    send(&app, "GET", "/entries/a", None).await;
    send(&app, "GET", "/entries/missing", None).await;

    let (status, json) = send(&app, "GET", "/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["size"], 3);
    assert_eq!(json["regions"]["none"], 1);
    assert_eq!(json["regions"]["orders"], 2);
    assert_eq!(json["hits"], 1);
    assert_eq!(json["misses"], 1);
    assert!((json["hit_rate"].as_f64().unwrap() - 0.5).abs() < 0.001);
}

// == Health Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    let timestamp = json["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
}

// == Error Response Tests ==

#[tokio::test]
async fn test_invalid_json_request() {
    let app = create_test_app();

    let (status, _) = send(&app, "PUT", "/entries/k", Some(r#"{"invalid json"#)).await;

    // Axum returns 400 or 422 for JSON parsing errors
    assert!(status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_separator_in_key_is_rejected() {
    let app = create_test_app();

    let (status, json) = send(&app, "PUT", "/entries/a%1Fb", Some(r#"{"value":"v"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("separator"));
}

// == Expiration via API Tests ==

#[tokio::test]
async fn test_sliding_expiration_via_api() {
    let config = CacheConfig::default().with_expiration(Expiration::Sliding(Duration::from_millis(200)));
    let app = create_app_with(&config);

    send(&app, "PUT", "/entries/short", Some(r#"{"value":"v"}"#)).await;
    send(&app, "PUT", "/entries/pinned", Some(r#"{"value":"v","non_expiring":true}"#)).await;

    let (status, _) = send(&app, "GET", "/entries/short", None).await;
    assert_eq!(status, StatusCode::OK);

    tokio::time::sleep(Duration::from_millis(300)).await;

    let (status, _) = send(&app, "GET", "/entries/short", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "GET", "/entries/pinned", None).await;
    assert_eq!(status, StatusCode::OK);
}
