#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tapeshelf_api::config::{LogFormat, ServerConfig, StorageBackend};
use tapeshelf_api::router::build_app_router;
use tapeshelf_api::state::AppState;
use tapeshelf_db::MemoryRecordStore;
use tapeshelf_hierarchy::HierarchyManager;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults and the in-memory store.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        storage_backend: StorageBackend::Memory,
        database_url: None,
        db_max_connections: 1,
        legacy_status_codes: true,
        log_format: LogFormat::Pretty,
    }
}

/// Build the full application router over `store`.
///
/// Routers built from clones of the same store see the same data, so a
/// test can issue one request per router like a real client would.
pub fn build_app(store: &MemoryRecordStore, legacy_status_codes: bool) -> Router {
    let config = ServerConfig {
        legacy_status_codes,
        ..test_config()
    };
    let state = AppState {
        manager: HierarchyManager::new(Arc::new(store.clone())),
        config: Arc::new(config),
    };
    build_app_router(state)
}

/// A router over a fresh store with legacy status codes enabled.
pub fn build_test_app() -> Router {
    build_app(&MemoryRecordStore::new(), true)
}

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create a cabinet and return its id.
pub async fn create_cabinet(store: &MemoryRecordStore, letter: &str) -> String {
    let response = post_json(
        build_app(store, true),
        "/api/v1/cabinets",
        serde_json::json!({ "letter": letter }),
    )
    .await;
    assert_eq!(response.status(), 201);
    body_json(response).await["id"].as_str().unwrap().to_string()
}

/// Add a cassette to a cabinet by id and return its id.
pub async fn add_cassette(
    store: &MemoryRecordStore,
    cabinet_id: &str,
    shelf: i32,
    title: &str,
) -> String {
    let response = post_json(
        build_app(store, true),
        "/api/v1/cassettes",
        serde_json::json!({
            "cabinet_id": cabinet_id,
            "shelf": shelf,
            "movie_title_en": title,
            "release_year": 1999,
        }),
    )
    .await;
    assert_eq!(response.status(), 201);
    body_json(response).await["id"].as_str().unwrap().to_string()
}
