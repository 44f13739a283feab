//! Integration tests for health endpoints and WebSocket upgrade
//! rejection paths. Full socket round-trips need a live listener, so
//! they are exercised in the realtime crate's unit tests instead.

mod helpers;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

#[tokio::test]
async fn test_health_check() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["data"]["status"], "ok");
    assert!(response.body["data"]["version"].is_string());
}

#[tokio::test]
async fn test_detailed_health_check() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/health/detailed", None, None).await;

    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["database"], true);
    assert_eq!(response.body["data"]["storage"], true);
    assert!(response.body["data"]["ws_connections"].is_number());
    assert!(response.body["data"]["online_users"].is_number());
}

#[tokio::test]
async fn test_ws_without_upgrade_headers_rejected() {
    let app = helpers::TestApp::new().await;

    // Plain GET with no upgrade handshake fails extraction.
    let response = app.request("GET", "/ws", None, None).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ws_with_invalid_token_unauthorized() {
    let app = helpers::TestApp::new().await;

    let req = Request::builder()
        .method("GET")
        .uri("/ws?token=not-a-valid-jwt")
        .header("Host", "localhost")
        .header("Connection", "Upgrade")
        .header("Upgrade", "websocket")
        .header("Sec-WebSocket-Version", "13")
        .header("Sec-WebSocket-Key", "dGhlIHNhbXBsZSBub25jZQ==")
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(req).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/does-not-exist", None, None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
