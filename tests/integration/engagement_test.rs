//! Integration tests for the idempotent like toggle.

mod helpers;

use axum::http::StatusCode;

async fn create_issue(app: &helpers::TestApp, token: &str, title: &str) -> String {
    let response = app
        .request(
            "POST",
            "/api/issues",
            Some(serde_json::json!({
                "title": title,
                "description": "Engagement test fixture issue",
                "category": "Other",
            })),
            Some(token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    response.body["data"]["issue"]["id"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_like_toggle_round_trip() {
    let app = helpers::TestApp::new().await;
    let alice = helpers::unique_email("alice");
    let bob = helpers::unique_email("bob");
    app.create_test_user(&alice, "password123", "citizen").await;
    app.create_test_user(&bob, "password123", "citizen").await;
    let alice_token = app.login(&alice, "password123").await;
    let bob_token = app.login(&bob, "password123").await;

    let issue_id = create_issue(&app, &alice_token, "Toggle target").await;
    let like_path = format!("/api/issues/{issue_id}/like");

    // Alice likes.
    let response = app.request("POST", &like_path, None, Some(&alice_token)).await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["data"]["liked"], true);
    assert_eq!(response.body["data"]["like_count"], 1);

    // Bob likes.
    let response = app.request("POST", &like_path, None, Some(&bob_token)).await;
    assert_eq!(response.body["data"]["liked"], true);
    assert_eq!(response.body["data"]["like_count"], 2);

    // Alice toggles off; only Bob's like remains.
    let response = app.request("POST", &like_path, None, Some(&alice_token)).await;
    assert_eq!(response.body["data"]["liked"], false);
    assert_eq!(response.body["data"]["like_count"], 1);

    let state_path = format!("/api/issues/{issue_id}/likes");
    let alice_state = app.request("GET", &state_path, None, Some(&alice_token)).await;
    assert_eq!(alice_state.body["data"]["liked"], false);
    assert_eq!(alice_state.body["data"]["like_count"], 1);

    let bob_state = app.request("GET", &state_path, None, Some(&bob_token)).await;
    assert_eq!(bob_state.body["data"]["liked"], true);
    assert_eq!(bob_state.body["data"]["like_count"], 1);
}

#[tokio::test]
async fn test_like_requires_auth() {
    let app = helpers::TestApp::new().await;
    let email = helpers::unique_email("anon-like");
    app.create_test_user(&email, "password123", "citizen").await;
    let token = app.login(&email, "password123").await;

    let issue_id = create_issue(&app, &token, "Anonymous like target").await;

    let response = app
        .request(
            "POST",
            &format!("/api/issues/{issue_id}/like"),
            None,
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_anonymous_like_state_is_count_only() {
    let app = helpers::TestApp::new().await;
    let email = helpers::unique_email("state-anon");
    app.create_test_user(&email, "password123", "citizen").await;
    let token = app.login(&email, "password123").await;

    let issue_id = create_issue(&app, &token, "State target").await;
    app.request(
        "POST",
        &format!("/api/issues/{issue_id}/like"),
        None,
        Some(&token),
    )
    .await;

    let response = app
        .request("GET", &format!("/api/issues/{issue_id}/likes"), None, None)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["liked"], false);
    assert_eq!(response.body["data"]["like_count"], 1);
}

#[tokio::test]
async fn test_like_unknown_issue_not_found() {
    let app = helpers::TestApp::new().await;
    let email = helpers::unique_email("ghost-like");
    app.create_test_user(&email, "password123", "citizen").await;
    let token = app.login(&email, "password123").await;

    let response = app
        .request(
            "POST",
            "/api/issues/00000000-0000-0000-0000-000000000000/like",
            None,
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
