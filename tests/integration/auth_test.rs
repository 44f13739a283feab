//! Integration tests for registration, login, and session flow.

mod helpers;

use axum::http::StatusCode;

#[tokio::test]
async fn test_register_and_login() {
    let app = helpers::TestApp::new().await;
    let email = helpers::unique_email("register");

    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(serde_json::json!({
                "email": email,
                "full_name": "Registration Test",
                "password": "correct-horse-battery",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["data"]["email"], email.as_str());

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({
                "email": email,
                "password": "correct-horse-battery",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["data"]["access_token"].is_string());
    assert!(response.body["data"]["refresh_token"].is_string());
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let app = helpers::TestApp::new().await;
    let email = helpers::unique_email("dup");
    app.create_test_user(&email, "password123", "citizen").await;

    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(serde_json::json!({
                "email": email,
                "full_name": "Second Account",
                "password": "password123",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["success"], false);
}

#[tokio::test]
async fn test_login_invalid_password() {
    let app = helpers::TestApp::new().await;
    let email = helpers::unique_email("badpass");
    app.create_test_user(&email, "password123", "citizen").await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({
                "email": email,
                "password": "wrong-password",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["success"], false);
}

#[tokio::test]
async fn test_me_returns_current_account() {
    let app = helpers::TestApp::new().await;
    let email = helpers::unique_email("me");
    app.create_test_user(&email, "password123", "citizen").await;
    let token = app.login(&email, "password123").await;

    let response = app.request("GET", "/api/auth/me", None, Some(&token)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["email"], email.as_str());
}

#[tokio::test]
async fn test_me_without_token_unauthorized() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/auth/me", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_rotates_tokens() {
    let app = helpers::TestApp::new().await;
    let email = helpers::unique_email("refresh");
    app.create_test_user(&email, "password123", "citizen").await;

    let login = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({
                "email": email,
                "password": "password123",
            })),
            None,
        )
        .await;
    let refresh_token = login.body["data"]["refresh_token"].as_str().unwrap();

    let response = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(serde_json::json!({ "refresh_token": refresh_token })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert!(response.body["data"]["access_token"].is_string());
    let rotated = response.body["data"]["refresh_token"].as_str().unwrap();
    assert_ne!(rotated, refresh_token);
}

#[tokio::test]
async fn test_logout_revokes_session() {
    let app = helpers::TestApp::new().await;
    let email = helpers::unique_email("logout");
    app.create_test_user(&email, "password123", "citizen").await;
    let token = app.login(&email, "password123").await;

    let response = app
        .request("POST", "/api/auth/logout", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    // The access token names a revoked session now.
    let response = app.request("GET", "/api/auth/me", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}
