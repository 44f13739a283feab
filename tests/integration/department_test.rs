//! Integration tests for department management.

mod helpers;

use axum::http::StatusCode;
use uuid::Uuid;

fn unique_name(prefix: &str) -> String {
    format!("{prefix} {}", &Uuid::new_v4().to_string()[..8])
}

#[tokio::test]
async fn test_department_listing_is_public() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/departments", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["data"].is_array());
}

#[tokio::test]
async fn test_citizen_cannot_create_department() {
    let app = helpers::TestApp::new().await;
    let email = helpers::unique_email("dept-citizen");
    app.create_test_user(&email, "password123", "citizen").await;
    let token = app.login(&email, "password123").await;

    let response = app
        .request(
            "POST",
            "/api/departments",
            Some(serde_json::json!({ "name": unique_name("Roads") })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_department_crud() {
    let app = helpers::TestApp::new().await;
    let email = helpers::unique_email("dept-admin");
    app.create_test_user(&email, "password123", "admin").await;
    let token = app.login(&email, "password123").await;

    let name = unique_name("Sanitation");
    let response = app
        .request(
            "POST",
            "/api/departments",
            Some(serde_json::json!({
                "name": name,
                "description": "Waste collection and street cleaning",
            })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    assert_eq!(response.body["data"]["name"], name.as_str());
    let id = response.body["data"]["id"].as_str().unwrap().to_string();

    let renamed = unique_name("Sanitation");
    let response = app
        .request(
            "PUT",
            &format!("/api/departments/{id}"),
            Some(serde_json::json!({ "name": renamed })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["data"]["name"], renamed.as_str());

    let response = app
        .request(
            "DELETE",
            &format!("/api/departments/{id}"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let listing = app.request("GET", "/api/departments", None, None).await;
    let names: Vec<&str> = listing.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|d| d["name"].as_str())
        .collect();
    assert!(!names.contains(&renamed.as_str()));
}

#[tokio::test]
async fn test_duplicate_department_name_conflicts() {
    let app = helpers::TestApp::new().await;
    let email = helpers::unique_email("dept-dup");
    app.create_test_user(&email, "password123", "admin").await;
    let token = app.login(&email, "password123").await;

    let name = unique_name("Parks");
    let body = serde_json::json!({ "name": name });

    let first = app
        .request("POST", "/api/departments", Some(body.clone()), Some(&token))
        .await;
    assert_eq!(first.status, StatusCode::CREATED);

    let second = app
        .request("POST", "/api/departments", Some(body), Some(&token))
        .await;
    assert_eq!(second.status, StatusCode::CONFLICT, "{:?}", second.body);
    assert_eq!(second.body["success"], false);
}

#[tokio::test]
async fn test_empty_department_name_rejected() {
    let app = helpers::TestApp::new().await;
    let email = helpers::unique_email("dept-empty");
    app.create_test_user(&email, "password123", "admin").await;
    let token = app.login(&email, "password123").await;

    let response = app
        .request(
            "POST",
            "/api/departments",
            Some(serde_json::json!({ "name": "" })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
