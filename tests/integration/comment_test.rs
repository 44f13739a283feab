//! Integration tests for issue comment threads.

mod helpers;

use axum::http::StatusCode;

async fn create_issue(app: &helpers::TestApp, token: &str) -> String {
    let response = app
        .request(
            "POST",
            "/api/issues",
            Some(serde_json::json!({
                "title": "Comment thread fixture",
                "description": "Comment test fixture issue",
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
async fn test_post_and_list_comments_oldest_first() {
    let app = helpers::TestApp::new().await;
    let email = helpers::unique_email("commenter");
    app.create_test_user(&email, "password123", "citizen").await;
    let token = app.login(&email, "password123").await;

    let issue_id = create_issue(&app, &token).await;
    let path = format!("/api/issues/{issue_id}/comments");

    for body in ["First comment", "Second comment"] {
        let response = app
            .request(
                "POST",
                &path,
                Some(serde_json::json!({ "body": body })),
                Some(&token),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        assert_eq!(response.body["data"]["body"], body);
        assert!(response.body["data"]["author_full_name"].is_string());
    }

    let response = app.request("GET", &path, None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    let items = response.body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["body"], "First comment");
    assert_eq!(items[1]["body"], "Second comment");
}

#[tokio::test]
async fn test_comment_body_limits() {
    let app = helpers::TestApp::new().await;
    let email = helpers::unique_email("limits");
    app.create_test_user(&email, "password123", "citizen").await;
    let token = app.login(&email, "password123").await;

    let issue_id = create_issue(&app, &token).await;
    let path = format!("/api/issues/{issue_id}/comments");

    let response = app
        .request(
            "POST",
            &path,
            Some(serde_json::json!({ "body": "" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let oversized = "x".repeat(2001);
    let response = app
        .request(
            "POST",
            &path,
            Some(serde_json::json!({ "body": oversized })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_only_author_can_edit() {
    let app = helpers::TestApp::new().await;
    let author = helpers::unique_email("author");
    let other = helpers::unique_email("other");
    app.create_test_user(&author, "password123", "citizen").await;
    app.create_test_user(&other, "password123", "citizen").await;
    let author_token = app.login(&author, "password123").await;
    let other_token = app.login(&other, "password123").await;

    let issue_id = create_issue(&app, &author_token).await;
    let posted = app
        .request(
            "POST",
            &format!("/api/issues/{issue_id}/comments"),
            Some(serde_json::json!({ "body": "Original text" })),
            Some(&author_token),
        )
        .await;
    let comment_id = posted.body["data"]["id"].as_str().unwrap().to_string();
    let edit_path = format!("/api/comments/{comment_id}");

    let response = app
        .request(
            "PUT",
            &edit_path,
            Some(serde_json::json!({ "body": "Hijacked text" })),
            Some(&other_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request(
            "PUT",
            &edit_path,
            Some(serde_json::json!({ "body": "Corrected text" })),
            Some(&author_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["data"]["body"], "Corrected text");
}

#[tokio::test]
async fn test_admin_can_delete_any_comment() {
    let app = helpers::TestApp::new().await;
    let author = helpers::unique_email("del-author");
    let admin = helpers::unique_email("del-admin");
    app.create_test_user(&author, "password123", "citizen").await;
    app.create_test_user(&admin, "password123", "admin").await;
    let author_token = app.login(&author, "password123").await;
    let admin_token = app.login(&admin, "password123").await;

    let issue_id = create_issue(&app, &author_token).await;
    let posted = app
        .request(
            "POST",
            &format!("/api/issues/{issue_id}/comments"),
            Some(serde_json::json!({ "body": "To be moderated" })),
            Some(&author_token),
        )
        .await;
    let comment_id = posted.body["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            "DELETE",
            &format!("/api/comments/{comment_id}"),
            None,
            Some(&admin_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let listing = app
        .request(
            "GET",
            &format!("/api/issues/{issue_id}/comments"),
            None,
            None,
        )
        .await;
    assert_eq!(listing.body["data"]["items"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_non_author_cannot_delete() {
    let app = helpers::TestApp::new().await;
    let author = helpers::unique_email("keep-author");
    let other = helpers::unique_email("keep-other");
    app.create_test_user(&author, "password123", "citizen").await;
    app.create_test_user(&other, "password123", "citizen").await;
    let author_token = app.login(&author, "password123").await;
    let other_token = app.login(&other, "password123").await;

    let issue_id = create_issue(&app, &author_token).await;
    let posted = app
        .request(
            "POST",
            &format!("/api/issues/{issue_id}/comments"),
            Some(serde_json::json!({ "body": "Keep me" })),
            Some(&author_token),
        )
        .await;
    let comment_id = posted.body["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            "DELETE",
            &format!("/api/comments/{comment_id}"),
            None,
            Some(&other_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}
