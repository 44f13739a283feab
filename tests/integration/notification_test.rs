//! Integration tests for the notification inbox.

mod helpers;

use axum::http::StatusCode;

async fn create_issue(app: &helpers::TestApp, token: &str) -> String {
    let response = app
        .request(
            "POST",
            "/api/issues",
            Some(serde_json::json!({
                "title": "Notification fixture",
                "description": "Notification test fixture issue",
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
async fn test_comment_notifies_reporter() {
    let app = helpers::TestApp::new().await;
    let reporter = helpers::unique_email("notif-reporter");
    let commenter = helpers::unique_email("notif-commenter");
    app.create_test_user(&reporter, "password123", "citizen").await;
    app.create_test_user(&commenter, "password123", "citizen").await;
    let reporter_token = app.login(&reporter, "password123").await;
    let commenter_token = app.login(&commenter, "password123").await;

    let issue_id = create_issue(&app, &reporter_token).await;
    let response = app
        .request(
            "POST",
            &format!("/api/issues/{issue_id}/comments"),
            Some(serde_json::json!({ "body": "Seen this too" })),
            Some(&commenter_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let count = app
        .request(
            "GET",
            "/api/notifications/unread-count",
            None,
            Some(&reporter_token),
        )
        .await;
    assert_eq!(count.status, StatusCode::OK);
    assert_eq!(count.body["data"]["count"], 1, "{:?}", count.body);

    let inbox = app
        .request("GET", "/api/notifications", None, Some(&reporter_token))
        .await;
    let items = inbox.body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["event_type"], "comment_posted");
    assert_eq!(items[0]["is_read"], false);
    let notification_id = items[0]["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            "PUT",
            &format!("/api/notifications/{notification_id}/read"),
            None,
            Some(&reporter_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let count = app
        .request(
            "GET",
            "/api/notifications/unread-count",
            None,
            Some(&reporter_token),
        )
        .await;
    assert_eq!(count.body["data"]["count"], 0);
}

#[tokio::test]
async fn test_self_comment_does_not_notify() {
    let app = helpers::TestApp::new().await;
    let email = helpers::unique_email("notif-self");
    app.create_test_user(&email, "password123", "citizen").await;
    let token = app.login(&email, "password123").await;

    let issue_id = create_issue(&app, &token).await;
    app.request(
        "POST",
        &format!("/api/issues/{issue_id}/comments"),
        Some(serde_json::json!({ "body": "Following up on my own report" })),
        Some(&token),
    )
    .await;

    let count = app
        .request("GET", "/api/notifications/unread-count", None, Some(&token))
        .await;
    assert_eq!(count.body["data"]["count"], 0, "{:?}", count.body);
}

#[tokio::test]
async fn test_status_change_notifies_reporter() {
    let app = helpers::TestApp::new().await;
    let reporter = helpers::unique_email("notif-status");
    let admin = helpers::unique_email("notif-admin");
    app.create_test_user(&reporter, "password123", "citizen").await;
    app.create_test_user(&admin, "password123", "admin").await;
    let reporter_token = app.login(&reporter, "password123").await;
    let admin_token = app.login(&admin, "password123").await;

    let issue_id = create_issue(&app, &reporter_token).await;
    let response = app
        .request(
            "PUT",
            &format!("/api/issues/{issue_id}/status"),
            Some(serde_json::json!({ "status": "in_progress" })),
            Some(&admin_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);

    let inbox = app
        .request("GET", "/api/notifications", None, Some(&reporter_token))
        .await;
    let items = inbox.body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1, "{:?}", inbox.body);
    assert_eq!(items[0]["event_type"], "issue_status_changed");
}

#[tokio::test]
async fn test_mark_all_read() {
    let app = helpers::TestApp::new().await;
    let reporter = helpers::unique_email("notif-all");
    let other = helpers::unique_email("notif-all-other");
    app.create_test_user(&reporter, "password123", "citizen").await;
    app.create_test_user(&other, "password123", "citizen").await;
    let reporter_token = app.login(&reporter, "password123").await;
    let other_token = app.login(&other, "password123").await;

    let issue_id = create_issue(&app, &reporter_token).await;
    for body in ["First", "Second", "Third"] {
        app.request(
            "POST",
            &format!("/api/issues/{issue_id}/comments"),
            Some(serde_json::json!({ "body": body })),
            Some(&other_token),
        )
        .await;
    }

    let response = app
        .request(
            "PUT",
            "/api/notifications/read-all",
            None,
            Some(&reporter_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["count"], 3, "{:?}", response.body);

    let count = app
        .request(
            "GET",
            "/api/notifications/unread-count",
            None,
            Some(&reporter_token),
        )
        .await;
    assert_eq!(count.body["data"]["count"], 0);
}

#[tokio::test]
async fn test_notifications_require_auth() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/notifications", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cannot_read_another_users_notification() {
    let app = helpers::TestApp::new().await;
    let reporter = helpers::unique_email("notif-own");
    let commenter = helpers::unique_email("notif-own-other");
    app.create_test_user(&reporter, "password123", "citizen").await;
    app.create_test_user(&commenter, "password123", "citizen").await;
    let reporter_token = app.login(&reporter, "password123").await;
    let commenter_token = app.login(&commenter, "password123").await;

    let issue_id = create_issue(&app, &reporter_token).await;
    app.request(
        "POST",
        &format!("/api/issues/{issue_id}/comments"),
        Some(serde_json::json!({ "body": "Trigger" })),
        Some(&commenter_token),
    )
    .await;

    let inbox = app
        .request("GET", "/api/notifications", None, Some(&reporter_token))
        .await;
    let notification_id = inbox.body["data"]["items"][0]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .request(
            "PUT",
            &format!("/api/notifications/{notification_id}/read"),
            None,
            Some(&commenter_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND, "{:?}", response.body);
}
