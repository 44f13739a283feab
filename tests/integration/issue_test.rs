//! Integration tests for issue submission, duplicate detection, and
//! lifecycle transitions.

mod helpers;

use axum::http::StatusCode;

async fn submit_issue(
    app: &helpers::TestApp,
    token: &str,
    title: &str,
    lat: f64,
    lng: f64,
) -> helpers::TestResponse {
    app.request(
        "POST",
        "/api/issues",
        Some(serde_json::json!({
            "title": title,
            "description": "A pothole large enough to swallow a bicycle wheel",
            "category": "Road",
            "latitude": lat,
            "longitude": lng,
        })),
        Some(token),
    )
    .await
}

#[tokio::test]
async fn test_submit_issue_returns_created_issue() {
    let app = helpers::TestApp::new().await;
    let email = helpers::unique_email("reporter");
    app.create_test_user(&email, "password123", "citizen").await;
    let token = app.login(&email, "password123").await;

    // Isolated coordinates so no earlier test data is within range.
    let response = submit_issue(&app, &token, "Pothole on Elm Street", 52.5200, 13.4050).await;

    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    assert_eq!(response.body["success"], true);
    assert!(response.body["data"]["issue"]["id"].is_string());
    assert_eq!(response.body["data"]["issue"]["status"], "pending");
    assert_eq!(
        response.body["data"]["duplicate_candidates"]
            .as_array()
            .unwrap()
            .len(),
        0
    );
}

#[tokio::test]
async fn test_submit_requires_auth() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/issues",
            Some(serde_json::json!({
                "title": "Anonymous pothole",
                "description": "Should not be accepted",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_nearby_submission_reports_duplicate_candidates() {
    let app = helpers::TestApp::new().await;
    let email = helpers::unique_email("dup-reporter");
    app.create_test_user(&email, "password123", "citizen").await;
    let token = app.login(&email, "password123").await;

    let first = submit_issue(&app, &token, "Broken streetlight", 48.8566, 2.3522).await;
    assert_eq!(first.status, StatusCode::CREATED);
    let first_id = first.body["data"]["issue"]["id"].as_str().unwrap().to_string();

    // ~55 meters north of the first report, well inside the 300 m radius.
    let second = submit_issue(&app, &token, "Streetlight out again", 48.8571, 2.3522).await;
    assert_eq!(second.status, StatusCode::CREATED);

    let candidates = second.body["data"]["duplicate_candidates"]
        .as_array()
        .unwrap();
    assert_eq!(candidates.len(), 1, "{:?}", second.body);
    assert_eq!(candidates[0]["id"], first_id.as_str());
    let distance = candidates[0]["distance_meters"].as_f64().unwrap();
    assert!(distance > 0.0 && distance < 300.0, "distance {distance}");
}

#[tokio::test]
async fn test_distant_submission_has_no_candidates() {
    let app = helpers::TestApp::new().await;
    let email = helpers::unique_email("far-reporter");
    app.create_test_user(&email, "password123", "citizen").await;
    let token = app.login(&email, "password123").await;

    let first = submit_issue(&app, &token, "Graffiti on underpass", 35.6895, 139.6917).await;
    assert_eq!(first.status, StatusCode::CREATED);

    // ~1.1 km away, outside the configured radius.
    let second = submit_issue(&app, &token, "More graffiti", 35.6995, 139.6917).await;
    assert_eq!(second.status, StatusCode::CREATED);
    assert_eq!(
        second.body["data"]["duplicate_candidates"]
            .as_array()
            .unwrap()
            .len(),
        0
    );
}

#[tokio::test]
async fn test_resolved_issues_are_not_duplicate_candidates() {
    let app = helpers::TestApp::new().await;
    let citizen = helpers::unique_email("resolve-citizen");
    let admin = helpers::unique_email("resolve-admin");
    app.create_test_user(&citizen, "password123", "citizen").await;
    app.create_test_user(&admin, "password123", "admin").await;
    let citizen_token = app.login(&citizen, "password123").await;
    let admin_token = app.login(&admin, "password123").await;

    let first = submit_issue(&app, &citizen_token, "Flooded crosswalk", -33.8688, 151.2093).await;
    let first_id = first.body["data"]["issue"]["id"].as_str().unwrap().to_string();

    let resolve = app
        .request(
            "PUT",
            &format!("/api/issues/{first_id}/status"),
            Some(serde_json::json!({ "status": "resolved" })),
            Some(&admin_token),
        )
        .await;
    assert_eq!(resolve.status, StatusCode::OK, "{:?}", resolve.body);

    let second = submit_issue(&app, &citizen_token, "Crosswalk flooding", -33.8690, 151.2093).await;
    assert_eq!(
        second.body["data"]["duplicate_candidates"]
            .as_array()
            .unwrap()
            .len(),
        0,
        "{:?}",
        second.body
    );
}

#[tokio::test]
async fn test_nearby_endpoint_finds_open_issues() {
    let app = helpers::TestApp::new().await;
    let email = helpers::unique_email("nearby");
    app.create_test_user(&email, "password123", "citizen").await;
    let token = app.login(&email, "password123").await;

    submit_issue(&app, &token, "Fallen tree", 59.9139, 10.7522).await;

    let response = app
        .request(
            "GET",
            "/api/issues/nearby?latitude=59.9141&longitude=10.7522",
            None,
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    let found = response.body["data"].as_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["title"], "Fallen tree");
}

#[tokio::test]
async fn test_citizen_cannot_change_status() {
    let app = helpers::TestApp::new().await;
    let email = helpers::unique_email("status-citizen");
    app.create_test_user(&email, "password123", "citizen").await;
    let token = app.login(&email, "password123").await;

    let issue = submit_issue(&app, &token, "Loose paving stone", 41.3851, 2.1734).await;
    let issue_id = issue.body["data"]["issue"]["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            "PUT",
            &format!("/api/issues/{issue_id}/status"),
            Some(serde_json::json!({ "status": "resolved" })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_feed_lists_issues_with_stats() {
    let app = helpers::TestApp::new().await;
    let email = helpers::unique_email("feed");
    app.create_test_user(&email, "password123", "citizen").await;
    let token = app.login(&email, "password123").await;

    submit_issue(&app, &token, "Feed smoke test", 55.6761, 12.5683).await;

    let response = app.request("GET", "/api/issues", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    let items = response.body["data"]["items"].as_array().unwrap();
    assert!(!items.is_empty());
    assert!(items[0]["like_count"].is_number());
    assert!(items[0]["comment_count"].is_number());
    assert_eq!(items[0]["liked_by_me"], false);
}
