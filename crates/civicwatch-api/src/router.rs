//! Route definitions for the CivicWatch HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`; the
//! WebSocket upgrade lives at the root so proxies can route it
//! separately. The router receives `AppState` and passes it to all
//! handlers via Axum's `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_upload = state.config.storage.max_upload_size_bytes as usize;

    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(issue_routes())
        .merge(comment_routes())
        .merge(suggest_routes())
        .merge(department_routes())
        .merge(notification_routes())
        .merge(analytics_routes())
        .merge(user_routes())
        .merge(upload_routes())
        .merge(admin_routes())
        .merge(health_routes());

    let ws_routes = Router::new().route("/ws", get(handlers::ws::ws_handler));

    let cors = build_cors_layer(&state);

    Router::new()
        .nest("/api", api_routes)
        .merge(ws_routes)
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Auth endpoints: register, login, logout, refresh, me
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/me", get(handlers::auth::me))
}

/// Issue submission, feed, map, proximity, lifecycle, engagement
fn issue_routes() -> Router<AppState> {
    Router::new()
        .route("/issues", post(handlers::issue::create))
        .route("/issues", get(handlers::issue::feed))
        .route("/issues/mine", get(handlers::issue::mine))
        .route("/issues/map", get(handlers::issue::map_points))
        .route("/issues/nearby", get(handlers::issue::nearby))
        .route("/issues/{id}", get(handlers::issue::detail))
        .route("/issues/{id}", delete(handlers::issue::delete))
        .route("/issues/{id}/status", put(handlers::issue::update_status))
        .route(
            "/issues/{id}/department",
            put(handlers::issue::assign_department),
        )
        .route("/issues/{id}/like", post(handlers::issue::toggle_like))
        .route("/issues/{id}/likes", get(handlers::issue::like_state))
        .route("/issues/{id}/comments", get(handlers::comment::list))
        .route("/issues/{id}/comments", post(handlers::comment::post))
}

/// Comment editing and deletion, addressed by comment id
fn comment_routes() -> Router<AppState> {
    Router::new()
        .route("/comments/{id}", put(handlers::comment::edit))
        .route("/comments/{id}", delete(handlers::comment::delete))
}

/// Category suggestion
fn suggest_routes() -> Router<AppState> {
    Router::new().route("/suggest/category", post(handlers::suggest::category))
}

/// Department catalogue
fn department_routes() -> Router<AppState> {
    Router::new()
        .route("/departments", get(handlers::department::list))
        .route("/departments", post(handlers::department::create))
        .route("/departments/{id}", put(handlers::department::update))
        .route("/departments/{id}", delete(handlers::department::delete))
}

/// Notification endpoints
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(handlers::notification::list))
        .route(
            "/notifications/unread-count",
            get(handlers::notification::unread_count),
        )
        .route(
            "/notifications/{id}/read",
            put(handlers::notification::mark_read),
        )
        .route(
            "/notifications/read-all",
            put(handlers::notification::mark_all_read),
        )
}

/// Trending and admin aggregates
fn analytics_routes() -> Router<AppState> {
    Router::new()
        .route("/analytics/trending", get(handlers::analytics::trending))
        .route("/analytics/summary", get(handlers::analytics::summary))
}

/// User self-service and public profiles
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/me", put(handlers::user::update_profile))
        .route("/users/me/stats", get(handlers::user::my_stats))
        .route("/users/me/password", put(handlers::user::change_password))
        .route("/users/me/avatar", put(handlers::user::update_avatar))
        .route("/users/{id}", get(handlers::user::profile))
}

/// Photo uploads
fn upload_routes() -> Router<AppState> {
    Router::new().route("/uploads/issue-photo", post(handlers::upload::issue_photo))
}

/// Admin-only endpoints
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(handlers::admin::list_users))
        .route("/admin/users/{id}/role", put(handlers::admin::set_role))
        .route("/admin/users/{id}/status", put(handlers::admin::set_status))
}

/// Health check endpoints (no auth required)
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::detailed))
}

/// Build CORS layer from configuration
fn build_cors_layer(state: &AppState) -> CorsLayer {
    use axum::http::{HeaderValue, Method};
    use tower_http::cors::Any;

    let cors_config = &state.config.server.cors;

    let mut cors = CorsLayer::new();

    if cors_config.allowed_origins.contains(&"*".to_string()) {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = cors_config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    let methods: Vec<Method> = cors_config
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();
    cors = cors.allow_methods(methods);

    if cors_config.allowed_headers.contains(&"*".to_string()) {
        cors = cors.allow_headers(Any);
    }

    cors.max_age(std::time::Duration::from_secs(cors_config.max_age_seconds))
}
