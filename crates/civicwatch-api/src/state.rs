//! Application state shared across all handlers.

use std::sync::Arc;

use sqlx::PgPool;

use civicwatch_auth::session::SessionManager;
use civicwatch_core::config::AppConfig;
use civicwatch_database::repositories::SessionRepository;
use civicwatch_realtime::RealtimeEngine;
use civicwatch_service::{
    AdminUserService, AnalyticsService, CommentService, DepartmentService, EngagementService,
    IssueService, NotificationService, SuggestGateway, UserService,
};
use civicwatch_storage::PhotoStore;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. All fields are
/// `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration.
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// PostgreSQL connection pool.
    pub db_pool: PgPool,
    /// Photo storage facade.
    pub photo_store: Arc<PhotoStore>,

    // ── Auth ─────────────────────────────────────────────────
    /// Session lifecycle manager.
    pub session_manager: Arc<SessionManager>,

    // ── Realtime ─────────────────────────────────────────────
    /// WebSocket realtime engine.
    pub realtime: Arc<RealtimeEngine>,

    // ── Repositories used directly by extractors ─────────────
    /// Session repository.
    pub session_repo: Arc<SessionRepository>,

    // ── Services ─────────────────────────────────────────────
    /// Issue submission and lifecycle service.
    pub issue_service: Arc<IssueService>,
    /// Like toggle service.
    pub engagement_service: Arc<EngagementService>,
    /// Comment thread service.
    pub comment_service: Arc<CommentService>,
    /// Category suggestion gateway.
    pub suggest_gateway: Arc<SuggestGateway>,
    /// Notification service.
    pub notification_service: Arc<NotificationService>,
    /// Department service.
    pub department_service: Arc<DepartmentService>,
    /// User self-service.
    pub user_service: Arc<UserService>,
    /// Admin user management service.
    pub admin_user_service: Arc<AdminUserService>,
    /// Trending and summary analytics.
    pub analytics_service: Arc<AnalyticsService>,
}
