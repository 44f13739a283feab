//! Application builder: wires repositories, services, realtime, and
//! the worker into a running Axum server.

use std::sync::Arc;

use axum::Router;
use sqlx::PgPool;

use civicwatch_core::config::AppConfig;
use civicwatch_core::error::AppError;
use civicwatch_core::events::EventBus;
use civicwatch_database::repositories::{
    CommentRepository, DepartmentRepository, EngagementRepository, IssueRepository,
    NotificationRepository, SessionRepository, UserRepository,
};
use civicwatch_worker::WorkerScheduler;

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Runs the CivicWatch server with the given configuration and
/// database pool.
pub async fn run_server(config: AppConfig, db_pool: PgPool) -> Result<(), AppError> {
    tracing::info!("Starting CivicWatch server...");

    // ── Step 1: Initialize photo storage ─────────────────────────
    let photo_store = Arc::new(civicwatch_storage::PhotoStore::from_config(&config.storage).await?);
    tracing::info!(provider = photo_store.provider_type(), "Photo storage ready");

    // ── Step 2: Initialize repositories ──────────────────────────
    let user_repo = Arc::new(UserRepository::new(db_pool.clone()));
    let session_repo = Arc::new(SessionRepository::new(db_pool.clone()));
    let issue_repo = Arc::new(IssueRepository::new(db_pool.clone()));
    let engagement_repo = Arc::new(EngagementRepository::new(db_pool.clone()));
    let comment_repo = Arc::new(CommentRepository::new(db_pool.clone()));
    let department_repo = Arc::new(DepartmentRepository::new(db_pool.clone()));
    let notification_repo = Arc::new(NotificationRepository::new(db_pool.clone()));

    // ── Step 3: Initialize auth system ───────────────────────────
    let password_hasher = Arc::new(civicwatch_auth::password::PasswordHasher::new());
    let password_validator = civicwatch_auth::password::PasswordValidator::new(&config.auth);
    let jwt_encoder = Arc::new(civicwatch_auth::jwt::JwtEncoder::new(&config.auth));
    let jwt_decoder = Arc::new(civicwatch_auth::jwt::JwtDecoder::new(&config.auth));

    let session_manager = Arc::new(civicwatch_auth::session::SessionManager::new(
        Arc::clone(&jwt_encoder),
        Arc::clone(&jwt_decoder),
        Arc::clone(&session_repo),
        Arc::clone(&user_repo),
        Arc::clone(&password_hasher),
        config.session.clone(),
    ));

    // ── Step 4: Event bus ────────────────────────────────────────
    let events = EventBus::new(config.realtime.channel_buffer_size);

    // ── Step 5: Initialize services ──────────────────────────────
    let proximity_service = Arc::new(civicwatch_service::ProximityService::new(
        Arc::clone(&issue_repo),
        config.proximity.clone(),
    ));
    let suggest_gateway = Arc::new(civicwatch_service::SuggestGateway::new(&config.suggest)?);
    let notification_service = Arc::new(civicwatch_service::NotificationService::new(
        Arc::clone(&notification_repo),
        events.clone(),
    ));
    let issue_service = Arc::new(civicwatch_service::IssueService::new(
        Arc::clone(&issue_repo),
        Arc::clone(&engagement_repo),
        Arc::clone(&comment_repo),
        Arc::clone(&user_repo),
        Arc::clone(&department_repo),
        Arc::clone(&proximity_service),
        Arc::clone(&suggest_gateway),
        Arc::clone(&notification_service),
        events.clone(),
    ));
    let engagement_service = Arc::new(civicwatch_service::EngagementService::new(
        Arc::clone(&engagement_repo),
        Arc::clone(&issue_repo),
        Arc::clone(&notification_service),
        events.clone(),
    ));
    let comment_service = Arc::new(civicwatch_service::CommentService::new(
        Arc::clone(&comment_repo),
        Arc::clone(&issue_repo),
        Arc::clone(&user_repo),
        Arc::clone(&notification_service),
        events.clone(),
    ));
    let department_service = Arc::new(civicwatch_service::DepartmentService::new(Arc::clone(
        &department_repo,
    )));
    let user_service = Arc::new(civicwatch_service::user::UserService::new(
        Arc::clone(&user_repo),
        Arc::clone(&issue_repo),
        Arc::clone(&comment_repo),
        Arc::clone(&session_repo),
        Arc::clone(&password_hasher),
        password_validator,
        Arc::clone(&photo_store),
    ));
    let admin_user_service = Arc::new(civicwatch_service::AdminUserService::new(
        Arc::clone(&user_repo),
        Arc::clone(&session_repo),
    ));
    let analytics_service = Arc::new(civicwatch_service::AnalyticsService::new(
        Arc::clone(&issue_repo),
        Arc::clone(&user_repo),
    ));

    // ── Step 6: Initialize realtime engine ───────────────────────
    let realtime =
        Arc::new(civicwatch_realtime::RealtimeEngine::start(config.realtime.clone(), events).await?);

    // ── Step 7: Start background worker ──────────────────────────
    let worker = if config.worker.enabled {
        Some(
            WorkerScheduler::start(
                config.worker.clone(),
                Arc::clone(&notification_repo),
                Arc::clone(&session_repo),
            )
            .await?,
        )
    } else {
        None
    };

    // ── Step 8: Build and start HTTP server ──────────────────────
    let app_state = AppState {
        config: Arc::new(config.clone()),
        db_pool: db_pool.clone(),
        photo_store,
        session_manager,
        realtime: Arc::clone(&realtime),
        session_repo,
        issue_service,
        engagement_service,
        comment_service,
        suggest_gateway,
        notification_service,
        department_service,
        user_service,
        admin_user_service,
        analytics_service,
    };

    let app = build_app(app_state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("CivicWatch server listening on {addr}");

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    if let Some(worker) = worker {
        worker.shutdown().await;
    }
    realtime.shutdown();

    tracing::info!("CivicWatch server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
