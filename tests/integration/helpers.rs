//! Shared test helpers for integration tests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use sqlx::PgPool;
use tokio::sync::OnceCell;
use tower::ServiceExt;
use uuid::Uuid;

use civicwatch_api::{AppState, build_app};
use civicwatch_core::config::AppConfig;
use civicwatch_core::events::EventBus;

static DB_PREPARED: OnceCell<()> = OnceCell::const_new();

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Database pool for direct queries
    pub db_pool: PgPool,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Create a new test application
    pub async fn new() -> Self {
        let config = AppConfig::load("test").expect("Failed to load test config");

        let db_pool = civicwatch_database::DatabasePool::connect(&config.database)
            .await
            .expect("Failed to connect to test database")
            .into_pool();

        DB_PREPARED
            .get_or_init(|| async {
                civicwatch_database::migration::run_migrations(&db_pool)
                    .await
                    .expect("Failed to run migrations");
                Self::clean_database(&db_pool).await;
            })
            .await;

        let photo_store = Arc::new(
            civicwatch_storage::PhotoStore::from_config(&config.storage)
                .await
                .expect("Failed to init photo storage"),
        );

        let user_repo = Arc::new(civicwatch_database::repositories::UserRepository::new(
            db_pool.clone(),
        ));
        let session_repo = Arc::new(civicwatch_database::repositories::SessionRepository::new(
            db_pool.clone(),
        ));
        let issue_repo = Arc::new(civicwatch_database::repositories::IssueRepository::new(
            db_pool.clone(),
        ));
        let engagement_repo = Arc::new(
            civicwatch_database::repositories::EngagementRepository::new(db_pool.clone()),
        );
        let comment_repo = Arc::new(civicwatch_database::repositories::CommentRepository::new(
            db_pool.clone(),
        ));
        let department_repo = Arc::new(
            civicwatch_database::repositories::DepartmentRepository::new(db_pool.clone()),
        );
        let notification_repo = Arc::new(
            civicwatch_database::repositories::NotificationRepository::new(db_pool.clone()),
        );

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

        let events = EventBus::new(config.realtime.channel_buffer_size);

        let proximity_service = Arc::new(civicwatch_service::ProximityService::new(
            Arc::clone(&issue_repo),
            config.proximity.clone(),
        ));
        let suggest_gateway = Arc::new(
            civicwatch_service::SuggestGateway::new(&config.suggest)
                .expect("Failed to init suggest gateway"),
        );
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
        let user_service = Arc::new(civicwatch_service::UserService::new(
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

        let realtime = Arc::new(
            civicwatch_realtime::RealtimeEngine::start(config.realtime.clone(), events)
                .await
                .expect("Failed to start realtime engine"),
        );

        let state = AppState {
            config: Arc::new(config.clone()),
            db_pool: db_pool.clone(),
            photo_store,
            session_manager,
            realtime,
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

        let router = build_app(state);

        Self {
            router,
            db_pool,
            config,
        }
    }

    /// Clean all test data from the database
    async fn clean_database(pool: &PgPool) {
        let tables = [
            "notifications",
            "comments",
            "issue_likes",
            "issues",
            "departments",
            "sessions",
            "users",
        ];

        for table in &tables {
            let query = format!("DELETE FROM {table}");
            let _ = sqlx::query(&query).execute(pool).await;
        }
    }

    /// Create a test user and return their ID
    pub async fn create_test_user(&self, email: &str, password: &str, role: &str) -> Uuid {
        let hasher = civicwatch_auth::password::PasswordHasher::new();
        let hash = hasher
            .hash_password(password)
            .await
            .expect("Failed to hash password");
        let id = Uuid::new_v4();

        sqlx::query(
            r#"INSERT INTO users (id, email, password_hash, full_name, role, status)
               VALUES ($1, $2, $3, $4, $5::user_role, 'active'::user_status)"#,
        )
        .bind(id)
        .bind(email)
        .bind(&hash)
        .bind(email.split('@').next().unwrap_or("Test User"))
        .bind(role)
        .execute(&self.db_pool)
        .await
        .expect("Failed to create test user");

        id
    }

    /// Login and return JWT access token
    pub async fn login(&self, email: &str, password: &str) -> String {
        let body = serde_json::json!({
            "email": email,
            "password": password,
        });

        let response = self
            .request("POST", "/api/auth/login", Some(body), None)
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );

        response.body["data"]["access_token"]
            .as_str()
            .expect("No access_token in login response")
            .to_string()
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

/// Unique email address for one test run
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@test.com", &Uuid::new_v4().to_string()[..8])
}
