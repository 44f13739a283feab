//! Session lifecycle manager: login, logout, refresh token flows.

use std::net::IpAddr;
use std::sync::Arc;

use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use uuid::Uuid;

use civicwatch_core::config::SessionConfig;
use civicwatch_core::error::AppError;
use civicwatch_database::repositories::session::SessionRepository;
use civicwatch_database::repositories::user::UserRepository;
use civicwatch_entity::session::model::CreateSession;
use civicwatch_entity::session::Session;
use civicwatch_entity::user::User;

use crate::jwt::encoder::TokenPair;
use crate::jwt::{Claims, JwtDecoder, JwtEncoder};
use crate::password::PasswordHasher;

/// Result of a successful login.
#[derive(Debug, Clone, serde::Serialize)]
pub struct LoginResult {
    /// Generated token pair.
    pub tokens: TokenPair,
    /// Created session.
    pub session: Session,
    /// The authenticated user.
    pub user: User,
}

/// Manages the complete session lifecycle.
#[derive(Clone)]
pub struct SessionManager {
    /// JWT encoder for token generation.
    jwt_encoder: Arc<JwtEncoder>,
    /// JWT decoder for token validation.
    jwt_decoder: Arc<JwtDecoder>,
    /// Session persistence.
    session_repo: Arc<SessionRepository>,
    /// User repository.
    user_repo: Arc<UserRepository>,
    /// Password hasher.
    password_hasher: Arc<PasswordHasher>,
    /// Session configuration.
    session_config: SessionConfig,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("session_config", &self.session_config)
            .finish()
    }
}

impl SessionManager {
    /// Creates a new session manager with all required dependencies.
    pub fn new(
        jwt_encoder: Arc<JwtEncoder>,
        jwt_decoder: Arc<JwtDecoder>,
        session_repo: Arc<SessionRepository>,
        user_repo: Arc<UserRepository>,
        password_hasher: Arc<PasswordHasher>,
        session_config: SessionConfig,
    ) -> Self {
        Self {
            jwt_encoder,
            jwt_decoder,
            session_repo,
            user_repo,
            password_hasher,
            session_config,
        }
    }

    /// Performs the complete login flow:
    ///
    /// 1. Validate credentials
    /// 2. Check account status
    /// 3. Enforce the per-user session cap, revoking the oldest session
    ///    when the cap is reached
    /// 4. Create the session record and generate the token pair
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        ip_address: Option<IpAddr>,
        user_agent: Option<&str>,
    ) -> Result<LoginResult, AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::authentication("Invalid email or password"))?;

        if !user.can_login() {
            return Err(AppError::authorization(
                "Account is disabled. Contact an administrator.",
            ));
        }

        let password_valid = self
            .password_hasher
            .verify_password(password, &user.password_hash)
            .await?;

        if !password_valid {
            warn!(user_id = %user.id, "Login attempt with invalid password");
            return Err(AppError::authentication("Invalid email or password"));
        }

        let active = self.session_repo.count_active_by_user(user.id).await?;
        if active >= self.session_config.max_sessions_per_user as i64 {
            if let Some(oldest) = self.session_repo.find_oldest_by_user(user.id).await? {
                info!(
                    user_id = %user.id,
                    kicked_session = %oldest.id,
                    "Session cap reached, revoking oldest session"
                );
                self.session_repo.revoke(oldest.id).await?;
            }
        }

        // The session ID goes into the JWT claims, so it must exist
        // before the row does.
        let session_id = Uuid::new_v4();
        let tokens =
            self.jwt_encoder
                .generate_token_pair(user.id, session_id, user.role, &user.email)?;

        let session = self
            .session_repo
            .create(&CreateSession {
                id: session_id,
                user_id: user.id,
                refresh_token_hash: sha256_hex(&tokens.refresh_token),
                ip_address,
                user_agent: user_agent.map(str::to_string),
                expires_at: tokens.refresh_expires_at,
            })
            .await?;

        let _ = self.user_repo.update_last_login(user.id).await;

        info!(user_id = %user.id, session_id = %session.id, "Login successful");

        Ok(LoginResult {
            tokens,
            session,
            user,
        })
    }

    /// Exchanges a valid refresh token for a new token pair.
    ///
    /// The stored refresh token hash must match the presented token, so
    /// a rotated-out token cannot be replayed.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AppError> {
        let claims = self.jwt_decoder.decode_refresh_token(refresh_token)?;
        let session_id = claims.session_id();

        let session = self
            .session_repo
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| AppError::authentication("Session not found"))?;

        if !session.is_active() {
            return Err(AppError::authentication("Session is no longer active"));
        }

        if session.refresh_token_hash != sha256_hex(refresh_token) {
            warn!(session_id = %session_id, "Stale refresh token presented, revoking session");
            self.session_repo.revoke(session_id).await?;
            return Err(AppError::authentication("Refresh token has been superseded"));
        }

        // Role may have changed since issuance, so re-read the user.
        let user = self
            .user_repo
            .find_by_id(claims.user_id())
            .await?
            .ok_or_else(|| AppError::authentication("User not found"))?;

        if !user.can_login() {
            return Err(AppError::authorization(
                "Account is disabled. Contact an administrator.",
            ));
        }

        let tokens =
            self.jwt_encoder
                .generate_token_pair(user.id, session_id, user.role, &user.email)?;

        self.session_repo
            .rotate_refresh_token(
                session_id,
                &sha256_hex(&tokens.refresh_token),
                tokens.refresh_expires_at,
            )
            .await?;

        info!(user_id = %user.id, session_id = %session_id, "Token refreshed");

        Ok(tokens)
    }

    /// Logs out by revoking the session named in the claims.
    pub async fn logout(&self, claims: &Claims) -> Result<(), AppError> {
        self.session_repo.revoke(claims.session_id()).await?;
        info!(
            user_id = %claims.user_id(),
            session_id = %claims.session_id(),
            "Logout completed"
        );
        Ok(())
    }

    /// Validates an access token and returns its claims.
    pub fn authenticate(&self, access_token: &str) -> Result<Claims, AppError> {
        self.jwt_decoder.decode_access_token(access_token)
    }
}

/// Computes a SHA-256 hash of the input string as a lowercase hex string.
fn sha256_hex(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    hex::encode(digest)
}
