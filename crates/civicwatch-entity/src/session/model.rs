//! Session entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A refresh-token session.
///
/// Sessions are created on login and revoked on logout, expiry,
/// or admin action. Access tokens are stateless JWTs; only the
/// refresh token is tracked server-side, as a SHA-256 hash.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    /// Unique session identifier.
    pub id: Uuid,
    /// The user this session belongs to.
    pub user_id: Uuid,
    /// SHA-256 hash of the refresh token.
    pub refresh_token_hash: String,
    /// IP address from which the session was created.
    pub ip_address: Option<std::net::IpAddr>,
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// When the session was revoked (if revoked).
    pub revoked_at: Option<DateTime<Utc>>,
    /// When the session was created (login time).
    pub created_at: DateTime<Utc>,
    /// When the session expires (absolute timeout).
    pub expires_at: DateTime<Utc>,
    /// Last time the refresh token was used.
    pub last_used_at: DateTime<Utc>,
}

impl Session {
    /// Check whether the session is still active (not revoked and not expired).
    pub fn is_active(&self) -> bool {
        self.revoked_at.is_none() && self.expires_at > Utc::now()
    }
}

/// Data required to create a new session.
///
/// The session ID is chosen by the caller so it can be embedded in
/// JWT claims before the row exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSession {
    /// Pre-generated session identifier.
    pub id: Uuid,
    /// The user this session belongs to.
    pub user_id: Uuid,
    /// SHA-256 hash of the refresh token.
    pub refresh_token_hash: String,
    /// IP address of the client.
    pub ip_address: Option<std::net::IpAddr>,
    /// User-Agent header.
    pub user_agent: Option<String>,
    /// When the session expires.
    pub expires_at: DateTime<Utc>,
}
