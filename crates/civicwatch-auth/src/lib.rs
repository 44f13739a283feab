//! # civicwatch-auth
//!
//! Authentication and session management for the CivicWatch platform.
//!
//! ## Modules
//!
//! - `jwt`: JWT token creation and validation
//! - `password`: Argon2id password hashing and policy enforcement
//! - `session`: Refresh-token session lifecycle (login, refresh, logout)

pub mod jwt;
pub mod password;
pub mod session;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use password::{PasswordHasher, PasswordValidator};
pub use session::SessionManager;
