//! User registration, profiles, and admin account management.

pub mod admin;
pub mod service;

pub use admin::AdminUserService;
pub use service::{RegisterRequest, UserProfile, UserService};
