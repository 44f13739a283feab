//! # civicwatch-service
//!
//! Business logic service layer for CivicWatch. Each service orchestrates
//! repositories, storage, and authentication to implement application-level
//! use cases, and publishes domain events for the realtime engine.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod analytics;
pub mod comment;
pub mod context;
pub mod department;
pub mod engagement;
pub mod issue;
pub mod notification;
pub mod suggest;
pub mod user;

pub use analytics::AnalyticsService;
pub use comment::CommentService;
pub use context::RequestContext;
pub use department::DepartmentService;
pub use engagement::EngagementService;
pub use issue::{IssueService, ProximityService};
pub use notification::NotificationService;
pub use suggest::SuggestGateway;
pub use user::{AdminUserService, UserService};
