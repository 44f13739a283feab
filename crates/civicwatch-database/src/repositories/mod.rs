//! Repository implementations for all CivicWatch entities.

pub mod comment;
pub mod department;
pub mod engagement;
pub mod issue;
pub mod notification;
pub mod session;
pub mod user;

pub use comment::CommentRepository;
pub use department::DepartmentRepository;
pub use engagement::EngagementRepository;
pub use issue::IssueRepository;
pub use notification::NotificationRepository;
pub use session::SessionRepository;
pub use user::UserRepository;
