//! Issue lifecycle, feed decoration, and proximity queries.

pub mod proximity;
pub mod service;

pub use proximity::ProximityService;
pub use service::{CreateIssueRequest, IssueService, IssueSubmission, IssueWithStats};
