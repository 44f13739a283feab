//! Engagement ledger: like toggles and counts.

pub mod service;

pub use service::{EngagementService, EngagementState};
