//! Trending issues and admin aggregates.

pub mod service;

pub use service::{AdminSummary, AnalyticsService};
