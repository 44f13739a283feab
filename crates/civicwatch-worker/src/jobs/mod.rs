//! Built-in maintenance jobs.

pub mod cleanup;

pub use cleanup::{NotificationCleanup, SessionCleanup};
