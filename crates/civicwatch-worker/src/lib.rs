//! Scheduled maintenance tasks for CivicWatch.
//!
//! This crate provides:
//! - A cron scheduler for periodic maintenance tasks
//! - Built-in cleanup jobs for old notifications and expired sessions

pub mod jobs;
pub mod scheduler;

pub use scheduler::WorkerScheduler;
