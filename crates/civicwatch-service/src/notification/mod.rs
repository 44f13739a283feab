//! Notification creation and inbox queries.

pub mod service;

pub use service::NotificationService;
