//! Comment thread store.

pub mod service;

pub use service::CommentService;
