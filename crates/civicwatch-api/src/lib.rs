//! # civicwatch-api
//!
//! HTTP API layer for CivicWatch built on Axum.
//!
//! Provides all REST endpoints, the WebSocket upgrade, extractors, DTOs,
//! and the mapping from domain errors to HTTP responses.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use error::ApiError;
pub use state::AppState;
