//! # civicwatch-database
//!
//! PostgreSQL database connection management and concrete repository
//! implementations for all CivicWatch entities.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
