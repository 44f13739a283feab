//! # civicwatch-entity
//!
//! Domain entity models for CivicWatch. Every struct in this crate
//! represents a database table row or a domain value object. All entities
//! derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and database
//! entities additionally derive `sqlx::FromRow`.

pub mod comment;
pub mod department;
pub mod issue;
pub mod notification;
pub mod session;
pub mod user;
