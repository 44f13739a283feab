//! Core type definitions used across the CivicWatch workspace.

pub mod geo;
pub mod pagination;

pub use geo::GeoPoint;
pub use pagination::{PageRequest, PageResponse};
