//! # civicwatch-storage
//!
//! Photo storage for CivicWatch. Issue photos are written through a
//! pluggable provider (local filesystem or an S3-compatible object
//! store) and thumbnails are generated for feed rendering.

pub mod manager;
pub mod providers;
pub mod thumbnail;

pub use manager::{PhotoStore, StoredPhoto};
