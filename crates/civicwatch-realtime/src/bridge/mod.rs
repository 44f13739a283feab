//! Domain event fan-out and cross-instance pub/sub.
//!
//! The [`EventBridge`] maps domain events to channel broadcasts and
//! hands them to a [`PubSub`] backend. Every instance runs a delivery
//! loop that feeds published envelopes into its local connection
//! manager, so a single-node deployment uses the in-process backend and
//! a multi-node deployment relays through Redis.

pub mod event_bridge;
pub mod memory_pubsub;
pub mod redis_pubsub;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use civicwatch_core::result::AppResult;

use crate::connection::manager::ConnectionManager;
use crate::message::types::OutboundMessage;

pub use event_bridge::EventBridge;
pub use memory_pubsub::MemoryPubSub;
pub use redis_pubsub::RedisPubSub;

/// A message addressed to one channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelEnvelope {
    /// Target channel name.
    pub channel: String,
    /// The message to deliver.
    pub message: OutboundMessage,
}

/// Fan-out backend for channel messages.
#[async_trait]
pub trait PubSub: Send + Sync + std::fmt::Debug {
    /// Publishes an envelope for delivery on every instance.
    async fn publish(&self, envelope: ChannelEnvelope) -> AppResult<()>;

    /// Starts the background loop delivering published envelopes to
    /// this instance's connections. Returns once the loop is running.
    fn start(&self, connections: Arc<ConnectionManager>, shutdown: broadcast::Receiver<()>);
}
