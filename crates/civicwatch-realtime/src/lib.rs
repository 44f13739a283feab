//! Realtime WebSocket engine for CivicWatch.
//!
//! Server-side half of the optimistic-update contract: services publish
//! domain events on the in-process bus, the event bridge maps them to
//! channel broadcasts, and every subscriber receives an authoritative
//! snapshot suitable for full-replace reconciliation. Messages always
//! carry the complete truth (a full snapshot or a recomputed count),
//! never a delta, so duplicated or reordered delivery is harmless.
//!
//! The engine is transport-agnostic: the HTTP layer performs the
//! WebSocket upgrade and pumps frames between the socket and a
//! registered [`connection::ConnectionHandle`].

pub mod bridge;
pub mod channel;
pub mod connection;
pub mod message;
pub mod server;

pub use bridge::{ChannelEnvelope, EventBridge, MemoryPubSub, PubSub, RedisPubSub};
pub use channel::{ChannelRegistry, ChannelType};
pub use connection::{ConnectionHandle, ConnectionId, ConnectionManager, HeartbeatConfig};
pub use message::{InboundMessage, OutboundMessage};
pub use server::RealtimeEngine;
