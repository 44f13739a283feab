//! Domain events emitted by CivicWatch operations.
//!
//! Events are published by the service layer and consumed by the
//! real-time engine, which fans them out to subscribed WebSocket
//! clients as authoritative state snapshots.

pub mod bus;
pub mod comment;
pub mod engagement;
pub mod issue;
pub mod notification;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use bus::EventBus;
pub use comment::CommentEvent;
pub use engagement::EngagementEvent;
pub use issue::IssueEvent;
pub use notification::NotificationEvent;

/// Wrapper for all domain events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The user who caused the event (if applicable).
    pub actor_id: Option<Uuid>,
    /// The event payload.
    pub payload: EventPayload,
}

/// Union of all domain event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event")]
pub enum EventPayload {
    /// An issue-related event.
    Issue(IssueEvent),
    /// An engagement (like) event.
    Engagement(EngagementEvent),
    /// A comment-related event.
    Comment(CommentEvent),
    /// A notification delivery event.
    Notification(NotificationEvent),
}

impl DomainEvent {
    /// Create a new domain event.
    pub fn new(actor_id: Option<Uuid>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            actor_id,
            payload,
        }
    }
}
