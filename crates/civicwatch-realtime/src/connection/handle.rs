//! Per-socket connection handle.

use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use civicwatch_entity::user::UserRole;

use crate::message::types::OutboundMessage;

/// Unique identifier for one WebSocket connection.
pub type ConnectionId = Uuid;

/// Handle to one live WebSocket connection.
///
/// The socket task owns the receiving half of the queue and writes each
/// message to the wire; everything else holds this handle and enqueues.
/// A full queue drops the message rather than blocking the broadcaster;
/// since every message carries authoritative state, the next one heals
/// whatever was missed.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Connection ID.
    pub id: ConnectionId,
    /// The authenticated user.
    pub user_id: Uuid,
    /// The session the access token belongs to.
    pub session_id: Uuid,
    /// The user's role at connect time.
    pub role: UserRole,
    /// When the connection was registered.
    pub connected_at: DateTime<Utc>,
    /// When the last pong arrived.
    last_pong: RwLock<DateTime<Utc>>,
    /// Cleared when the connection is torn down or times out.
    alive: AtomicBool,
    /// Outbound message queue consumed by the socket task.
    sender: mpsc::Sender<OutboundMessage>,
}

impl ConnectionHandle {
    /// Creates a handle for a freshly upgraded socket.
    pub fn new(
        user_id: Uuid,
        session_id: Uuid,
        role: UserRole,
        sender: mpsc::Sender<OutboundMessage>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            session_id,
            role,
            connected_at: now,
            last_pong: RwLock::new(now),
            alive: AtomicBool::new(true),
            sender,
        }
    }

    /// Enqueues a message for delivery. Returns `false` when the
    /// message was not enqueued.
    pub fn send(&self, message: OutboundMessage) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(message) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(connection_id = %self.id, "Outbound queue full, message dropped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!(connection_id = %self.id, "Outbound queue closed, marking dead");
                self.mark_dead();
                false
            }
        }
    }

    /// Whether the connection is still live.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }

    /// Marks the connection as dead. The socket task observes this and
    /// closes the socket.
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::Relaxed);
    }

    /// Records a pong from the client.
    pub fn record_pong(&self) {
        let mut last_pong = self.last_pong.write().unwrap_or_else(|e| e.into_inner());
        *last_pong = Utc::now();
    }

    /// When the last pong arrived (connect time until the first pong).
    pub fn last_pong(&self) -> DateTime<Utc> {
        *self.last_pong.read().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_handle(capacity: usize) -> (ConnectionHandle, mpsc::Receiver<OutboundMessage>) {
        let (tx, rx) = mpsc::channel(capacity);
        let handle = ConnectionHandle::new(Uuid::new_v4(), Uuid::new_v4(), UserRole::Citizen, tx);
        (handle, rx)
    }

    #[tokio::test]
    async fn test_send_enqueues() {
        let (handle, mut rx) = test_handle(4);
        assert!(handle.send(OutboundMessage::Ping { timestamp: 1 }));
        assert!(matches!(
            rx.recv().await,
            Some(OutboundMessage::Ping { timestamp: 1 })
        ));
    }

    #[tokio::test]
    async fn test_full_queue_drops_without_killing_connection() {
        let (handle, _rx) = test_handle(1);
        assert!(handle.send(OutboundMessage::Ping { timestamp: 1 }));
        assert!(!handle.send(OutboundMessage::Ping { timestamp: 2 }));
        assert!(handle.is_alive());
    }

    #[tokio::test]
    async fn test_closed_queue_marks_dead() {
        let (handle, rx) = test_handle(1);
        drop(rx);
        assert!(!handle.send(OutboundMessage::Ping { timestamp: 1 }));
        assert!(!handle.is_alive());
    }
}
