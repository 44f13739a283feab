//! In-process event bus connecting services to the real-time engine.

use tokio::sync::broadcast;
use tracing::trace;

use super::DomainEvent;

/// Broadcast-based event bus.
///
/// Services publish [`DomainEvent`]s fire-and-forget; the real-time
/// bridge subscribes and fans them out to WebSocket channels. Publishing
/// with no subscribers is a no-op, so services never fail because the
/// realtime engine is absent (tests, CLI commands).
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Create a new event bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Returns the number of subscribers that received the event.
    pub fn publish(&self, event: DomainEvent) -> usize {
        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(_) => {
                trace!("Domain event dropped: no subscribers");
                0
            }
        }
    }

    /// Subscribe to the event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventPayload, IssueEvent};
    use uuid::Uuid;

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();

        let issue_id = Uuid::new_v4();
        let delivered = bus.publish(DomainEvent::new(
            None,
            EventPayload::Issue(IssueEvent::Deleted { issue_id }),
        ));
        assert_eq!(delivered, 1);

        let event = rx.recv().await.unwrap();
        match event.payload {
            EventPayload::Issue(IssueEvent::Deleted { issue_id: id }) => {
                assert_eq!(id, issue_id);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let bus = EventBus::new(8);
        let delivered = bus.publish(DomainEvent::new(
            None,
            EventPayload::Issue(IssueEvent::Deleted {
                issue_id: Uuid::new_v4(),
            }),
        ));
        assert_eq!(delivered, 0);
    }
}
