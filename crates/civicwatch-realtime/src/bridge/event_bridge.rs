//! Domain event → channel broadcast mapping.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use civicwatch_core::events::{
    CommentEvent, DomainEvent, EngagementEvent, EventBus, EventPayload, IssueEvent,
    NotificationEvent,
};

use crate::bridge::{ChannelEnvelope, PubSub};
use crate::channel::types::ChannelType;
use crate::message::types::OutboundMessage;

/// Bridges the in-process event bus into the pub/sub layer.
#[derive(Debug)]
pub struct EventBridge {
    events: EventBus,
    pubsub: Arc<dyn PubSub>,
}

impl EventBridge {
    /// Creates a new event bridge.
    pub fn new(events: EventBus, pubsub: Arc<dyn PubSub>) -> Self {
        Self { events, pubsub }
    }

    /// Spawns the bridge loop.
    pub fn spawn(self, shutdown: broadcast::Receiver<()>) {
        tokio::spawn(self.run(shutdown));
    }

    async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let mut events = self.events.subscribe();
        info!("Event bridge started");

        loop {
            tokio::select! {
                received = events.recv() => match received {
                    Ok(event) => self.forward(event).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Clients reconcile from the next authoritative
                        // snapshot, so skipping is safe.
                        warn!(skipped, "Event bridge lagged behind the bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                _ = shutdown.recv() => break,
            }
        }

        info!("Event bridge stopped");
    }

    async fn forward(&self, event: DomainEvent) {
        for envelope in route(&event) {
            let channel = envelope.channel.clone();
            if let Err(e) = self.pubsub.publish(envelope).await {
                warn!(channel, error = %e, "Event publish failed");
            } else {
                debug!(channel, event_id = %event.id, "Event forwarded");
            }
        }
    }
}

/// Maps one domain event to the channels it must reach.
pub fn route(event: &DomainEvent) -> Vec<ChannelEnvelope> {
    let timestamp = event.timestamp;
    match &event.payload {
        EventPayload::Engagement(EngagementEvent::Toggled {
            issue_id,
            user_id,
            liked,
            like_count,
        }) => {
            let message = OutboundMessage::EngagementChanged {
                issue_id: *issue_id,
                user_id: *user_id,
                liked: *liked,
                like_count: *like_count,
                timestamp,
            };
            to_channels(
                [ChannelType::Issue(*issue_id), ChannelType::Feed],
                &message,
            )
        }
        EventPayload::Comment(comment_event) => {
            let (issue_id, message) = match comment_event {
                CommentEvent::Posted {
                    issue_id,
                    comment,
                    comment_count,
                } => (
                    *issue_id,
                    OutboundMessage::CommentPosted {
                        issue_id: *issue_id,
                        comment: comment.clone(),
                        comment_count: *comment_count,
                        timestamp,
                    },
                ),
                CommentEvent::Updated { issue_id, comment } => (
                    *issue_id,
                    OutboundMessage::CommentUpdated {
                        issue_id: *issue_id,
                        comment: comment.clone(),
                        timestamp,
                    },
                ),
                CommentEvent::Deleted {
                    issue_id,
                    comment_id,
                    comment_count,
                } => (
                    *issue_id,
                    OutboundMessage::CommentDeleted {
                        issue_id: *issue_id,
                        comment_id: *comment_id,
                        comment_count: *comment_count,
                        timestamp,
                    },
                ),
            };
            to_channels([ChannelType::Issue(issue_id)], &message)
        }
        EventPayload::Issue(issue_event) => match issue_event {
            IssueEvent::Created { issue_id, issue } => to_channels(
                [ChannelType::Feed, ChannelType::Admin],
                &OutboundMessage::IssueCreated {
                    issue_id: *issue_id,
                    issue: issue.clone(),
                    timestamp,
                },
            ),
            IssueEvent::Updated { issue_id, issue } => to_channels(
                [
                    ChannelType::Feed,
                    ChannelType::Issue(*issue_id),
                    ChannelType::Admin,
                ],
                &OutboundMessage::IssueUpdated {
                    issue_id: *issue_id,
                    issue: issue.clone(),
                    timestamp,
                },
            ),
            IssueEvent::Deleted { issue_id } => to_channels(
                [ChannelType::Feed, ChannelType::Issue(*issue_id)],
                &OutboundMessage::IssueDeleted {
                    issue_id: *issue_id,
                    timestamp,
                },
            ),
        },
        EventPayload::Notification(NotificationEvent::Created {
            user_id,
            notification,
            ..
        }) => to_channels(
            [ChannelType::User(*user_id)],
            &OutboundMessage::Notification {
                notification: notification.clone(),
                timestamp,
            },
        ),
    }
}

fn to_channels<const N: usize>(
    channels: [ChannelType; N],
    message: &OutboundMessage,
) -> Vec<ChannelEnvelope> {
    channels
        .into_iter()
        .map(|channel| ChannelEnvelope {
            channel: channel.to_channel_name(),
            message: message.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_engagement_reaches_issue_and_feed() {
        let issue_id = Uuid::new_v4();
        let event = DomainEvent::new(
            None,
            EventPayload::Engagement(EngagementEvent::Toggled {
                issue_id,
                user_id: Uuid::new_v4(),
                liked: true,
                like_count: 3,
            }),
        );

        let envelopes = route(&event);
        let channels: Vec<&str> = envelopes.iter().map(|e| e.channel.as_str()).collect();
        assert_eq!(channels, vec![format!("issue:{issue_id}"), "feed".to_string()]);
        for envelope in &envelopes {
            assert!(matches!(
                envelope.message,
                OutboundMessage::EngagementChanged { like_count: 3, .. }
            ));
        }
    }

    #[test]
    fn test_comment_events_stay_on_issue_channel() {
        let issue_id = Uuid::new_v4();
        let event = DomainEvent::new(
            None,
            EventPayload::Comment(CommentEvent::Deleted {
                issue_id,
                comment_id: Uuid::new_v4(),
                comment_count: 0,
            }),
        );

        let envelopes = route(&event);
        assert_eq!(envelopes.len(), 1);
        assert_eq!(envelopes[0].channel, format!("issue:{issue_id}"));
    }

    #[test]
    fn test_new_issue_reaches_feed_and_admin() {
        let event = DomainEvent::new(
            None,
            EventPayload::Issue(IssueEvent::Created {
                issue_id: Uuid::new_v4(),
                issue: serde_json::json!({"title": "Pothole"}),
            }),
        );

        let channels: Vec<String> = route(&event).into_iter().map(|e| e.channel).collect();
        assert_eq!(channels, vec!["feed", "admin"]);
    }

    #[test]
    fn test_notification_is_private() {
        let user_id = Uuid::new_v4();
        let event = DomainEvent::new(
            None,
            EventPayload::Notification(NotificationEvent::Created {
                notification_id: Uuid::new_v4(),
                user_id,
                notification: serde_json::json!({"title": "Hello"}),
            }),
        );

        let envelopes = route(&event);
        assert_eq!(envelopes.len(), 1);
        assert_eq!(envelopes[0].channel, format!("user:{user_id}"));
    }
}
