//! In-process pub/sub for single-node deployments.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{debug, info};

use civicwatch_core::result::AppResult;

use crate::bridge::{ChannelEnvelope, PubSub};
use crate::connection::manager::ConnectionManager;

/// Pub/sub backed by a `tokio::sync::broadcast` channel.
#[derive(Debug)]
pub struct MemoryPubSub {
    sender: broadcast::Sender<ChannelEnvelope>,
}

impl MemoryPubSub {
    /// Creates an in-process pub/sub with the given buffer size.
    pub fn new(buffer_size: usize) -> Self {
        let (sender, _) = broadcast::channel(buffer_size);
        Self { sender }
    }
}

#[async_trait]
impl PubSub for MemoryPubSub {
    async fn publish(&self, envelope: ChannelEnvelope) -> AppResult<()> {
        // No running delivery loop means no subscribers; dropping the
        // envelope is correct then.
        let _ = self.sender.send(envelope);
        Ok(())
    }

    fn start(&self, connections: Arc<ConnectionManager>, mut shutdown: broadcast::Receiver<()>) {
        let mut envelopes = self.sender.subscribe();
        tokio::spawn(async move {
            info!("In-memory pub/sub delivery loop started");
            loop {
                tokio::select! {
                    received = envelopes.recv() => match received {
                        Ok(envelope) => {
                            connections.broadcast_to_channel(&envelope.channel, &envelope.message);
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            debug!(skipped, "Pub/sub delivery loop lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                    _ = shutdown.recv() => break,
                }
            }
            info!("In-memory pub/sub delivery loop stopped");
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::registry::ChannelRegistry;
    use crate::connection::handle::ConnectionHandle;
    use crate::message::types::OutboundMessage;
    use civicwatch_core::config::RealtimeConfig;
    use civicwatch_entity::user::UserRole;
    use tokio::sync::mpsc;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_published_envelope_reaches_subscriber() {
        let pubsub = MemoryPubSub::new(16);
        let manager = Arc::new(ConnectionManager::new(
            RealtimeConfig::default(),
            Arc::new(ChannelRegistry::new()),
        ));
        let (shutdown_tx, _) = broadcast::channel(1);
        pubsub.start(manager.clone(), shutdown_tx.subscribe());

        let (tx, mut rx) = mpsc::channel(16);
        let handle = Arc::new(ConnectionHandle::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            UserRole::Citizen,
            tx,
        ));
        manager.register(handle.clone());
        manager.handle_inbound(&handle, r#"{"type":"subscribe","channel":"feed"}"#);
        assert!(matches!(
            rx.recv().await.unwrap(),
            OutboundMessage::Subscribed { .. }
        ));

        pubsub
            .publish(ChannelEnvelope {
                channel: "feed".to_string(),
                message: OutboundMessage::Ping { timestamp: 7 },
            })
            .await
            .unwrap();

        match rx.recv().await.unwrap() {
            OutboundMessage::Ping { timestamp } => assert_eq!(timestamp, 7),
            other => panic!("unexpected message: {other:?}"),
        }
    }
}
