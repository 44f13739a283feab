//! Top-level realtime engine wiring.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::info;

use civicwatch_core::config::RealtimeConfig;
use civicwatch_core::error::AppError;
use civicwatch_core::events::EventBus;
use civicwatch_core::result::AppResult;

use crate::bridge::PubSub;
use crate::bridge::event_bridge::EventBridge;
use crate::bridge::memory_pubsub::MemoryPubSub;
use crate::bridge::redis_pubsub::RedisPubSub;
use crate::channel::registry::ChannelRegistry;
use crate::connection::heartbeat::HeartbeatConfig;
use crate::connection::manager::ConnectionManager;

/// Central realtime engine coordinating channels, connections, and
/// event fan-out.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Connection manager.
    pub connections: Arc<ConnectionManager>,
    /// Channel registry.
    pub channels: Arc<ChannelRegistry>,
    heartbeat: HeartbeatConfig,
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine").finish()
    }
}

impl RealtimeEngine {
    /// Builds the engine and starts the pub/sub delivery loop and the
    /// event bridge. The backend is chosen by `config.pubsub`.
    pub async fn start(config: RealtimeConfig, events: EventBus) -> AppResult<Self> {
        let (shutdown_tx, _) = broadcast::channel(1);

        let channels = Arc::new(ChannelRegistry::new());
        let connections = Arc::new(ConnectionManager::new(config.clone(), channels.clone()));

        let pubsub: Arc<dyn PubSub> = match config.pubsub.as_str() {
            "memory" => Arc::new(MemoryPubSub::new(config.channel_buffer_size)),
            "redis" => Arc::new(RedisPubSub::connect(&config.redis_url).await?),
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown pub/sub backend: {other}"
                )));
            }
        };

        pubsub.start(connections.clone(), shutdown_tx.subscribe());
        EventBridge::new(events, pubsub).spawn(shutdown_tx.subscribe());

        info!(backend = %config.pubsub, "Realtime engine started");

        Ok(Self {
            connections,
            channels,
            heartbeat: HeartbeatConfig::from(&config),
            shutdown_tx,
        })
    }

    /// Heartbeat parameters for per-connection keepalive loops.
    pub fn heartbeat_config(&self) -> HeartbeatConfig {
        self.heartbeat
    }

    /// Stops the background loops and closes every connection.
    pub fn shutdown(&self) {
        info!("Shutting down realtime engine");
        let _ = self.shutdown_tx.send(());
        self.connections.close_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::handle::ConnectionHandle;
    use crate::message::types::OutboundMessage;
    use civicwatch_core::events::{DomainEvent, EventPayload, IssueEvent};
    use civicwatch_entity::user::UserRole;
    use tokio::sync::mpsc;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_rejects_unknown_backend() {
        let config = RealtimeConfig {
            pubsub: "carrier-pigeon".to_string(),
            ..RealtimeConfig::default()
        };
        let result = RealtimeEngine::start(config, EventBus::default()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_domain_event_reaches_feed_subscriber() {
        let events = EventBus::default();
        let engine = RealtimeEngine::start(RealtimeConfig::default(), events.clone())
            .await
            .unwrap();

        let (tx, mut rx) = mpsc::channel(16);
        let handle = Arc::new(ConnectionHandle::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            UserRole::Citizen,
            tx,
        ));
        engine.connections.register(handle.clone());
        engine
            .connections
            .handle_inbound(&handle, r#"{"type":"subscribe","channel":"feed"}"#);
        assert!(matches!(
            rx.recv().await.unwrap(),
            OutboundMessage::Subscribed { .. }
        ));

        let issue_id = Uuid::new_v4();
        events.publish(DomainEvent::new(
            None,
            EventPayload::Issue(IssueEvent::Created {
                issue_id,
                issue: serde_json::json!({"title": "Broken streetlight"}),
            }),
        ));

        match rx.recv().await.unwrap() {
            OutboundMessage::IssueCreated { issue_id: id, .. } => assert_eq!(id, issue_id),
            other => panic!("unexpected message: {other:?}"),
        }

        engine.shutdown();
    }
}
