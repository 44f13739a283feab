//! Connection registration, inbound dispatch, and channel broadcast.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

use civicwatch_core::config::RealtimeConfig;

use crate::channel::registry::ChannelRegistry;
use crate::channel::types::ChannelType;
use crate::connection::handle::{ConnectionHandle, ConnectionId};
use crate::message::types::{InboundMessage, OutboundMessage};

/// Manages all live WebSocket connections on this instance.
#[derive(Debug)]
pub struct ConnectionManager {
    config: RealtimeConfig,
    registry: Arc<ChannelRegistry>,
    /// Connection ID → handle.
    by_id: DashMap<ConnectionId, Arc<ConnectionHandle>>,
    /// User ID → that user's handles, oldest first.
    by_user: DashMap<Uuid, Vec<Arc<ConnectionHandle>>>,
}

impl ConnectionManager {
    /// Creates a new connection manager.
    pub fn new(config: RealtimeConfig, registry: Arc<ChannelRegistry>) -> Self {
        Self {
            config,
            registry,
            by_id: DashMap::new(),
            by_user: DashMap::new(),
        }
    }

    /// Registers a freshly upgraded connection.
    ///
    /// Auto-subscribes it to the user's personal channel. When the user
    /// exceeds the per-user connection cap, the oldest connection is
    /// evicted so reconnecting clients cannot accumulate sockets.
    pub fn register(&self, handle: Arc<ConnectionHandle>) {
        let evicted = {
            let mut connections = self.by_user.entry(handle.user_id).or_default();
            connections.push(handle.clone());
            if connections.len() > self.config.max_connections_per_user {
                Some(connections.remove(0))
            } else {
                None
            }
        };

        if let Some(old) = evicted {
            info!(
                connection_id = %old.id,
                user_id = %old.user_id,
                "Connection cap reached, evicting oldest connection"
            );
            old.mark_dead();
            self.cleanup(old.id);
        }

        self.by_id.insert(handle.id, handle.clone());
        self.registry.subscribe(
            handle.id,
            &ChannelType::User(handle.user_id).to_channel_name(),
        );

        debug!(
            connection_id = %handle.id,
            user_id = %handle.user_id,
            total = self.connection_count(),
            "Connection registered"
        );
    }

    /// Removes a disconnected connection and all its subscriptions.
    pub fn unregister(&self, conn_id: ConnectionId) {
        if let Some((_, handle)) = self.by_id.remove(&conn_id) {
            handle.mark_dead();
            self.remove_from_user_index(&handle);
        }
        self.registry.unsubscribe_all(conn_id);
        debug!(connection_id = %conn_id, "Connection unregistered");
    }

    /// Handles one inbound text frame from a client.
    pub fn handle_inbound(&self, handle: &ConnectionHandle, raw: &str) {
        let message: InboundMessage = match serde_json::from_str(raw) {
            Ok(message) => message,
            Err(e) => {
                debug!(connection_id = %handle.id, error = %e, "Unparseable inbound frame");
                handle.send(OutboundMessage::Error {
                    code: "bad_message".to_string(),
                    message: "Message could not be parsed".to_string(),
                });
                return;
            }
        };

        match message {
            InboundMessage::Subscribe { channel } => self.handle_subscribe(handle, &channel),
            InboundMessage::Unsubscribe { channel } => {
                self.registry.unsubscribe(handle.id, &channel);
            }
            InboundMessage::Pong { .. } => handle.record_pong(),
        }
    }

    fn handle_subscribe(&self, handle: &ConnectionHandle, channel: &str) {
        let Some(parsed) = ChannelType::parse(channel) else {
            handle.send(OutboundMessage::Error {
                code: "unknown_channel".to_string(),
                message: format!("Unknown channel: {channel}"),
            });
            return;
        };

        if !parsed.can_subscribe(handle.user_id, handle.role) {
            warn!(
                connection_id = %handle.id,
                user_id = %handle.user_id,
                channel,
                "Subscription denied"
            );
            handle.send(OutboundMessage::Error {
                code: "forbidden".to_string(),
                message: format!("Not allowed to subscribe to {channel}"),
            });
            return;
        }

        if self.registry.subscription_count(handle.id)
            >= self.config.max_subscriptions_per_connection
            && !self.registry.is_subscribed(handle.id, channel)
        {
            handle.send(OutboundMessage::Error {
                code: "too_many_subscriptions".to_string(),
                message: "Subscription limit reached".to_string(),
            });
            return;
        }

        self.registry.subscribe(handle.id, channel);
        handle.send(OutboundMessage::Subscribed {
            channel: channel.to_string(),
        });
    }

    /// Broadcasts a message to every subscriber of a channel. Returns
    /// the number of connections the message was enqueued for.
    pub fn broadcast_to_channel(&self, channel: &str, message: &OutboundMessage) -> usize {
        let mut delivered = 0;
        for conn_id in self.registry.subscribers(channel) {
            if let Some(handle) = self.by_id.get(&conn_id)
                && handle.send(message.clone())
            {
                delivered += 1;
            }
        }
        delivered
    }

    /// Closes every connection belonging to a session. Used when the
    /// session is revoked so the socket dies with the token.
    pub fn close_session(&self, session_id: Uuid) -> usize {
        let doomed: Vec<Arc<ConnectionHandle>> = self
            .by_id
            .iter()
            .filter(|entry| entry.value().session_id == session_id)
            .map(|entry| entry.value().clone())
            .collect();

        for handle in &doomed {
            handle.mark_dead();
            self.cleanup(handle.id);
        }
        doomed.len()
    }

    /// Closes all connections. Part of graceful shutdown.
    pub fn close_all(&self) {
        let handles: Vec<Arc<ConnectionHandle>> = self
            .by_id
            .iter()
            .map(|entry| entry.value().clone())
            .collect();

        for handle in handles {
            handle.mark_dead();
            self.cleanup(handle.id);
        }
        info!("All realtime connections closed");
    }

    /// Number of live connections.
    pub fn connection_count(&self) -> usize {
        self.by_id.len()
    }

    /// Number of distinct connected users.
    pub fn user_count(&self) -> usize {
        self.by_user.len()
    }

    fn cleanup(&self, conn_id: ConnectionId) {
        if let Some((_, handle)) = self.by_id.remove(&conn_id) {
            self.remove_from_user_index(&handle);
        }
        self.registry.unsubscribe_all(conn_id);
    }

    fn remove_from_user_index(&self, handle: &ConnectionHandle) {
        if let Some(mut connections) = self.by_user.get_mut(&handle.user_id) {
            connections.retain(|c| c.id != handle.id);
            let empty = connections.is_empty();
            drop(connections);
            if empty {
                self.by_user.remove_if(&handle.user_id, |_, c| c.is_empty());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use civicwatch_entity::user::UserRole;
    use tokio::sync::mpsc;

    fn manager() -> ConnectionManager {
        let config = RealtimeConfig {
            max_connections_per_user: 2,
            max_subscriptions_per_connection: 3,
            ..RealtimeConfig::default()
        };
        ConnectionManager::new(config, Arc::new(ChannelRegistry::new()))
    }

    fn connect(
        manager: &ConnectionManager,
        user_id: Uuid,
        role: UserRole,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<OutboundMessage>) {
        let (tx, rx) = mpsc::channel(16);
        let handle = Arc::new(ConnectionHandle::new(user_id, Uuid::new_v4(), role, tx));
        manager.register(handle.clone());
        (handle, rx)
    }

    #[tokio::test]
    async fn test_register_auto_subscribes_personal_channel() {
        let manager = manager();
        let user_id = Uuid::new_v4();
        let (handle, _rx) = connect(&manager, user_id, UserRole::Citizen);

        let personal = ChannelType::User(user_id).to_channel_name();
        assert!(manager.registry.is_subscribed(handle.id, &personal));
        assert_eq!(manager.broadcast_to_channel(&personal, &ping()), 1);
    }

    #[tokio::test]
    async fn test_connection_cap_evicts_oldest() {
        let manager = manager();
        let user_id = Uuid::new_v4();

        let (first, _rx1) = connect(&manager, user_id, UserRole::Citizen);
        let (_second, _rx2) = connect(&manager, user_id, UserRole::Citizen);
        let (third, _rx3) = connect(&manager, user_id, UserRole::Citizen);

        assert!(!first.is_alive());
        assert!(third.is_alive());
        assert_eq!(manager.connection_count(), 2);
        assert_eq!(manager.registry.subscription_count(first.id), 0);
    }

    #[tokio::test]
    async fn test_subscribe_denied_for_foreign_personal_channel() {
        let manager = manager();
        let (handle, mut rx) = connect(&manager, Uuid::new_v4(), UserRole::Citizen);

        let foreign = format!(r#"{{"type":"subscribe","channel":"user:{}"}}"#, Uuid::new_v4());
        manager.handle_inbound(&handle, &foreign);

        match rx.recv().await.unwrap() {
            OutboundMessage::Error { code, .. } => assert_eq!(code, "forbidden"),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_subscribe_confirms_and_receives_broadcast() {
        let manager = manager();
        let (handle, mut rx) = connect(&manager, Uuid::new_v4(), UserRole::Citizen);

        manager.handle_inbound(&handle, r#"{"type":"subscribe","channel":"feed"}"#);
        match rx.recv().await.unwrap() {
            OutboundMessage::Subscribed { channel } => assert_eq!(channel, "feed"),
            other => panic!("unexpected message: {other:?}"),
        }

        assert_eq!(manager.broadcast_to_channel("feed", &ping()), 1);
        assert!(matches!(
            rx.recv().await.unwrap(),
            OutboundMessage::Ping { .. }
        ));
    }

    #[tokio::test]
    async fn test_unregister_tears_down_subscriptions() {
        let manager = manager();
        let (handle, _rx) = connect(&manager, Uuid::new_v4(), UserRole::Citizen);
        manager.handle_inbound(&handle, r#"{"type":"subscribe","channel":"feed"}"#);

        manager.unregister(handle.id);

        assert_eq!(manager.connection_count(), 0);
        assert_eq!(manager.user_count(), 0);
        assert_eq!(manager.registry.channel_count(), 0);
        assert_eq!(manager.broadcast_to_channel("feed", &ping()), 0);
    }

    #[tokio::test]
    async fn test_subscription_limit() {
        let manager = manager();
        let (handle, mut rx) = connect(&manager, Uuid::new_v4(), UserRole::Citizen);

        // The personal auto-subscription counts toward the limit of 3.
        manager.handle_inbound(&handle, r#"{"type":"subscribe","channel":"feed"}"#);
        let issue = format!(r#"{{"type":"subscribe","channel":"issue:{}"}}"#, Uuid::new_v4());
        manager.handle_inbound(&handle, &issue);
        let overflow = format!(r#"{{"type":"subscribe","channel":"issue:{}"}}"#, Uuid::new_v4());
        manager.handle_inbound(&handle, &overflow);

        let mut codes = Vec::new();
        while let Ok(message) = rx.try_recv() {
            if let OutboundMessage::Error { code, .. } = message {
                codes.push(code);
            }
        }
        assert_eq!(codes, vec!["too_many_subscriptions"]);
    }

    fn ping() -> OutboundMessage {
        OutboundMessage::Ping { timestamp: 0 }
    }
}
