//! Channel subscription registry.
//!
//! Maps channel names to subscriber sets with a reverse index from
//! connection to subscribed names. Channels exist only while they have
//! subscribers; the last unsubscribe removes the entry, so a closed
//! connection can never leak a channel.

use std::collections::HashSet;

use dashmap::DashMap;

use crate::connection::handle::ConnectionId;

/// Thread-safe registry of channel subscriptions.
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    /// Channel name → subscriber connection IDs.
    channels: DashMap<String, HashSet<ConnectionId>>,
    /// Connection ID → subscribed channel names.
    by_connection: DashMap<ConnectionId, HashSet<String>>,
}

impl ChannelRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a connection to a channel. Idempotent.
    pub fn subscribe(&self, conn_id: ConnectionId, channel: &str) {
        self.channels
            .entry(channel.to_string())
            .or_default()
            .insert(conn_id);
        self.by_connection
            .entry(conn_id)
            .or_default()
            .insert(channel.to_string());
    }

    /// Unsubscribes a connection from a channel, dropping the channel
    /// when it was the last subscriber.
    pub fn unsubscribe(&self, conn_id: ConnectionId, channel: &str) {
        if let Some(mut subscribers) = self.channels.get_mut(channel) {
            subscribers.remove(&conn_id);
            let empty = subscribers.is_empty();
            drop(subscribers);
            if empty {
                self.channels.remove_if(channel, |_, s| s.is_empty());
            }
        }

        if let Some(mut subscribed) = self.by_connection.get_mut(&conn_id) {
            subscribed.remove(channel);
            let empty = subscribed.is_empty();
            drop(subscribed);
            if empty {
                self.by_connection.remove_if(&conn_id, |_, s| s.is_empty());
            }
        }
    }

    /// Removes every subscription held by a connection.
    pub fn unsubscribe_all(&self, conn_id: ConnectionId) {
        let Some((_, subscribed)) = self.by_connection.remove(&conn_id) else {
            return;
        };
        for channel in subscribed {
            if let Some(mut subscribers) = self.channels.get_mut(&channel) {
                subscribers.remove(&conn_id);
                let empty = subscribers.is_empty();
                drop(subscribers);
                if empty {
                    self.channels.remove_if(&channel, |_, s| s.is_empty());
                }
            }
        }
    }

    /// The current subscribers of a channel.
    pub fn subscribers(&self, channel: &str) -> Vec<ConnectionId> {
        self.channels
            .get(channel)
            .map(|entry| entry.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Whether a connection is subscribed to a channel.
    pub fn is_subscribed(&self, conn_id: ConnectionId, channel: &str) -> bool {
        self.by_connection
            .get(&conn_id)
            .map(|subscribed| subscribed.contains(channel))
            .unwrap_or(false)
    }

    /// How many channels a connection is subscribed to.
    pub fn subscription_count(&self, conn_id: ConnectionId) -> usize {
        self.by_connection
            .get(&conn_id)
            .map(|subscribed| subscribed.len())
            .unwrap_or(0)
    }

    /// Number of live channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_subscribe_and_broadcast_targets() {
        let registry = ChannelRegistry::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        registry.subscribe(a, "feed");
        registry.subscribe(b, "feed");
        registry.subscribe(a, "admin");

        let mut subscribers = registry.subscribers("feed");
        subscribers.sort();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(subscribers, expected);
        assert_eq!(registry.subscribers("admin"), vec![a]);
        assert_eq!(registry.subscription_count(a), 2);
    }

    #[test]
    fn test_subscribe_is_idempotent() {
        let registry = ChannelRegistry::new();
        let conn = Uuid::new_v4();

        registry.subscribe(conn, "feed");
        registry.subscribe(conn, "feed");

        assert_eq!(registry.subscribers("feed").len(), 1);
        assert_eq!(registry.subscription_count(conn), 1);
    }

    #[test]
    fn test_last_unsubscribe_drops_channel() {
        let registry = ChannelRegistry::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        registry.subscribe(a, "feed");
        registry.subscribe(b, "feed");
        assert_eq!(registry.channel_count(), 1);

        registry.unsubscribe(a, "feed");
        assert_eq!(registry.channel_count(), 1);

        registry.unsubscribe(b, "feed");
        assert_eq!(registry.channel_count(), 0);
        assert!(registry.subscribers("feed").is_empty());
    }

    #[test]
    fn test_unsubscribe_all_leaves_no_trace() {
        let registry = ChannelRegistry::new();
        let conn = Uuid::new_v4();
        let other = Uuid::new_v4();
        let issue = format!("issue:{}", Uuid::new_v4());

        registry.subscribe(conn, "feed");
        registry.subscribe(conn, &issue);
        registry.subscribe(other, "feed");

        registry.unsubscribe_all(conn);

        assert_eq!(registry.subscription_count(conn), 0);
        assert!(!registry.is_subscribed(conn, "feed"));
        assert_eq!(registry.subscribers("feed"), vec![other]);
        // The issue channel had no other subscribers, so it is gone.
        assert_eq!(registry.channel_count(), 1);
    }
}
