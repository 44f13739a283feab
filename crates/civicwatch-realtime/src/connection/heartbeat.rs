//! Ping/pong heartbeat for WebSocket keepalive.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time;
use tracing::{debug, warn};

use civicwatch_core::config::RealtimeConfig;

use crate::connection::handle::ConnectionHandle;
use crate::message::types::OutboundMessage;

/// Heartbeat parameters derived from [`RealtimeConfig`].
#[derive(Debug, Clone, Copy)]
pub struct HeartbeatConfig {
    /// Interval between pings.
    pub ping_interval: Duration,
    /// Pongs a client may miss before the connection is closed.
    pub max_missed_pongs: u32,
}

impl From<&RealtimeConfig> for HeartbeatConfig {
    fn from(config: &RealtimeConfig) -> Self {
        Self {
            ping_interval: Duration::from_secs(config.ping_interval_seconds),
            max_missed_pongs: config.max_missed_pongs,
        }
    }
}

impl HeartbeatConfig {
    /// How long a connection may go without a pong.
    fn pong_deadline(&self) -> Duration {
        // One interval of grace on top of the missed-pong budget, since
        // a pong for the most recent ping may still be in flight.
        self.ping_interval * (self.max_missed_pongs + 1)
    }
}

/// Runs the heartbeat loop for one connection.
///
/// Sends a ping every interval and closes the connection once the
/// client has missed the configured number of pongs. Returns when the
/// connection dies for any reason.
pub async fn run_heartbeat(handle: Arc<ConnectionHandle>, config: HeartbeatConfig) {
    let mut interval = time::interval(config.ping_interval);
    // The first tick fires immediately; skip it so the client gets a
    // full interval before the first ping.
    interval.tick().await;

    loop {
        interval.tick().await;

        if !handle.is_alive() {
            break;
        }

        let silent_for = Utc::now() - handle.last_pong();
        if let Ok(silent_for) = silent_for.to_std()
            && silent_for > config.pong_deadline()
        {
            warn!(
                connection_id = %handle.id,
                silent_secs = silent_for.as_secs(),
                "Heartbeat timeout, closing connection"
            );
            handle.mark_dead();
            break;
        }

        let ping = OutboundMessage::Ping {
            timestamp: Utc::now().timestamp_millis(),
        };
        if !handle.send(ping) && !handle.is_alive() {
            break;
        }
    }

    debug!(connection_id = %handle.id, "Heartbeat loop ended");
}

#[cfg(test)]
mod tests {
    use super::*;
    use civicwatch_entity::user::UserRole;
    use tokio::sync::mpsc;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_missed_pongs_close_connection() {
        let (tx, mut rx) = mpsc::channel(64);
        let handle = Arc::new(ConnectionHandle::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            UserRole::Citizen,
            tx,
        ));

        let config = HeartbeatConfig {
            ping_interval: Duration::from_millis(10),
            max_missed_pongs: 1,
        };

        // Never pong; the loop must give up on its own.
        tokio::time::timeout(
            Duration::from_secs(5),
            run_heartbeat(handle.clone(), config),
        )
        .await
        .expect("heartbeat should time out the silent connection");
        assert!(!handle.is_alive());

        let mut pings = 0;
        while let Ok(message) = rx.try_recv() {
            assert!(matches!(message, OutboundMessage::Ping { .. }));
            pings += 1;
        }
        assert!(pings >= 1);
    }
}
