//! Redis pub/sub for multi-instance deployments.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use civicwatch_core::error::AppError;
use civicwatch_core::result::AppResult;

use crate::bridge::{ChannelEnvelope, PubSub};
use crate::connection::manager::ConnectionManager;

/// All instances relay envelopes over this Redis channel.
const RELAY_CHANNEL: &str = "civicwatch:realtime";
/// Wait between subscriber reconnect attempts.
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Pub/sub backed by Redis PUBLISH/SUBSCRIBE.
///
/// Every instance publishes serialized envelopes to a shared relay
/// channel and runs a subscriber that feeds received envelopes into its
/// local connections, so events raised on one instance reach clients
/// connected to any instance.
#[derive(Debug)]
pub struct RedisPubSub {
    client: redis::Client,
    publish_conn: redis::aio::MultiplexedConnection,
}

impl RedisPubSub {
    /// Connects to Redis at the given URL.
    pub async fn connect(url: &str) -> AppResult<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| AppError::configuration(format!("Invalid Redis URL: {e}")))?;
        let publish_conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::internal(format!("Redis connection failed: {e}")))?;
        info!("Redis pub/sub connected");
        Ok(Self {
            client,
            publish_conn,
        })
    }
}

#[async_trait]
impl PubSub for RedisPubSub {
    async fn publish(&self, envelope: ChannelEnvelope) -> AppResult<()> {
        let payload = serde_json::to_string(&envelope)?;
        let mut conn = self.publish_conn.clone();
        redis::cmd("PUBLISH")
            .arg(RELAY_CHANNEL)
            .arg(payload)
            .query_async::<i64>(&mut conn)
            .await
            .map_err(|e| AppError::internal(format!("Redis PUBLISH failed: {e}")))?;
        Ok(())
    }

    fn start(&self, connections: Arc<ConnectionManager>, mut shutdown: broadcast::Receiver<()>) {
        let client = self.client.clone();
        tokio::spawn(async move {
            info!("Redis pub/sub delivery loop started");
            loop {
                let mut pubsub = match client.get_async_pubsub().await {
                    Ok(pubsub) => pubsub,
                    Err(e) => {
                        error!(error = %e, "Redis subscriber connection failed, retrying");
                        tokio::select! {
                            _ = tokio::time::sleep(RECONNECT_DELAY) => continue,
                            _ = shutdown.recv() => break,
                        }
                    }
                };
                if let Err(e) = pubsub.subscribe(RELAY_CHANNEL).await {
                    error!(error = %e, "Redis SUBSCRIBE failed, retrying");
                    tokio::select! {
                        _ = tokio::time::sleep(RECONNECT_DELAY) => continue,
                        _ = shutdown.recv() => break,
                    }
                }

                let mut messages = pubsub.on_message();
                loop {
                    tokio::select! {
                        received = messages.next() => match received {
                            Some(message) => deliver(&connections, &message),
                            // Stream end means the connection dropped.
                            None => break,
                        },
                        _ = shutdown.recv() => {
                            info!("Redis pub/sub delivery loop stopped");
                            return;
                        }
                    }
                }

                warn!("Redis subscriber disconnected, reconnecting");
            }
        });
    }
}

fn deliver(connections: &ConnectionManager, message: &redis::Msg) {
    let payload: String = match message.get_payload() {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "Undecodable Redis payload");
            return;
        }
    };
    match serde_json::from_str::<ChannelEnvelope>(&payload) {
        Ok(envelope) => {
            connections.broadcast_to_channel(&envelope.channel, &envelope.message);
        }
        Err(e) => warn!(error = %e, "Unparseable relay envelope"),
    }
}
