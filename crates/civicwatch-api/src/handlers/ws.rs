//! WebSocket upgrade handler.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{info, warn};

use civicwatch_core::error::AppError;
use civicwatch_realtime::connection::heartbeat::run_heartbeat;
use civicwatch_realtime::{ConnectionHandle, OutboundMessage};

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameter for WebSocket authentication. Browsers cannot set
/// headers on upgrade requests, so the token rides the query string.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    /// JWT access token.
    pub token: String,
}

/// GET /ws?token={jwt}: WebSocket upgrade
pub async fn ws_handler(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
) -> Result<Response, ApiError> {
    // Authenticate before upgrading; a bad token gets a plain 401
    // instead of an upgrade that immediately closes.
    let claims = state.session_manager.authenticate(&query.token)?;
    let session = state
        .session_repo
        .find_by_id(claims.session_id())
        .await
        .map_err(ApiError)?
        .ok_or_else(|| ApiError(AppError::session("Session no longer exists")))?;
    if !session.is_active() {
        return Err(ApiError(AppError::session(
            "Session has been revoked or expired",
        )));
    }

    Ok(ws.on_upgrade(move |socket| handle_socket(state, claims, socket)))
}

async fn handle_socket(state: AppState, claims: civicwatch_auth::jwt::Claims, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let (tx, mut outbound_rx) =
        mpsc::channel::<OutboundMessage>(state.config.realtime.channel_buffer_size);
    let handle = Arc::new(ConnectionHandle::new(
        claims.user_id(),
        claims.session_id(),
        claims.role,
        tx,
    ));
    state.realtime.connections.register(handle.clone());

    info!(
        connection_id = %handle.id,
        user_id = %handle.user_id,
        "WebSocket connection established"
    );

    // Forward queued outbound messages onto the wire.
    let forwarder = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    warn!(error = %e, "Outbound message serialization failed");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    // The inbound loop and the heartbeat race; whichever finishes first
    // tears the connection down.
    let heartbeat_handle = handle.clone();
    let heartbeat_config = state.realtime.heartbeat_config();
    tokio::select! {
        _ = async {
            while let Some(result) = ws_rx.next().await {
                match result {
                    Ok(Message::Text(text)) => {
                        state.realtime.connections.handle_inbound(&handle, text.as_str());
                    }
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!(connection_id = %handle.id, error = %e, "WebSocket error");
                        break;
                    }
                }
            }
        } => {}
        _ = run_heartbeat(heartbeat_handle, heartbeat_config) => {}
    }

    forwarder.abort();
    state.realtime.connections.unregister(handle.id);

    info!(
        connection_id = %handle.id,
        user_id = %handle.user_id,
        "WebSocket connection closed"
    );
}
