//! Channel Handler
//!
//! Handles WebSocket upgrade requests and manages the connection lifecycle:
//! registration, the post-connect authenticate handshake, and teardown.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

use super::messages::{ClientMessage, ServerMessage};
use super::registry::{RegistryError, SessionRegistry};
use crate::api::AppState;

/// WebSocket upgrade handler
///
/// Entry point for the persistent channel. Upgrades the HTTP connection
/// and hands the socket to the session lifecycle loop.
pub async fn channel_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    let registry = Arc::clone(&state.registry);
    ws.on_upgrade(move |socket| handle_socket(socket, registry))
}

/// Handle an established WebSocket connection
async fn handle_socket(socket: WebSocket, registry: Arc<SessionRegistry>) {
    let (mut sender, mut receiver) = socket.split();

    // Outbound queue for this session; the forward task below is the only
    // writer to the transport, which preserves per-session event order.
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let session_id = match registry.register(tx).await {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(error = %e, "rejecting connection");
            let error_msg = ServerMessage::Error {
                message: e.to_string(),
            };
            if let Ok(text) = serde_json::to_string(&error_msg) {
                let _ = sender.send(Message::Text(text)).await;
            }
            let _ = sender.close().await;
            return;
        }
    };

    // Greet the client with its session id
    let connected_msg = ServerMessage::Connected {
        session_id: session_id.clone(),
    };
    let greeting = match serde_json::to_string(&connected_msg) {
        Ok(text) => text,
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize greeting");
            registry.unregister(&session_id).await;
            return;
        }
    };
    if sender.send(Message::Text(greeting)).await.is_err() {
        tracing::debug!(session_id = %session_id, "client gone before greeting");
        registry.unregister(&session_id).await;
        return;
    }

    let session_id_for_send = session_id.clone();

    // Forward task: drain the session queue into the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(text) => {
                    if sender.send(Message::Text(text)).await.is_err() {
                        tracing::debug!(
                            session_id = %session_id_for_send,
                            "socket send failed, closing connection"
                        );
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to serialize message");
                }
            }
        }
    });

    let registry_for_recv = Arc::clone(&registry);
    let session_id_for_recv = session_id.clone();

    // Receive task: parse and dispatch client frames
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(msg) => {
                    if !handle_frame(&registry_for_recv, &session_id_for_recv, msg).await {
                        break;
                    }
                }
                Err(e) => {
                    tracing::debug!(
                        session_id = %session_id_for_recv,
                        error = %e,
                        "socket receive error"
                    );
                    break;
                }
            }
        }
    });

    // Either side finishing tears down the other
    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    registry.unregister(&session_id).await;
}

/// Handle a received WebSocket frame
///
/// Returns false if the connection should be closed.
async fn handle_frame(registry: &SessionRegistry, session_id: &str, message: Message) -> bool {
    match message {
        Message::Text(text) => {
            match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => {
                    handle_client_message(registry, session_id, client_msg).await;
                }
                Err(e) => {
                    tracing::debug!(
                        session_id = %session_id,
                        error = %e,
                        "invalid client message"
                    );
                    // Malformed frames get an error reply but keep the
                    // connection open
                    let error_msg = ServerMessage::Error {
                        message: format!("Invalid message format: {}", e),
                    };
                    let _ = registry.send_to(session_id, error_msg).await;
                }
            }
            true
        }
        Message::Binary(_) => {
            let error_msg = ServerMessage::Error {
                message: "Binary messages not supported".to_string(),
            };
            let _ = registry.send_to(session_id, error_msg).await;
            true
        }
        Message::Ping(_) | Message::Pong(_) => {
            // Axum answers transport-level pings itself
            true
        }
        Message::Close(_) => {
            tracing::debug!(session_id = %session_id, "client requested close");
            false
        }
    }
}

/// Handle a parsed client message
async fn handle_client_message(
    registry: &SessionRegistry,
    session_id: &str,
    message: ClientMessage,
) {
    match message {
        ClientMessage::Authenticate { user_id } => {
            match registry.associate(session_id, &user_id).await {
                Ok(()) => {
                    let response = ServerMessage::Authenticated { user_id };
                    let _ = registry.send_to(session_id, response).await;
                }
                // Lost the race against a concurrent disconnect; nothing
                // to recover, the transport is already gone
                Err(RegistryError::UnknownSession(_)) => {
                    tracing::debug!(
                        session_id = %session_id,
                        "associate raced with disconnect"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        session_id = %session_id,
                        error = %e,
                        "associate failed"
                    );
                }
            }
        }
        ClientMessage::Ping => {
            let _ = registry.send_to(session_id, ServerMessage::Pong).await;
        }
    }
}
