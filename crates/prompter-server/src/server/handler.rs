//! Per-connection driver and the production connection handler
//!
//! Each accepted socket is driven through the WebSocket handshake and a
//! read loop on its own task. Text frames are forwarded to the
//! [`ConnectionHandler`]; binary and oversized frames are dropped without
//! touching any state. A failure here closes only this connection.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use prompter_core::error::ConnectionError;
use prompter_core::traits::ConnectionHandler;
use prompter_core::types::{ConnectionId, ConnectionStatus};

use crate::broadcast::Broadcaster;
use crate::state::RelayState;

/// Production handler: publishes every inbound message to the broadcaster
pub struct RelayHandler {
    broadcaster: Arc<Broadcaster>,
}

impl RelayHandler {
    /// Create a handler publishing into the given broadcaster
    pub fn new(broadcaster: Arc<Broadcaster>) -> Self {
        Self { broadcaster }
    }
}

#[async_trait]
impl ConnectionHandler for RelayHandler {
    async fn on_open(&self, id: ConnectionId) {
        tracing::info!("Session {} connected", id);
    }

    async fn on_message(&self, id: ConnectionId, text: &str) {
        tracing::trace!("Message from {}: {} bytes", id, text.len());
        self.broadcaster.publish(text);
    }

    async fn on_close(&self, id: ConnectionId) {
        tracing::info!("Session {} closed", id);
    }
}

/// Drive a single client connection from handshake to close
pub(crate) async fn serve_connection(
    state: Arc<RelayState>,
    handler: Arc<dyn ConnectionHandler>,
    socket: TcpStream,
    peer_addr: SocketAddr,
    cancel: CancellationToken,
) {
    let mut ws = match accept_async(socket).await {
        Ok(ws) => ws,
        Err(e) => {
            let err = ConnectionError::Handshake(e.to_string());
            tracing::warn!("Rejected connection from {}: {}", peer_addr, err);
            return;
        }
    };

    let conn = state.connections.register(peer_addr);
    conn.set_status(ConnectionStatus::Open);
    handler.on_open(conn.id).await;

    let max_bytes = state.config.max_message_bytes;

    loop {
        tokio::select! {
            // Server-wide shutdown
            _ = cancel.cancelled() => {
                tracing::debug!("Connection {} cancelled by shutdown", conn.id);
                break;
            }

            // Forced close of this connection only
            _ = conn.cancel.cancelled() => {
                tracing::debug!("Connection {} force-closed", conn.id);
                break;
            }

            frame = ws.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        if text.len() > max_bytes {
                            tracing::warn!(
                                "Dropping oversized frame from {} ({} bytes, limit {})",
                                conn.id,
                                text.len(),
                                max_bytes
                            );
                            continue;
                        }
                        handler.on_message(conn.id, text.as_str()).await;
                    }

                    // Not a hard error: the relay is best-effort, so
                    // non-text payloads are dropped and the link stays up.
                    Some(Ok(Message::Binary(data))) => {
                        tracing::debug!(
                            "Dropping binary frame from {} ({} bytes)",
                            conn.id,
                            data.len()
                        );
                    }

                    Some(Ok(Message::Close(_))) => {
                        tracing::debug!("Connection {} sent close frame", conn.id);
                        break;
                    }

                    // Ping/pong are answered by tungstenite itself
                    Some(Ok(_)) => {}

                    Some(Err(e)) => {
                        let err = ConnectionError::ConnectionLost(e.to_string());
                        tracing::warn!("Connection {} from {}: {}", conn.id, peer_addr, err);
                        break;
                    }

                    None => break,
                }
            }
        }
    }

    state.connections.remove(conn.id);
    handler.on_close(conn.id).await;
    tracing::info!("Connection {} from {} closed", conn.id, peer_addr);
}
