//! WebSocket listener
//!
//! Accepts incoming connections and spawns a driver task for each client.

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use prompter_core::traits::ConnectionHandler;

use crate::server::handler::serve_connection;
use crate::state::RelayState;

/// WebSocket server that listens for incoming connections
pub struct WsListener {
    /// Shared relay state
    state: Arc<RelayState>,
    /// Handler invoked for connection lifecycle events
    handler: Arc<dyn ConnectionHandler>,
    /// Cancellation token for graceful shutdown
    cancel: CancellationToken,
    /// Tracker for per-connection tasks, awaited on shutdown
    tracker: TaskTracker,
}

impl WsListener {
    /// Create a new listener
    pub fn new(
        state: Arc<RelayState>,
        handler: Arc<dyn ConnectionHandler>,
        cancel: CancellationToken,
        tracker: TaskTracker,
    ) -> Self {
        Self {
            state,
            handler,
            cancel,
            tracker,
        }
    }

    /// Run the accept loop on an already-bound listener
    ///
    /// Returns when the cancellation token fires; the listening socket is
    /// dropped (and the port released) on return.
    pub async fn run(self, listener: TcpListener) {
        loop {
            tokio::select! {
                // Check for shutdown
                _ = self.cancel.cancelled() => {
                    tracing::info!("Listener shutting down");
                    break;
                }

                // Accept new connections
                result = listener.accept() => {
                    match result {
                        Ok((socket, peer_addr)) => {
                            tracing::debug!("New connection from {}", peer_addr);

                            let state = Arc::clone(&self.state);
                            let handler = Arc::clone(&self.handler);
                            let cancel = self.cancel.clone();

                            self.tracker.spawn(async move {
                                serve_connection(state, handler, socket, peer_addr, cancel).await;
                            });
                        }
                        Err(e) => {
                            tracing::error!("Failed to accept connection: {}", e);
                        }
                    }
                }
            }
        }
    }
}
