//! Relay lifecycle controller
//!
//! [`MessageRelay`] is an explicitly owned service instance: whatever hosts
//! it (a UI shell, the bundled binary, a test harness) constructs one,
//! injects it where needed, and drives `start()`/`stop()`. Multiple
//! independent instances can coexist, each with its own state.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use prompter_core::config::RelayConfig;
use prompter_core::error::{BindError, RelayError};
use prompter_core::traits::ConnectionHandler;
use prompter_core::types::ServerState;

use crate::broadcast::Subscription;
use crate::server::{RelayHandler, WsListener};
use crate::state::RelayState;

/// Bound on how long `stop()` waits for connection tasks to finish
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// The message relay server
///
/// Owns the broadcaster and connection table; `start()` binds the listening
/// socket and `stop()` releases it, force-closing every open connection.
/// Repeated calls from the same state are no-ops, not errors.
pub struct MessageRelay {
    /// Shared state handed to listener and connection tasks
    state: Arc<RelayState>,
    /// Handler invoked for connection lifecycle events
    handler: Arc<dyn ConnectionHandler>,
    /// Current server state, observable as a change stream
    server_state: watch::Sender<ServerState>,
    /// Resources of the active run, present only between start and stop
    run: Mutex<Option<RunHandle>>,
}

/// Resources owned by one start/stop cycle
struct RunHandle {
    cancel: CancellationToken,
    tracker: TaskTracker,
    listener_task: JoinHandle<()>,
    local_addr: SocketAddr,
}

impl MessageRelay {
    /// Create a relay with the production handler (messages feed the
    /// broadcaster)
    pub fn new(config: RelayConfig) -> Self {
        let state = Arc::new(RelayState::new(config));
        let handler = Arc::new(RelayHandler::new(Arc::clone(&state.broadcaster)));
        Self::with_handler_inner(state, handler)
    }

    /// Create a relay with a custom connection handler
    pub fn with_handler(config: RelayConfig, handler: Arc<dyn ConnectionHandler>) -> Self {
        Self::with_handler_inner(Arc::new(RelayState::new(config)), handler)
    }

    fn with_handler_inner(state: Arc<RelayState>, handler: Arc<dyn ConnectionHandler>) -> Self {
        let (server_state, _) = watch::channel(ServerState::Stopped);
        Self {
            state,
            handler,
            server_state,
            run: Mutex::new(None),
        }
    }

    /// Start the relay
    ///
    /// Binds the configured address and begins accepting connections.
    /// Returns the bound address (informative when the configured port is
    /// 0). Calling `start()` while already starting or running is a no-op
    /// returning the existing address. The latest message does not survive
    /// restarts: each start resets it to the initial empty value.
    ///
    /// A bind failure is the only error surfaced to callers; the relay
    /// returns to `Stopped` and can be started again after freeing the
    /// port or changing it.
    pub async fn start(&self) -> Result<SocketAddr, RelayError> {
        let mut run = self.run.lock().await;
        if let Some(active) = run.as_ref() {
            return Ok(active.local_addr);
        }

        self.server_state.send_replace(ServerState::Starting);
        self.state.broadcaster.reset();

        let addr = self.state.config.socket_addr();
        let listener = match TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(source) => {
                self.server_state.send_replace(ServerState::Stopped);
                return Err(BindError { addr, source }.into());
            }
        };
        let local_addr = match listener.local_addr() {
            Ok(local_addr) => local_addr,
            Err(e) => {
                self.server_state.send_replace(ServerState::Stopped);
                return Err(e.into());
            }
        };

        let cancel = CancellationToken::new();
        let tracker = TaskTracker::new();
        let ws = WsListener::new(
            Arc::clone(&self.state),
            Arc::clone(&self.handler),
            cancel.clone(),
            tracker.clone(),
        );
        let listener_task = tokio::spawn(ws.run(listener));

        *run = Some(RunHandle {
            cancel,
            tracker,
            listener_task,
            local_addr,
        });
        self.server_state.send_replace(ServerState::Running);
        tracing::info!("Relay listening on {}", local_addr);

        Ok(local_addr)
    }

    /// Stop the relay
    ///
    /// Unbinds the listening socket and force-closes every open
    /// connection; consumers keep their subscriptions but simply stop
    /// receiving updates. Waits (bounded) for in-flight connection tasks
    /// so the port is free for an immediate restart. Calling `stop()` when
    /// already stopped or stopping is a no-op.
    pub async fn stop(&self) {
        let mut run = self.run.lock().await;
        let Some(active) = run.take() else {
            return;
        };

        self.server_state.send_replace(ServerState::Stopping);
        active.cancel.cancel();
        self.state.connections.close_all();
        active.tracker.close();

        let drain = async {
            let _ = active.listener_task.await;
            active.tracker.wait().await;
        };
        if tokio::time::timeout(SHUTDOWN_TIMEOUT, drain).await.is_err() {
            tracing::warn!("Timed out waiting for connection tasks to stop");
        }

        self.server_state.send_replace(ServerState::Stopped);
        tracing::info!("Relay stopped");
    }

    /// Current server state
    pub fn state(&self) -> ServerState {
        *self.server_state.borrow()
    }

    /// Watch server state transitions
    pub fn state_changes(&self) -> watch::Receiver<ServerState> {
        self.server_state.subscribe()
    }

    /// Attach a consumer to the latest-message stream
    ///
    /// Valid in any server state; the first received value is the current
    /// one. Subscriptions span stop/start cycles.
    pub fn subscribe(&self) -> Subscription {
        self.state.broadcaster.subscribe()
    }

    /// The current latest message
    pub fn latest(&self) -> String {
        self.state.broadcaster.latest()
    }

    /// Number of currently open connections
    pub fn connection_count(&self) -> usize {
        self.state.connections.len()
    }

    /// The relay configuration
    pub fn config(&self) -> &RelayConfig {
        &self.state.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loopback_config() -> RelayConfig {
        RelayConfig {
            bind_address: [127, 0, 0, 1].into(),
            port: 0,
            ..RelayConfig::default()
        }
    }

    #[tokio::test]
    async fn test_starts_stopped() {
        let relay = MessageRelay::new(loopback_config());
        assert_eq!(relay.state(), ServerState::Stopped);
        assert_eq!(relay.connection_count(), 0);
        assert_eq!(relay.latest(), "");
    }

    #[tokio::test]
    async fn test_start_transitions_to_running() {
        let relay = MessageRelay::new(loopback_config());
        let addr = relay.start().await.unwrap();
        assert_eq!(relay.state(), ServerState::Running);
        assert_ne!(addr.port(), 0);
        relay.stop().await;
        assert_eq!(relay.state(), ServerState::Stopped);
    }

    #[tokio::test]
    async fn test_start_twice_is_noop() {
        let relay = MessageRelay::new(loopback_config());
        let first = relay.start().await.unwrap();
        let second = relay.start().await.unwrap();
        assert_eq!(first, second);
        relay.stop().await;
    }

    #[tokio::test]
    async fn test_stop_from_stopped_is_noop() {
        let relay = MessageRelay::new(loopback_config());
        relay.stop().await;
        relay.stop().await;
        assert_eq!(relay.state(), ServerState::Stopped);
    }

    #[tokio::test]
    async fn test_bind_conflict_surfaces_bind_error() {
        let relay = MessageRelay::new(loopback_config());
        let addr = relay.start().await.unwrap();

        let mut config = loopback_config();
        config.port = addr.port();
        let second = MessageRelay::new(config);

        let err = second.start().await.unwrap_err();
        assert!(matches!(err, RelayError::Bind(_)));
        assert_eq!(second.state(), ServerState::Stopped);

        relay.stop().await;
    }

    #[tokio::test]
    async fn test_restart_rebinds_same_port() {
        let mut config = loopback_config();
        let relay = MessageRelay::new(config.clone());
        let addr = relay.start().await.unwrap();
        relay.stop().await;

        // The port must be released by the time stop() returns.
        config.port = addr.port();
        let again = MessageRelay::new(config);
        let addr2 = again.start().await.unwrap();
        assert_eq!(addr.port(), addr2.port());
        again.stop().await;
    }

    #[tokio::test]
    async fn test_state_changes_observable() {
        let relay = MessageRelay::new(loopback_config());
        let rx = relay.state_changes();
        assert_eq!(*rx.borrow(), ServerState::Stopped);

        relay.start().await.unwrap();
        assert_eq!(*rx.borrow(), ServerState::Running);

        relay.stop().await;
        assert_eq!(*rx.borrow(), ServerState::Stopped);
    }
}
