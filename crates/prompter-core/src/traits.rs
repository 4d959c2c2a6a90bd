//! Connection handler trait
//!
//! The session layer drives connections through their lifecycle and reports
//! the interesting moments to a `ConnectionHandler`. The trait is defined
//! independently of any networking library so hosts and tests can supply
//! their own implementations.

use async_trait::async_trait;

use crate::types::ConnectionId;

/// Callbacks for the lifecycle of a single client connection
#[async_trait]
pub trait ConnectionHandler: Send + Sync {
    /// A connection completed its handshake and is now open
    async fn on_open(&self, id: ConnectionId);

    /// A text frame arrived on an open connection
    async fn on_message(&self, id: ConnectionId, text: &str);

    /// The connection closed (client close frame, error, or shutdown)
    async fn on_close(&self, id: ConnectionId);
}
