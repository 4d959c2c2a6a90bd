//! Shared relay state

use std::sync::Arc;

use prompter_core::config::RelayConfig;

use crate::broadcast::Broadcaster;
use crate::connection::ConnectionTable;

/// State shared by the listener, connection tasks, and the lifecycle API
pub struct RelayState {
    /// Configuration
    pub config: RelayConfig,
    /// Table of active connections
    pub connections: Arc<ConnectionTable>,
    /// Latest-message broadcaster
    pub broadcaster: Arc<Broadcaster>,
}

impl RelayState {
    /// Create new relay state
    pub fn new(config: RelayConfig) -> Self {
        Self {
            config,
            connections: Arc::new(ConnectionTable::new()),
            broadcaster: Arc::new(Broadcaster::new()),
        }
    }

    /// Get the connection table
    pub fn connection_table(&self) -> &Arc<ConnectionTable> {
        &self.connections
    }

    /// Get the broadcaster
    pub fn broadcaster(&self) -> &Arc<Broadcaster> {
        &self.broadcaster
    }
}
