//! Core domain types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an accepted client connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(pub u64);

impl ConnectionId {
    /// Create a connection ID from a raw counter value
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw numeric ID
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

impl From<u64> for ConnectionId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Lifecycle status of a single client connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionStatus {
    /// Handshake in progress
    Connecting,
    /// Handshake complete, frames are being relayed
    Open,
    /// Connection has been torn down; further frames are discarded
    Closed,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Connecting => write!(f, "connecting"),
            ConnectionStatus::Open => write!(f, "open"),
            ConnectionStatus::Closed => write!(f, "closed"),
        }
    }
}

/// Lifecycle state of the relay server as a whole
///
/// Governs whether new connections are accepted. Only `Running` accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerState {
    /// Not bound; `start()` is valid from here
    Stopped,
    /// Binding the listening socket
    Starting,
    /// Accepting connections and relaying frames
    Running,
    /// Unbinding and closing connections
    Stopping,
}

impl fmt::Display for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerState::Stopped => write!(f, "stopped"),
            ServerState::Starting => write!(f, "starting"),
            ServerState::Running => write!(f, "running"),
            ServerState::Stopping => write!(f, "stopping"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_display() {
        assert_eq!(format!("{}", ConnectionId::new(7)), "conn-7");
        assert_eq!(ConnectionId::from(7u64), ConnectionId::new(7));
    }

    #[test]
    fn test_connection_status_display() {
        assert_eq!(format!("{}", ConnectionStatus::Open), "open");
        assert_eq!(format!("{}", ConnectionStatus::Closed), "closed");
    }

    #[test]
    fn test_server_state_display() {
        assert_eq!(format!("{}", ServerState::Stopped), "stopped");
        assert_eq!(format!("{}", ServerState::Running), "running");
    }
}
