//! Connection table
//!
//! Tracks every accepted client connection for the lifetime of its link.
//! The table is the sole owner of connection handles; a handle leaves the
//! table exactly once, on close or server shutdown.

use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use prompter_core::types::{ConnectionId, ConnectionStatus};

/// Table of active client connections
pub struct ConnectionTable {
    /// Connections indexed by connection ID
    connections: DashMap<ConnectionId, Arc<ConnectionHandle>>,
    /// Allocator for connection IDs
    next_id: AtomicU64,
}

/// One accepted client connection
pub struct ConnectionHandle {
    /// Connection identifier, unique for the table's lifetime
    pub id: ConnectionId,
    /// Peer address of the client
    pub peer_addr: SocketAddr,
    /// When the connection was accepted
    pub opened_at: Instant,
    /// Token to force-close this connection
    pub cancel: CancellationToken,
    /// Current lifecycle status
    status: Mutex<ConnectionStatus>,
}

impl ConnectionHandle {
    fn new(id: ConnectionId, peer_addr: SocketAddr) -> Self {
        Self {
            id,
            peer_addr,
            opened_at: Instant::now(),
            cancel: CancellationToken::new(),
            status: Mutex::new(ConnectionStatus::Connecting),
        }
    }

    /// Current status
    pub fn status(&self) -> ConnectionStatus {
        *self.status.lock().expect("status lock poisoned")
    }

    /// Record a status transition
    pub fn set_status(&self, status: ConnectionStatus) {
        *self.status.lock().expect("status lock poisoned") = status;
    }
}

impl ConnectionTable {
    /// Create a new empty connection table
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a newly accepted connection
    pub fn register(&self, peer_addr: SocketAddr) -> Arc<ConnectionHandle> {
        let id = ConnectionId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let handle = Arc::new(ConnectionHandle::new(id, peer_addr));
        self.connections.insert(id, Arc::clone(&handle));
        handle
    }

    /// Get a connection by ID
    pub fn get(&self, id: ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.connections.get(&id).map(|r| Arc::clone(&r))
    }

    /// Remove a connection, marking it closed
    pub fn remove(&self, id: ConnectionId) -> Option<Arc<ConnectionHandle>> {
        let (_, handle) = self.connections.remove(&id)?;
        handle.set_status(ConnectionStatus::Closed);
        Some(handle)
    }

    /// List all connections
    pub fn list(&self) -> Vec<Arc<ConnectionHandle>> {
        self.connections.iter().map(|r| Arc::clone(&r)).collect()
    }

    /// Number of active connections
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Force-close every connection and clear the table
    ///
    /// Used on server shutdown; each connection's read loop observes its
    /// token and runs the normal close path.
    pub fn close_all(&self) {
        for entry in self.connections.iter() {
            entry.cancel.cancel();
            entry.set_status(ConnectionStatus::Closed);
        }
        self.connections.clear();
    }
}

impl Default for ConnectionTable {
    fn default() -> Self {
        Self::new()
    }
}
