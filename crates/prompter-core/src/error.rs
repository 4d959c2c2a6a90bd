//! Error types for the prompter relay
//!
//! Only `BindError` is a caller-visible failure: binding the listening
//! socket is the one operation whose failure crosses the server boundary.
//! Per-connection failures are contained and logged; malformed frames are
//! not errors at all and never change state.

use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the prompter relay
#[derive(Error, Debug)]
pub enum RelayError {
    /// Failed to bind the listening socket
    #[error(transparent)]
    Bind(#[from] BindError),

    /// Per-connection failure
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The listening socket could not be bound
///
/// Recoverable by retrying or changing the configured port.
#[derive(Error, Debug)]
#[error("Failed to bind {addr}: {source}")]
pub struct BindError {
    /// Address the server attempted to bind
    pub addr: SocketAddr,
    /// Underlying I/O failure (typically `AddrInUse`)
    #[source]
    pub source: std::io::Error,
}

/// Per-connection failures
///
/// These close only the affected connection; they are never surfaced to
/// callers and never affect other connections or the latest message.
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// WebSocket handshake failed
    #[error("Handshake failed: {0}")]
    Handshake(String),

    /// The connection dropped mid-stream
    #[error("Connection lost: {0}")]
    ConnectionLost(String),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}
