//! prompter-core: Core abstractions and configuration for the prompter relay
//!
//! This crate provides shared types, the error taxonomy, configuration
//! structures, and the connection-handler trait used by the relay server
//! and its hosts.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use error::RelayError;
pub use types::{ConnectionId, ConnectionStatus, ServerState};
