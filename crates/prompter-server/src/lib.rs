//! prompter-server: WebSocket relay daemon for the prompter display
//!
//! The relay accepts unauthenticated WebSocket connections, treats every
//! inbound text frame as one complete message, and keeps exactly the most
//! recent message as observable state. Local consumers (display, speech, a
//! test harness) subscribe to that state and receive the current value
//! immediately plus every subsequent update, with last-write-wins
//! coalescing for slow consumers.

pub mod broadcast;
pub mod connection;
pub mod relay;
pub mod server;
pub mod state;

pub use broadcast::{Broadcaster, Subscription};
pub use relay::MessageRelay;
pub use state::RelayState;
