//! WebSocket server implementation

mod handler;
mod listener;

pub use handler::RelayHandler;
pub use listener::WsListener;
