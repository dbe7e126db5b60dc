//! Network Module
//!
//! Listener and per-connection handling.
//!
//! ## Architecture
//! - Single acceptor thread (non-blocking accept, polled)
//! - One thread per accepted connection, no shared mutable state
//! - Requests routed through the Dispatcher

mod connection;
mod server;
mod shutdown;

pub use connection::Connection;
pub use server::{Server, ACCEPT_POLL_INTERVAL};
pub use shutdown::Shutdown;
