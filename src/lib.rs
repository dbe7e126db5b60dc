//! # pfmap
//!
//! Postfix external lookup-table server:
//! - socketmap_table(5): netstring protocol, usually on a Unix socket
//! - tcp_table(5): line protocol on a TCP socket
//! - Thread per connection, partial reads and pipelined queries tolerated
//! - Pluggable, read-only lookup tables
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Server                                │
//! │              (Unix socket or TCP listener)                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ one thread per connection
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                     Connection                               │
//! │         read ─► Reassembler ─► Request ─► write Reply        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!                       ▼
//!               ┌──────────────┐          ┌─────────────┐
//!               │  Dispatcher  │ ───────► │   Lookup    │
//!               │              │          │ (read-only) │
//!               └──────────────┘          └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;

pub mod client;
pub mod dispatcher;
pub mod network;
pub mod protocol;
pub mod table;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::{Config, Endpoint, Protocol};
pub use dispatcher::Dispatcher;
pub use error::{FrameError, MapError, ProtocolError, Result};
pub use network::Server;
pub use table::Lookup;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of pfmap
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
