//! Configuration for pfmap
//!
//! Centralized configuration with sensible defaults.

use std::fmt;
use std::path::PathBuf;

use crate::error::{MapError, Result};

/// Default socketmap socket path (matches the usual Postfix `main.cf` entry)
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/postfix_socketmap";

/// Default tcp_table listen address
pub const DEFAULT_TCP_ADDR: &str = "localhost:10044";

/// Postfix refuses socketmap replies larger than this, so requests are held
/// to the same limit.
pub const DEFAULT_MAX_FRAME_LEN: usize = 100_000;

/// Main configuration for a pfmap instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Listener Configuration
    // -------------------------------------------------------------------------
    /// Where to listen: a Unix socket path or a TCP `host:port`
    pub endpoint: Endpoint,

    /// Wire protocol spoken on every accepted connection
    pub protocol: Protocol,

    /// Max concurrent client connections
    pub max_connections: usize,

    // -------------------------------------------------------------------------
    // Connection Configuration
    // -------------------------------------------------------------------------
    /// Connection read timeout (milliseconds, 0 = wait forever)
    ///
    /// Postfix keeps idle map connections open, so the default is no timeout.
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = wait forever)
    pub write_timeout_ms: u64,

    /// Bytes requested from the socket per read call
    pub read_chunk_size: usize,

    /// Largest accepted request frame (netstring payload or text line)
    pub max_frame_len: usize,

    // -------------------------------------------------------------------------
    // Diagnostics
    // -------------------------------------------------------------------------
    /// Log every mapping
    pub verbose: bool,
}

/// Listening endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Unix domain socket at the given path
    Unix(PathBuf),

    /// TCP `host:port`
    Tcp(String),
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Unix(path) => write!(f, "unix:{}", path.display()),
            Endpoint::Tcp(addr) => write!(f, "inet:{}", addr),
        }
    }
}

/// Postfix lookup protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// socketmap_table(5): netstring requests and replies
    Socketmap,

    /// tcp_table(5): newline-terminated text requests and replies
    Tcp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Socketmap => f.write_str("socketmap"),
            Protocol::Tcp => f.write_str("tcp"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::Unix(PathBuf::from(DEFAULT_SOCKET_PATH)),
            protocol: Protocol::Socketmap,
            max_connections: 1024,
            read_timeout_ms: 0,
            write_timeout_ms: 5000,
            read_chunk_size: 1024,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
            verbose: false,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Socketmap server on a Unix socket
    pub fn socketmap(path: impl Into<PathBuf>) -> Self {
        Self::builder()
            .endpoint(Endpoint::Unix(path.into()))
            .protocol(Protocol::Socketmap)
            .build()
    }

    /// tcp_table server on a TCP address
    pub fn tcp(addr: impl Into<String>) -> Self {
        Self::builder()
            .endpoint(Endpoint::Tcp(addr.into()))
            .protocol(Protocol::Tcp)
            .build()
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.max_connections == 0 {
            return Err(MapError::Config("max_connections must be at least 1".to_string()));
        }
        if self.max_frame_len == 0 {
            return Err(MapError::Config("max_frame_len must be at least 1".to_string()));
        }
        if let Endpoint::Unix(path) = &self.endpoint {
            if path.as_os_str().is_empty() {
                return Err(MapError::Config("socket path is empty".to_string()));
            }
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the listening endpoint
    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.config.endpoint = endpoint;
        self
    }

    /// Set the wire protocol
    pub fn protocol(mut self, protocol: Protocol) -> Self {
        self.config.protocol = protocol;
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the per-read chunk size (clamped to at least one byte)
    pub fn read_chunk_size(mut self, size: usize) -> Self {
        self.config.read_chunk_size = size.max(1);
        self
    }

    /// Set the largest accepted request frame
    pub fn max_frame_len(mut self, len: usize) -> Self {
        self.config.max_frame_len = len;
        self
    }

    /// Enable logging of every mapping
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
