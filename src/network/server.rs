//! Lookup Server
//!
//! Accepts connections and hands each one to its own thread.

use std::fs;
use std::io::{self, ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::os::unix::fs::FileTypeExt;
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::connection::Connection;
use super::shutdown::Shutdown;
use crate::config::{Config, Endpoint};
use crate::dispatcher::Dispatcher;
use crate::error::{MapError, Result};
use crate::table::Lookup;

/// How often the idle accept loop checks for shutdown
pub const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Bound listening socket
enum Listener {
    Tcp(TcpListener),
    Unix(UnixListener),
}

/// Accepted client stream
enum Stream {
    Tcp(TcpStream),
    Unix(UnixStream),
}

impl Stream {
    /// Switch back to blocking mode and apply timeouts (0 = none)
    fn configure(&self, read_ms: u64, write_ms: u64) -> io::Result<()> {
        let read = (read_ms > 0).then(|| Duration::from_millis(read_ms));
        let write = (write_ms > 0).then(|| Duration::from_millis(write_ms));

        match self {
            Stream::Tcp(s) => {
                s.set_nonblocking(false)?;
                // Disable Nagle's algorithm: replies are small and latency bound
                s.set_nodelay(true)?;
                s.set_read_timeout(read)?;
                s.set_write_timeout(write)
            }
            Stream::Unix(s) => {
                s.set_nonblocking(false)?;
                s.set_read_timeout(read)?;
                s.set_write_timeout(write)
            }
        }
    }
}

impl Read for Stream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Stream::Tcp(s) => s.read(buf),
            Stream::Unix(s) => s.read(buf),
        }
    }
}

impl Write for Stream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Stream::Tcp(s) => s.write(buf),
            Stream::Unix(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Stream::Tcp(s) => s.flush(),
            Stream::Unix(s) => s.flush(),
        }
    }
}

/// Decrements the active connection count when the connection ends
struct ActiveGuard(Arc<AtomicUsize>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Lookup server for one endpoint and one protocol
pub struct Server {
    config: Config,
    listener: Listener,
    dispatcher: Dispatcher,
    shutdown: Arc<Shutdown>,
    active: Arc<AtomicUsize>,
    next_id: u64,
}

impl Server {
    /// Bind the configured endpoint
    ///
    /// Bind failures are fatal; nothing is retried.
    pub fn bind(config: Config, table: Arc<dyn Lookup>) -> Result<Self> {
        config.validate()?;
        let shutdown = Arc::new(Shutdown::new());

        let listener = match &config.endpoint {
            Endpoint::Tcp(addr) => Listener::Tcp(TcpListener::bind(addr.as_str()).map_err(
                |source| MapError::Bind {
                    endpoint: config.endpoint.to_string(),
                    source,
                },
            )?),
            Endpoint::Unix(path) => {
                let listener = bind_unix(path).map_err(|source| MapError::Bind {
                    endpoint: config.endpoint.to_string(),
                    source,
                })?;
                shutdown.register_socket(path);
                Listener::Unix(listener)
            }
        };

        // Non-blocking so the loop can observe shutdown while idle
        match &listener {
            Listener::Tcp(l) => l.set_nonblocking(true)?,
            Listener::Unix(l) => l.set_nonblocking(true)?,
        }

        tracing::info!("Listening on {} ({})", config.endpoint, config.protocol);

        let dispatcher = Dispatcher::new(table).with_verbose(config.verbose);

        Ok(Self {
            config,
            listener,
            dispatcher,
            shutdown,
            active: Arc::new(AtomicUsize::new(0)),
            next_id: 0,
        })
    }

    /// Actual TCP address (useful when binding port 0)
    pub fn local_addr(&self) -> Option<SocketAddr> {
        match &self.listener {
            Listener::Tcp(l) => l.local_addr().ok(),
            Listener::Unix(_) => None,
        }
    }

    /// Handle used to stop the server from another thread
    pub fn shutdown_handle(&self) -> Arc<Shutdown> {
        Arc::clone(&self.shutdown)
    }

    /// Shared count of connections currently being served
    pub fn active_connections(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.active)
    }

    /// Start the server (blocking until shutdown is requested)
    ///
    /// On return the listening socket is closed and the socket file removed.
    /// Connections already accepted keep running on their own threads.
    pub fn run(mut self) -> Result<()> {
        while !self.shutdown.is_requested() {
            let accepted = match &self.listener {
                Listener::Tcp(l) => l
                    .accept()
                    .map(|(s, addr)| (Stream::Tcp(s), addr.to_string())),
                Listener::Unix(l) => l
                    .accept()
                    .map(|(s, _)| (Stream::Unix(s), format!("unix#{}", self.next_id))),
            };

            match accepted {
                Ok((stream, peer)) => self.spawn_connection(stream, peer),
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    tracing::warn!("Could not accept client connection: {}", e);
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
            }
        }

        tracing::info!("Shutting down {}", self.config.endpoint);
        drop(self.listener);
        self.shutdown.release();

        Ok(())
    }

    fn spawn_connection(&mut self, stream: Stream, peer: String) {
        let id = self.next_id;
        self.next_id += 1;

        let guard = ActiveGuard(Arc::clone(&self.active));
        if self.active.fetch_add(1, Ordering::SeqCst) >= self.config.max_connections {
            tracing::warn!(
                "Refusing {}: {} connections already active",
                peer,
                self.config.max_connections
            );
            return;
        }

        if let Err(e) = stream.configure(self.config.read_timeout_ms, self.config.write_timeout_ms)
        {
            tracing::warn!("Cannot configure connection from {}: {}", peer, e);
            return;
        }

        let mut conn = Connection::new(
            stream,
            self.config.protocol,
            self.dispatcher.clone(),
            self.config.read_chunk_size,
            self.config.max_frame_len,
            peer,
        );

        let spawned = thread::Builder::new()
            .name(format!("pfmap-conn-{}", id))
            .spawn(move || {
                let _guard = guard;
                if let Err(e) = conn.handle() {
                    tracing::debug!("Connection {} closed: {}", conn.peer_addr(), e);
                }
            });

        if let Err(e) = spawned {
            tracing::warn!("Cannot spawn connection thread: {}", e);
        }
    }
}

/// Bind a Unix socket, replacing a stale socket file left by a dead server
fn bind_unix(path: &Path) -> io::Result<UnixListener> {
    if let Ok(meta) = fs::symlink_metadata(path) {
        if meta.file_type().is_socket() {
            match UnixStream::connect(path) {
                Ok(_) => {
                    return Err(io::Error::new(
                        ErrorKind::AddrInUse,
                        "another server is listening on this socket",
                    ))
                }
                Err(e) if e.kind() == ErrorKind::ConnectionRefused => {
                    tracing::info!("Removing stale socket {}", path.display());
                    fs::remove_file(path)?;
                }
                Err(_) => {}
            }
        }
    }

    UnixListener::bind(path)
}
