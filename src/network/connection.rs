//! Connection Handler
//!
//! Handles individual client connections.
//!
//! ## State Machine
//! ```text
//! Reading ──n>0──► Decoding ──Ready──► Dispatching ──► Writing ──┐
//!    ▲                │  ▲                                       │
//!    └───Incomplete───┘  └───────────────────────────────────────┘
//! Reading ──EOF / error──► Closed
//! Decoding ──Invalid──► Closed (socketmap) | 500 reply (tcp_table)
//! ```

use std::io::{ErrorKind, Read, Write};

use crate::config::Protocol;
use crate::dispatcher::Dispatcher;
use crate::error::{MapError, Result};
use crate::protocol::{Extract, Reassembler, Reply, Request};

/// Handles a single client connection
pub struct Connection<S> {
    /// The accepted stream, owned for the connection's lifetime
    stream: S,

    /// Protocol spoken on this connection
    protocol: Protocol,

    /// Per-connection frame buffer
    reassembler: Reassembler,

    /// Shared request router
    dispatcher: Dispatcher,

    /// Bytes requested per read
    read_chunk_size: usize,

    /// Peer address for logging
    peer_addr: String,
}

impl<S: Read + Write> Connection<S> {
    /// Create a new connection handler
    pub fn new(
        stream: S,
        protocol: Protocol,
        dispatcher: Dispatcher,
        read_chunk_size: usize,
        max_frame_len: usize,
        peer_addr: impl Into<String>,
    ) -> Self {
        Self {
            stream,
            protocol,
            reassembler: Reassembler::new(protocol.framing(), max_frame_len),
            dispatcher,
            read_chunk_size: read_chunk_size.max(1),
            peer_addr: peer_addr.into(),
        }
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Reads requests in a loop and sends replies.
    /// Returns when the client disconnects or an error occurs.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {} ({})", self.peer_addr, self.protocol);

        let mut chunk = vec![0u8; self.read_chunk_size];

        loop {
            // Reading
            let n = match self.stream.read(&mut chunk) {
                Ok(0) => {
                    if self.reassembler.buffered() > 0 {
                        tracing::debug!(
                            "Client {} closed with {} bytes of an incomplete request",
                            self.peer_addr,
                            self.reassembler.buffered()
                        );
                    } else {
                        tracing::debug!("Client {} disconnected", self.peer_addr);
                    }
                    return Ok(());
                }
                Ok(n) => n,
                Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(ref e) if e.kind() == ErrorKind::ConnectionReset => {
                    tracing::debug!("Connection reset by client {}", self.peer_addr);
                    return Ok(());
                }
                Err(ref e) if e.kind() == ErrorKind::ConnectionAborted => {
                    tracing::debug!("Connection aborted by client {}", self.peer_addr);
                    return Ok(());
                }
                Err(ref e)
                    if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut =>
                {
                    tracing::debug!("Read timeout for client {}", self.peer_addr);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Cannot read the request from {}: {}", self.peer_addr, e);
                    return Err(e.into());
                }
            };

            self.reassembler.feed(&chunk[..n]);

            // Decoding, until the buffer holds no complete frame
            loop {
                let reply = match self.reassembler.try_extract_frame() {
                    Extract::Incomplete => break,
                    Extract::Ready(frame) => self.process_frame(&frame),
                    Extract::Invalid(err) => match self.protocol {
                        Protocol::Socketmap => {
                            tracing::warn!("Malformed request from {}: {}", self.peer_addr, err);
                            return Err(MapError::Frame(err));
                        }
                        Protocol::Tcp => {
                            tracing::debug!("Malformed request from {}: {}", self.peer_addr, err);
                            Some(Reply::ClientError(err.to_string()))
                        }
                    },
                };

                // Writing
                if let Some(reply) = reply {
                    if let Err(e) = self.send_reply(&reply) {
                        return self.write_failed(e);
                    }
                }
            }
        }
    }

    /// Parse and dispatch one frame
    fn process_frame(&self, frame: &[u8]) -> Option<Reply> {
        let request = match self.protocol {
            Protocol::Socketmap => Request::from_socketmap(frame),
            Protocol::Tcp => match Request::from_line(frame) {
                Ok(request) => request,
                Err(e) => return Some(Dispatcher::reject(&e)),
            },
        };

        tracing::trace!("Received request from {}: {:?}", self.peer_addr, request);

        self.dispatcher.execute(request)
    }

    /// Send a reply to the client
    fn send_reply(&mut self, reply: &Reply) -> Result<()> {
        let bytes = reply.encode(self.protocol);
        self.stream.write_all(&bytes)?;
        self.stream.flush()?;
        Ok(())
    }

    /// A client that went away before its reply is not a server error
    fn write_failed(&self, e: MapError) -> Result<()> {
        if let MapError::Io(ref io_err) = e {
            match io_err.kind() {
                ErrorKind::ConnectionAborted
                | ErrorKind::ConnectionReset
                | ErrorKind::BrokenPipe => {
                    tracing::debug!(
                        "Client {} disconnected before reply could be sent: {}",
                        self.peer_addr,
                        e
                    );
                    return Ok(());
                }
                _ => {}
            }
        }
        tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
        Err(e)
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    /// Consume the handler and return the stream
    pub fn into_inner(self) -> S {
        self.stream
    }
}
