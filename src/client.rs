//! Query clients
//!
//! Minimal clients for both protocols, the `postmap -q` side of the wire.
//! Used by the CLI and by integration tests.

use std::io::{ErrorKind, Read, Write};
use std::net::TcpStream;
use std::os::unix::net::UnixStream;
use std::path::Path;

use bytes::Bytes;

use crate::config::{Protocol, DEFAULT_MAX_FRAME_LEN};
use crate::error::{MapError, Result};
use crate::protocol::{encode_line, encode_netstring, Extract, Reassembler, Reply};

/// Bytes requested per read while waiting for a reply
const READ_CHUNK: usize = 512;

/// Reads one reply frame, keeping any surplus for the next call
fn read_frame<S: Read>(stream: &mut S, reassembler: &mut Reassembler) -> Result<Bytes> {
    let mut chunk = [0u8; READ_CHUNK];

    loop {
        match reassembler.try_extract_frame() {
            Extract::Ready(frame) => return Ok(frame),
            Extract::Invalid(e) => return Err(e.into()),
            Extract::Incomplete => {}
        }

        let n = stream.read(&mut chunk)?;
        if n == 0 {
            return Err(std::io::Error::new(
                ErrorKind::UnexpectedEof,
                "server closed the connection before replying",
            )
            .into());
        }
        reassembler.feed(&chunk[..n]);
    }
}

// =============================================================================
// socketmap
// =============================================================================

/// socketmap client: sends `<map> <key>` netstrings
pub struct SocketmapClient<S> {
    stream: S,
    map: String,
    reassembler: Reassembler,
}

impl SocketmapClient<UnixStream> {
    /// Connect to a socketmap server on a Unix socket
    pub fn connect_unix(path: &Path, map: impl Into<String>) -> Result<Self> {
        Ok(Self::new(UnixStream::connect(path)?, map))
    }
}

impl SocketmapClient<TcpStream> {
    /// Connect to a socketmap server over TCP
    pub fn connect_tcp(addr: &str, map: impl Into<String>) -> Result<Self> {
        Ok(Self::new(TcpStream::connect(addr)?, map))
    }
}

impl<S: Read + Write> SocketmapClient<S> {
    /// Wrap an established stream
    pub fn new(stream: S, map: impl Into<String>) -> Self {
        Self {
            stream,
            map: map.into(),
            reassembler: Reassembler::new(Protocol::Socketmap.framing(), DEFAULT_MAX_FRAME_LEN),
        }
    }

    /// Look up one key
    pub fn query(&mut self, key: &str) -> Result<Reply> {
        let request = format!("{} {}", self.map, key);
        self.stream.write_all(&encode_netstring(request.as_bytes()))?;
        self.stream.flush()?;

        let frame = read_frame(&mut self.stream, &mut self.reassembler)?;
        Reply::from_socketmap(&frame).ok_or_else(|| {
            MapError::Client(String::from_utf8_lossy(&frame).into_owned())
        })
    }
}

// =============================================================================
// tcp_table
// =============================================================================

/// tcp_table client: sends `get <key>` lines
pub struct TcpMapClient<S> {
    stream: S,
    reassembler: Reassembler,
}

impl TcpMapClient<TcpStream> {
    /// Connect to a tcp_table server
    pub fn connect(addr: &str) -> Result<Self> {
        Ok(Self::new(TcpStream::connect(addr)?))
    }
}

impl<S: Read + Write> TcpMapClient<S> {
    /// Wrap an established stream
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            reassembler: Reassembler::new(Protocol::Tcp.framing(), DEFAULT_MAX_FRAME_LEN),
        }
    }

    /// Look up one key
    pub fn query(&mut self, key: &str) -> Result<Reply> {
        let request = format!("get {}", key);
        self.stream.write_all(&encode_line(request.as_bytes()))?;
        self.stream.flush()?;

        let frame = read_frame(&mut self.stream, &mut self.reassembler)?;
        Reply::from_line(&frame).ok_or_else(|| {
            MapError::Client(String::from_utf8_lossy(&frame).into_owned())
        })
    }

    /// Send an update; the server never answers these
    pub fn put(&mut self, key: &str, value: &str) -> Result<()> {
        let request = format!("put {} {}", key, value);
        self.stream.write_all(&encode_line(request.as_bytes()))?;
        self.stream.flush()?;
        Ok(())
    }
}
