//! Stream reassembler
//!
//! Per-connection buffer that accumulates partial reads until a complete
//! frame is available.
//!
//! ## Usage
//! ```text
//! read chunk ──► feed() ──► try_extract_frame() ─┬─ Ready(frame) ──► loop
//!                                                ├─ Incomplete   ──► read again
//!                                                └─ Invalid(err) ──► protocol policy
//! ```

use bytes::{Buf, Bytes, BytesMut};

use super::codec::{decode_line, decode_netstring, Decoded};
use crate::error::FrameError;

/// Framing used on a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// `<len>:<payload>,`
    Netstring,

    /// `<line>\n`
    Line,
}

/// Result of an extraction attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extract {
    /// A complete frame, already removed from the buffer
    Ready(Bytes),

    /// Read more bytes and feed again
    Incomplete,

    /// Malformed input; what happens next is up to the protocol
    Invalid(FrameError),
}

/// Accumulates bytes for exactly one connection
#[derive(Debug)]
pub struct Reassembler {
    framing: Framing,
    buffer: BytesMut,
    max_frame_len: usize,

    /// Dropping the tail of an over-long line until its `\n` shows up
    discarding: bool,
}

impl Reassembler {
    /// Create an empty reassembler
    pub fn new(framing: Framing, max_frame_len: usize) -> Self {
        Self {
            framing,
            buffer: BytesMut::with_capacity(1024),
            max_frame_len,
            discarding: false,
        }
    }

    /// Append freshly read bytes
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Try to pull one complete frame off the front of the buffer
    ///
    /// Call in a loop until it returns `Incomplete`; a single read may carry
    /// several frames.
    pub fn try_extract_frame(&mut self) -> Extract {
        match self.framing {
            Framing::Netstring => self.extract_netstring(),
            Framing::Line => self.extract_line(),
        }
    }

    /// Number of bytes waiting for the rest of their frame
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// The framing this reassembler applies
    pub fn framing(&self) -> Framing {
        self.framing
    }

    fn extract_netstring(&mut self) -> Extract {
        // An invalid netstring leaves the buffer as-is: the connection is
        // about to be closed anyway.
        let (payload_len, consumed) = match decode_netstring(&self.buffer, self.max_frame_len) {
            Ok(Decoded::Ready { payload, consumed }) => (payload.len(), consumed),
            Ok(Decoded::Incomplete) => return Extract::Incomplete,
            Err(e) => return Extract::Invalid(e),
        };

        let mut frame = self.buffer.split_to(consumed);
        let prefix_len = consumed - payload_len - 1;
        frame.advance(prefix_len);
        frame.truncate(payload_len);

        Extract::Ready(frame.freeze())
    }

    fn extract_line(&mut self) -> Extract {
        loop {
            match decode_line(&self.buffer) {
                Decoded::Ready { consumed, .. } if self.discarding => {
                    // Tail of an over-long line: drop it and resume framing
                    self.buffer.advance(consumed);
                    self.discarding = false;
                }
                Decoded::Ready { payload, consumed } => {
                    if payload.len() > self.max_frame_len {
                        self.buffer.advance(consumed);
                        return Extract::Invalid(FrameError::LineTooLong {
                            limit: self.max_frame_len,
                        });
                    }
                    let mut frame = self.buffer.split_to(consumed);
                    frame.truncate(consumed - 1);
                    return Extract::Ready(frame.freeze());
                }
                Decoded::Incomplete if self.discarding => {
                    self.buffer.clear();
                    return Extract::Incomplete;
                }
                Decoded::Incomplete if self.buffer.len() > self.max_frame_len => {
                    self.buffer.clear();
                    self.discarding = true;
                    return Extract::Invalid(FrameError::LineTooLong {
                        limit: self.max_frame_len,
                    });
                }
                Decoded::Incomplete => return Extract::Incomplete,
            }
        }
    }
}
