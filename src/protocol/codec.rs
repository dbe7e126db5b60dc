//! Frame codec
//!
//! Pure encode/decode functions for the two wire framings.
//!
//! ## Netstring (socketmap)
//! ```text
//! ┌──────────────┬───┬─────────────────────┬───┐
//! │ Len (ASCII)  │ : │  Payload (Len bytes) │ , │
//! └──────────────┴───┴─────────────────────┴───┘
//! ```
//!
//! ## Text line (tcp_table)
//! ```text
//! ┌─────────────────────────────┬────┐
//! │          Line               │ \n │
//! └─────────────────────────────┴────┘
//! ```

use crate::error::FrameError;

/// Longest accepted decimal length prefix
pub const MAX_LENGTH_DIGITS: usize = 9;

/// Outcome of a decode attempt that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded<'a> {
    /// A full frame: the usable payload and the bytes it took on the wire
    Ready { payload: &'a [u8], consumed: usize },

    /// More bytes are needed before a frame can be produced
    Incomplete,
}

// =============================================================================
// Netstring
// =============================================================================

/// Encode a payload as a netstring
///
/// Format: `<len>:<payload>,`
pub fn encode_netstring(payload: &[u8]) -> Vec<u8> {
    let len = payload.len().to_string();

    let mut message = Vec::with_capacity(len.len() + payload.len() + 2);
    message.extend_from_slice(len.as_bytes());
    message.push(b':');
    message.extend_from_slice(payload);
    message.push(b',');

    message
}

/// Decode one netstring from the front of `buf`
///
/// A buffer that is merely short is `Incomplete`, never an error.
pub fn decode_netstring(buf: &[u8], max_len: usize) -> Result<Decoded<'_>, FrameError> {
    // Step 1: Scan the length prefix
    let colon = match buf.iter().position(|&b| !b.is_ascii_digit()) {
        Some(idx) if buf[idx] == b':' => idx,
        Some(_) => return Err(FrameError::InvalidLength),
        None if buf.len() > MAX_LENGTH_DIGITS => {
            return Err(FrameError::LengthTooLong {
                max_digits: MAX_LENGTH_DIGITS,
            })
        }
        None => return Ok(Decoded::Incomplete),
    };

    if colon == 0 {
        return Err(FrameError::InvalidLength);
    }
    if colon > MAX_LENGTH_DIGITS {
        return Err(FrameError::LengthTooLong {
            max_digits: MAX_LENGTH_DIGITS,
        });
    }

    // Step 2: Parse and validate the declared length
    let declared = parse_decimal(&buf[..colon]);
    if declared > max_len {
        return Err(FrameError::TooLarge {
            declared,
            limit: max_len,
        });
    }

    // Step 3: Wait for payload + trailing comma
    let start = colon + 1;
    let end = start + declared;
    if buf.len() <= end {
        return Ok(Decoded::Incomplete);
    }
    if buf[end] != b',' {
        return Err(FrameError::MissingComma);
    }

    Ok(Decoded::Ready {
        payload: &buf[start..end],
        consumed: end + 1,
    })
}

/// Parse an all-digit slice of at most MAX_LENGTH_DIGITS bytes
fn parse_decimal(digits: &[u8]) -> usize {
    digits
        .iter()
        .fold(0usize, |acc, &d| acc * 10 + usize::from(d - b'0'))
}

// =============================================================================
// Text Lines
// =============================================================================

/// Decode one newline-terminated line from the front of `buf`
///
/// The payload excludes the `\n`; `consumed` includes it.
pub fn decode_line(buf: &[u8]) -> Decoded<'_> {
    match buf.iter().position(|&b| b == b'\n') {
        Some(idx) => Decoded::Ready {
            payload: &buf[..idx],
            consumed: idx + 1,
        },
        None => Decoded::Incomplete,
    }
}

/// Encode a text line, appending the `\n` terminator
pub fn encode_line(line: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(line.len() + 1);
    message.extend_from_slice(line);
    message.push(b'\n');
    message
}
