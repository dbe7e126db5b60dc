//! Protocol Module
//!
//! Wire protocols spoken with Postfix.
//!
//! ## socketmap_table(5)
//!
//! Request and reply are netstrings:
//! ```text
//! request:  <len>:<map-name> <key>,
//! reply:    <len>:OK <value>,     |   <len>:NOTFOUND ,
//! ```
//!
//! ## tcp_table(5)
//!
//! Request and reply are text lines:
//! ```text
//! request:  get <key>\n           |   put <key> <value>\n  (ignored)
//! reply:    200 <value>\n         |   500 <text>\n
//! ```

mod codec;
mod reassembler;
mod reply;
mod request;

pub use codec::{
    decode_line, decode_netstring, encode_line, encode_netstring, Decoded, MAX_LENGTH_DIGITS,
};
pub use reassembler::{Extract, Framing, Reassembler};
pub use reply::Reply;
pub use request::Request;

use crate::config::Protocol;

impl Protocol {
    /// Framing used by this protocol's requests and replies
    pub fn framing(self) -> Framing {
        match self {
            Protocol::Socketmap => Framing::Netstring,
            Protocol::Tcp => Framing::Line,
        }
    }
}
