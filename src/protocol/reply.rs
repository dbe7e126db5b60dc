//! Reply definitions
//!
//! Represents answers to Postfix and renders them per protocol.

use super::codec::{encode_line, encode_netstring};
use crate::config::Protocol;

/// A reply to send to the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The table has a value for the key
    Found(String),

    /// The table has no entry for the key
    NotFound,

    /// The request could not be served
    ClientError(String),
}

impl Reply {
    /// Render the reply as wire bytes
    ///
    /// | Reply          | socketmap (netstring) | tcp_table         |
    /// |----------------|-----------------------|-------------------|
    /// | Found(v)       | `OK v`                | `200 v\n`         |
    /// | NotFound       | `NOTFOUND `           | `500 not found\n` |
    /// | ClientError(m) | `PERM m`              | `500 m\n`         |
    pub fn encode(&self, protocol: Protocol) -> Vec<u8> {
        match protocol {
            Protocol::Socketmap => encode_netstring(self.socketmap_text().as_bytes()),
            Protocol::Tcp => encode_line(self.tcp_text().as_bytes()),
        }
    }

    fn socketmap_text(&self) -> String {
        match self {
            Reply::Found(value) => format!("OK {}", value),
            Reply::NotFound => "NOTFOUND ".to_string(),
            Reply::ClientError(message) => format!("PERM {}", message),
        }
    }

    fn tcp_text(&self) -> String {
        match self {
            Reply::Found(value) => format!("200 {}", value),
            Reply::NotFound => "500 not found".to_string(),
            Reply::ClientError(message) => format!("500 {}", message),
        }
    }

    /// Parse a socketmap reply payload (netstring framing already removed)
    ///
    /// `TEMP`, `TIMEOUT` and `PERM` all surface as `ClientError`.
    pub fn from_socketmap(payload: &[u8]) -> Option<Self> {
        let text = String::from_utf8_lossy(payload);
        let (status, rest) = text.split_once(' ').unwrap_or((&*text, ""));

        match status {
            "OK" => Some(Reply::Found(rest.to_string())),
            "NOTFOUND" => Some(Reply::NotFound),
            "TEMP" | "TIMEOUT" | "PERM" => Some(Reply::ClientError(text.to_string())),
            _ => None,
        }
    }

    /// Parse a tcp_table reply line (newline already stripped)
    ///
    /// tcp_table uses `500` for both misses and errors, so every `500` (and
    /// the temporary `400`) surfaces as `ClientError` with the server's text.
    pub fn from_line(line: &[u8]) -> Option<Self> {
        let text = String::from_utf8_lossy(line);
        let (code, rest) = text.split_once(' ').unwrap_or((&*text, ""));

        match code {
            "200" => Some(Reply::Found(rest.to_string())),
            "400" | "500" => Some(Reply::ClientError(rest.to_string())),
            _ => None,
        }
    }
}
