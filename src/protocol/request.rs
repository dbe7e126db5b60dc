//! Request definitions
//!
//! Turns a decoded frame into a request.

use crate::error::ProtocolError;

/// A parsed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Look up a key; socketmap requests also name the map
    Get { map: Option<String>, key: String },

    /// tcp_table update; recognized and never answered
    Put { key: String, value: String },

    /// Well-formed line with a verb we do not serve
    Unknown { verb: String },
}

impl Request {
    /// Parse a socketmap netstring payload: `<map-name> <key>`
    ///
    /// Without a space the whole payload is the key.
    pub fn from_socketmap(payload: &[u8]) -> Self {
        let text = String::from_utf8_lossy(payload);

        match text.split_once(' ') {
            Some((map, key)) => Request::Get {
                map: Some(map.to_string()),
                key: key.to_string(),
            },
            None => Request::Get {
                map: None,
                key: text.into_owned(),
            },
        }
    }

    /// Parse a tcp_table request line (newline already stripped)
    pub fn from_line(line: &[u8]) -> Result<Self, ProtocolError> {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.is_empty() {
            return Err(ProtocolError::EmptyRequest);
        }

        let text = String::from_utf8_lossy(line);
        let (verb, rest) = match text.split_once(' ') {
            Some(parts) => parts,
            None => {
                return Err(ProtocolError::MissingKey {
                    verb: text.into_owned(),
                })
            }
        };

        let request = match verb {
            "get" => Request::Get {
                map: None,
                key: rest.to_string(),
            },
            "put" => {
                let (key, value) = rest.split_once(' ').unwrap_or((rest, ""));
                Request::Put {
                    key: key.to_string(),
                    value: value.to_string(),
                }
            }
            _ => Request::Unknown {
                verb: verb.to_string(),
            },
        };

        Ok(request)
    }
}
