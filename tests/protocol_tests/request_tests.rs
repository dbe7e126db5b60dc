//! Request and Reply Tests
//!
//! Tests for request parsing and per-protocol reply rendering.

use pfmap::protocol::{Reply, Request};
use pfmap::{Protocol, ProtocolError};

// =============================================================================
// socketmap Request Tests
// =============================================================================

#[test]
fn test_socketmap_map_and_key() {
    assert_eq!(
        Request::from_socketmap(b"somemap somekey"),
        Request::Get {
            map: Some("somemap".to_string()),
            key: "somekey".to_string(),
        }
    );
}

#[test]
fn test_socketmap_key_keeps_later_spaces() {
    assert_eq!(
        Request::from_socketmap(b"virtual John Doe"),
        Request::Get {
            map: Some("virtual".to_string()),
            key: "John Doe".to_string(),
        }
    );
}

#[test]
fn test_socketmap_without_map_name() {
    assert_eq!(
        Request::from_socketmap(b"user@example.com"),
        Request::Get {
            map: None,
            key: "user@example.com".to_string(),
        }
    );
}

#[test]
fn test_socketmap_empty_key() {
    assert_eq!(
        Request::from_socketmap(b"map "),
        Request::Get {
            map: Some("map".to_string()),
            key: String::new(),
        }
    );
}

// =============================================================================
// tcp_table Request Tests
// =============================================================================

#[test]
fn test_line_get() {
    assert_eq!(
        Request::from_line(b"get foo"),
        Ok(Request::Get {
            map: None,
            key: "foo".to_string(),
        })
    );
}

#[test]
fn test_line_get_strips_carriage_return() {
    assert_eq!(
        Request::from_line(b"get foo\r"),
        Ok(Request::Get {
            map: None,
            key: "foo".to_string(),
        })
    );
}

#[test]
fn test_line_put() {
    assert_eq!(
        Request::from_line(b"put foo bar baz"),
        Ok(Request::Put {
            key: "foo".to_string(),
            value: "bar baz".to_string(),
        })
    );
}

#[test]
fn test_line_put_without_value() {
    assert_eq!(
        Request::from_line(b"put foo"),
        Ok(Request::Put {
            key: "foo".to_string(),
            value: String::new(),
        })
    );
}

#[test]
fn test_line_unknown_verb() {
    assert_eq!(
        Request::from_line(b"del foo"),
        Ok(Request::Unknown {
            verb: "del".to_string()
        })
    );
    // Verbs are case-sensitive
    assert_eq!(
        Request::from_line(b"GET foo"),
        Ok(Request::Unknown {
            verb: "GET".to_string()
        })
    );
}

#[test]
fn test_line_without_space() {
    assert_eq!(
        Request::from_line(b"frobnicate"),
        Err(ProtocolError::MissingKey {
            verb: "frobnicate".to_string()
        })
    );
    assert_eq!(
        Request::from_line(b"get"),
        Err(ProtocolError::MissingKey {
            verb: "get".to_string()
        })
    );
}

#[test]
fn test_line_empty() {
    assert_eq!(Request::from_line(b""), Err(ProtocolError::EmptyRequest));
    assert_eq!(Request::from_line(b"\r"), Err(ProtocolError::EmptyRequest));
}

// =============================================================================
// Reply Encoding Tests
// =============================================================================

#[test]
fn test_reply_socketmap_found() {
    assert_eq!(Reply::Found("42".to_string()).encode(Protocol::Socketmap), b"5:OK 42,");
}

#[test]
fn test_reply_socketmap_not_found() {
    assert_eq!(Reply::NotFound.encode(Protocol::Socketmap), b"9:NOTFOUND ,");
}

#[test]
fn test_reply_socketmap_found_empty_value() {
    assert_eq!(Reply::Found(String::new()).encode(Protocol::Socketmap), b"3:OK ,");
}

#[test]
fn test_reply_socketmap_client_error() {
    assert_eq!(
        Reply::ClientError("bad".to_string()).encode(Protocol::Socketmap),
        b"8:PERM bad,"
    );
}

#[test]
fn test_reply_tcp() {
    assert_eq!(Reply::Found("bar".to_string()).encode(Protocol::Tcp), b"200 bar\n");
    assert_eq!(Reply::NotFound.encode(Protocol::Tcp), b"500 not found\n");
    assert_eq!(
        Reply::ClientError("unsupported command 'del'".to_string()).encode(Protocol::Tcp),
        b"500 unsupported command 'del'\n"
    );
}

// =============================================================================
// Reply Parsing Tests (client side)
// =============================================================================

#[test]
fn test_parse_socketmap_replies() {
    assert_eq!(
        Reply::from_socketmap(b"OK out05"),
        Some(Reply::Found("out05".to_string()))
    );
    assert_eq!(Reply::from_socketmap(b"NOTFOUND "), Some(Reply::NotFound));
    assert_eq!(
        Reply::from_socketmap(b"TEMP try later"),
        Some(Reply::ClientError("TEMP try later".to_string()))
    );
    assert_eq!(Reply::from_socketmap(b"garbage"), None);
}

#[test]
fn test_parse_tcp_replies() {
    assert_eq!(
        Reply::from_line(b"200 bar"),
        Some(Reply::Found("bar".to_string()))
    );
    assert_eq!(
        Reply::from_line(b"500 not found"),
        Some(Reply::ClientError("not found".to_string()))
    );
    assert_eq!(Reply::from_line(b"OK bar"), None);
}
