//! Table and Dispatcher Tests
//!
//! These tests verify:
//! - The checksum table's mapping
//! - File table parsing and lookups
//! - Dispatcher mapping of lookups to replies

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pfmap::protocol::{Reply, Request};
use pfmap::table::{ChecksumTable, FileTable};
use pfmap::{Dispatcher, Lookup, MapError};
use tempfile::NamedTempFile;

// =============================================================================
// Helper Functions
// =============================================================================

/// Table that counts its lookups
struct CountingTable {
    calls: AtomicUsize,
}

impl Lookup for CountingTable {
    fn lookup(&self, key: &str) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match key {
            "missing" => None,
            "empty" => Some(String::new()),
            _ => Some(format!("value-of-{}", key)),
        }
    }
}

fn counting_dispatcher() -> (Arc<CountingTable>, Dispatcher) {
    let table = Arc::new(CountingTable {
        calls: AtomicUsize::new(0),
    });
    let dispatcher = Dispatcher::new(table.clone());
    (table, dispatcher)
}

// =============================================================================
// Checksum Table Tests
// =============================================================================

#[test]
fn test_checksum_table_values() {
    let table = ChecksumTable::new();

    assert_eq!(table.lookup("foo"), Some("out05".to_string()));
    assert_eq!(table.lookup("somekey"), Some("out14".to_string()));
    assert_eq!(table.lookup("user@example.com"), Some("out09".to_string()));
}

#[test]
fn test_checksum_table_is_total() {
    let table = ChecksumTable::new();

    assert_eq!(table.lookup(""), Some("out01".to_string()));
    for key in ["a", "b", "long key with spaces", "ünïcödé"] {
        let value = table.lookup(key).unwrap();
        let n: u32 = value.trim_start_matches("out").parse().unwrap();
        assert!((1..=16).contains(&n));
    }
}

// =============================================================================
// File Table Tests
// =============================================================================

#[test]
fn test_file_table_parse() {
    let table = FileTable::parse(
        "# transport map\n\
         example.com    smtp:[mx.example.com]\n\
         \n\
         other.org\tlmtp:unix:private/dovecot\n",
    )
    .unwrap();

    assert_eq!(table.len(), 2);
    assert_eq!(
        table.lookup("example.com"),
        Some("smtp:[mx.example.com]".to_string())
    );
    assert_eq!(
        table.lookup("other.org"),
        Some("lmtp:unix:private/dovecot".to_string())
    );
    assert_eq!(table.lookup("nowhere.net"), None);
}

#[test]
fn test_file_table_continuation_lines() {
    let table = FileTable::parse("alias  first,\n   second,\n\tthird\n").unwrap();

    assert_eq!(
        table.lookup("alias"),
        Some("first, second, third".to_string())
    );
}

#[test]
fn test_file_table_duplicate_overrides() {
    let table = FileTable::parse("key one\nkey two\n").unwrap();

    assert_eq!(table.len(), 1);
    assert_eq!(table.lookup("key"), Some("two".to_string()));
}

#[test]
fn test_file_table_missing_value() {
    let result = FileTable::parse("lonely\n");
    assert!(matches!(result, Err(MapError::Table(_))));
}

#[test]
fn test_file_table_leading_continuation() {
    let result = FileTable::parse("   orphan value\n");
    assert!(matches!(result, Err(MapError::Table(_))));
}

#[test]
fn test_file_table_open() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "foo bar").unwrap();
    writeln!(file, "# comment").unwrap();
    writeln!(file, "baz qux quux").unwrap();

    let table = FileTable::open(file.path()).unwrap();

    assert_eq!(table.lookup("foo"), Some("bar".to_string()));
    assert_eq!(table.lookup("baz"), Some("qux quux".to_string()));
}

#[test]
fn test_file_table_open_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = FileTable::open(&dir.path().join("absent.map"));

    assert!(matches!(result, Err(MapError::Table(_))));
}

#[test]
fn test_closure_table() {
    let table = |key: &str| (key == "yes").then(|| "ok".to_string());

    assert_eq!(table.lookup("yes"), Some("ok".to_string()));
    assert_eq!(table.lookup("no"), None);
}

// =============================================================================
// Dispatcher Tests
// =============================================================================

#[test]
fn test_dispatch_calls_lookup_once() {
    let (table, dispatcher) = counting_dispatcher();

    for (i, key) in ["a", "b", "", "with space"].iter().enumerate() {
        let reply = dispatcher.dispatch(key);
        assert_eq!(reply, Reply::Found(format!("value-of-{}", key)));
        assert_eq!(table.calls.load(Ordering::SeqCst), i + 1);
    }
}

#[test]
fn test_dispatch_not_found_and_empty_value() {
    let (_table, dispatcher) = counting_dispatcher();

    assert_eq!(dispatcher.dispatch("missing"), Reply::NotFound);
    assert_eq!(dispatcher.dispatch("empty"), Reply::Found(String::new()));
}

#[test]
fn test_execute_put_is_silent() {
    let (table, dispatcher) = counting_dispatcher();

    let reply = dispatcher.execute(Request::Put {
        key: "foo".to_string(),
        value: "bar".to_string(),
    });

    assert_eq!(reply, None);
    assert_eq!(table.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_execute_unknown_is_client_error() {
    let (table, dispatcher) = counting_dispatcher();

    let reply = dispatcher.execute(Request::Unknown {
        verb: "del".to_string(),
    });

    assert!(matches!(reply, Some(Reply::ClientError(_))));
    assert_eq!(table.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_execute_get_ignores_map_name() {
    let (_table, dispatcher) = counting_dispatcher();

    let reply = dispatcher.execute(Request::Get {
        map: Some("somemap".to_string()),
        key: "somekey".to_string(),
    });

    assert_eq!(reply, Some(Reply::Found("value-of-somekey".to_string())));
}
