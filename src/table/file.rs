//! File-backed table
//!
//! Loads a Postfix-style source file into memory once at startup.
//!
//! ## File Format
//! ```text
//! # comment
//! key1    value one
//! key2    a long value
//!         continued on an indented line
//! ```
//!
//! - The first run of whitespace separates key from value
//! - Blank lines and lines starting with `#` are ignored
//! - A line starting with whitespace continues the previous value
//! - A repeated key overrides the earlier entry (with a warning)

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::Lookup;
use crate::error::{MapError, Result};

/// Read-only in-memory table
#[derive(Debug, Clone, Default)]
pub struct FileTable {
    entries: HashMap<String, String>,
}

impl FileTable {
    /// Load a table from a source file
    pub fn open(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            MapError::Table(format!("cannot read {}: {}", path.display(), e))
        })?;

        let table = Self::parse(&contents)?;
        tracing::info!("Loaded {} entries from {}", table.len(), path.display());
        Ok(table)
    }

    /// Parse table source text
    pub fn parse(contents: &str) -> Result<Self> {
        let mut entries: HashMap<String, String> = HashMap::new();
        let mut last_key: Option<String> = None;

        for (idx, raw) in contents.lines().enumerate() {
            let line_no = idx + 1;
            let trimmed = raw.trim();

            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            // Continuation of the previous entry
            if raw.starts_with(char::is_whitespace) {
                let key = last_key.as_ref().ok_or_else(|| {
                    MapError::Table(format!("line {}: continuation without an entry", line_no))
                })?;
                if let Some(value) = entries.get_mut(key) {
                    if !value.is_empty() {
                        value.push(' ');
                    }
                    value.push_str(trimmed);
                }
                continue;
            }

            let (key, value) = match trimmed.split_once(char::is_whitespace) {
                Some((key, value)) => (key, value.trim_start()),
                None => {
                    return Err(MapError::Table(format!(
                        "line {}: missing value for key '{}'",
                        line_no, trimmed
                    )))
                }
            };

            if entries.insert(key.to_string(), value.to_string()).is_some() {
                tracing::warn!("line {}: duplicate entry '{}' overrides earlier value", line_no, key);
            }
            last_key = Some(key.to_string());
        }

        Ok(Self { entries })
    }

    /// Build a table from key/value pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Lookup for FileTable {
    fn lookup(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }
}
