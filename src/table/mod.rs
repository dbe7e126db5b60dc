//! Table Module
//!
//! Lookup tables the server answers from.
//!
//! ## Contract
//! - `lookup` is synchronous and never fails
//! - `None` means "no entry"; `Some("")` is a found, empty value
//! - Tables are read-only once built and shared across connection threads

mod checksum;
mod file;

pub use checksum::ChecksumTable;
pub use file::FileTable;

/// A key → value lookup table
pub trait Lookup: Send + Sync {
    /// Look up a key
    fn lookup(&self, key: &str) -> Option<String>;
}

impl<F> Lookup for F
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn lookup(&self, key: &str) -> Option<String> {
        self(key)
    }
}
