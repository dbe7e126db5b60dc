//! Dispatcher Module
//!
//! Routes requests to the lookup table and maps results to replies.
//!
//! ## Responsibilities
//! - Exactly one lookup call per `get`, no retry or caching
//! - `put` is acknowledged by silence
//! - Protocol-level problems become client errors
//!
//! Runs on the calling connection's thread; the table is shared read-only.

use std::sync::Arc;

use crate::error::ProtocolError;
use crate::protocol::{Reply, Request};
use crate::table::Lookup;

/// Maps requests to replies through a lookup table
#[derive(Clone)]
pub struct Dispatcher {
    /// Shared read-only table
    table: Arc<dyn Lookup>,

    /// Log every mapping at info instead of debug
    verbose: bool,
}

impl Dispatcher {
    /// Create a dispatcher over a table
    pub fn new(table: Arc<dyn Lookup>) -> Self {
        Self {
            table,
            verbose: false,
        }
    }

    /// Enable logging of every mapping at info level
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Execute a request
    ///
    /// Returns `None` when nothing must be written back (`put`).
    pub fn execute(&self, request: Request) -> Option<Reply> {
        match request {
            Request::Get { key, .. } => Some(self.dispatch(&key)),
            Request::Put { key, .. } => {
                tracing::debug!("Ignoring put for key '{}'", key);
                None
            }
            Request::Unknown { verb } => {
                Some(Self::reject(&ProtocolError::UnknownCommand { verb }))
            }
        }
    }

    /// Look up a single key
    pub fn dispatch(&self, key: &str) -> Reply {
        let reply = match self.table.lookup(key) {
            Some(value) => Reply::Found(value),
            None => Reply::NotFound,
        };

        if self.verbose {
            tracing::info!("map {} to {:?}", key, reply);
        } else {
            tracing::debug!("map {} to {:?}", key, reply);
        }

        reply
    }

    /// Build the reply for a request that could not be served
    pub fn reject(error: &ProtocolError) -> Reply {
        tracing::debug!("Rejecting request: {}", error);
        Reply::ClientError(error.to_string())
    }
}
