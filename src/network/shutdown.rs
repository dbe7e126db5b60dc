//! Shutdown coordinator
//!
//! Process-wide shutdown state shared between the signal handler and the
//! accept loop.
//!
//! ## Sequence
//! 1. Signal handler calls `request()`
//! 2. Accept loop observes `is_requested()` and stops accepting
//! 3. Listener is dropped (socket closed)
//! 4. `release()` unlinks the Unix socket file, if any

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

/// Shared shutdown state
#[derive(Debug, Default)]
pub struct Shutdown {
    /// Set once; never cleared
    requested: AtomicBool,

    /// Socket file to unlink on release
    socket_path: Mutex<Option<PathBuf>>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the server to stop accepting connections
    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    /// Whether shutdown has been requested
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Remember a socket file that must be removed on release
    pub fn register_socket(&self, path: &Path) {
        *self.socket_path.lock() = Some(path.to_path_buf());
    }

    /// Remove the registered socket file
    ///
    /// Idempotent: the path is forgotten after the first call.
    pub fn release(&self) {
        let Some(path) = self.socket_path.lock().take() else {
            return;
        };

        match fs::remove_file(&path) {
            Ok(()) => tracing::info!("Removed socket {}", path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Failed to remove socket {}: {}", path.display(), e),
        }
    }
}
