//! Core error type definitions

use std::path::PathBuf;

/// Result type alias for rollbackctx operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the configuration layer and the stock undo actions.
///
/// The rollback manager never wraps the caller's own errors in this type;
/// it only shows up where rollbackctx itself does I/O or parses settings.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration errors
    Configuration { message: String },

    /// File system operations
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// Child process signalling and reaping
    Process {
        pid: u32,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Operation timeout errors
    Timeout {
        operation: String,
        duration: std::time::Duration,
    },
}
