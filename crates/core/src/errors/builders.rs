//! Builder methods for creating errors with context

use super::types::Error;
use std::path::PathBuf;
use std::time::Duration;

impl Error {
    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Create a file system error with context
    #[must_use]
    pub fn file_system(
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Error::FileSystem {
            path: path.into(),
            operation: operation.into(),
            source,
        }
    }

    /// Create a process error without an OS cause
    #[must_use]
    pub fn process(pid: u32, message: impl Into<String>) -> Self {
        Error::Process {
            pid,
            message: message.into(),
            source: None,
        }
    }

    /// Create a process error caused by an OS call
    #[must_use]
    pub fn process_with_source(
        pid: u32,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Error::Process {
            pid,
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a timeout error
    #[must_use]
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Error::Timeout {
            operation: operation.into(),
            duration,
        }
    }
}
