//! Error types for sotrace operations.
//!
//! Errors fall into two tiers:
//!
//! - **Per-node**: a `readelf` or `ldd` invocation failing for one library.
//!   These are logged and the node is treated as a leaf; the traversal
//!   continues with other branches. They never surface as [`Error`].
//! - **Fatal**: failures that abort the whole run — enumerating a process's
//!   memory maps (after the one privilege-escalated retry) and writing the
//!   output file.

use thiserror::Error;

/// Result type for sotrace operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for sotrace operations.
///
/// Only fatal conditions are represented here; per-library lookup failures
/// are handled inside the traversal.
#[derive(Debug, Error)]
pub enum Error {
    /// File system operation failed (output file, /proc reads)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Memory-map enumeration failed for a process, including the sudo retry
    #[error("failed to enumerate memory maps of pid {pid}: {message}")]
    ProcessMaps {
        /// The process whose maps could not be read
        pid: u32,
        /// What went wrong, from the underlying tool or syscall
        message: String,
    },

    /// The target argument could not be interpreted
    #[error("invalid target: {0}")]
    InvalidTarget(String),
}

impl Error {
    /// Create a fatal process-map enumeration error.
    #[must_use]
    pub fn process_maps(pid: u32, message: impl Into<String>) -> Self {
        Self::ProcessMaps {
            pid,
            message: message.into(),
        }
    }
}
