//! Error handling for the process demonstrations
//!
//! Uses `thiserror` for library errors with detailed error types
//! that callers can match on to decide whether a failure is fatal
//! for the whole demonstration or only for one sub-operation.

use nix::unistd::Pid;
use std::io;
use thiserror::Error;

/// Custom error type for process operations
#[derive(Error, Debug)]
pub enum ProcessError {
    /// IO operation failed
    #[error("IO operation failed: {0}")]
    Io(#[from] io::Error),

    /// Process creation failed (usually resource exhaustion)
    #[error("Fork failed: {0}")]
    Fork(#[source] nix::Error),

    /// Image replacement failed; only ever observed inside the child
    #[error("Failed to execute {command}: {source}")]
    Exec {
        command: String,
        #[source]
        source: nix::Error,
    },

    /// Waiting for a child failed
    #[error("Wait failed: {0}")]
    Wait(#[source] nix::Error),

    /// Adjusting the scheduling priority failed
    #[error("Failed to apply nice offset {offset}: {source}")]
    Priority {
        offset: i32,
        #[source]
        source: nix::Error,
    },

    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No entry for the process in the proc filesystem
    #[error("Process {pid} not found")]
    ProcessNotFound { pid: Pid },

    /// The process exists but has no resolvable executable (kernel threads)
    #[error("Executable path of process {pid} unreadable: {source}")]
    ExecutableUnreadable {
        pid: Pid,
        #[source]
        source: io::Error,
    },

    /// Permission denied
    #[error("Permission denied: {context}")]
    PermissionDenied { context: String },

    /// Signal handling error
    #[error("Signal handling error: {0}")]
    SignalError(String),
}

impl ProcessError {
    /// Classify an IO failure that happened while reading `what` for `pid`.
    pub fn from_io(err: io::Error, pid: Pid, what: &str) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::ProcessNotFound { pid },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                context: format!("{} of process {}", what, pid),
            },
            _ => Self::Io(err),
        }
    }

    /// True when the failure means the process does not exist (anymore).
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ProcessNotFound { .. })
    }
}

/// Result type alias for process operations
pub type ProcessResult<T> = Result<T, ProcessError>;
