//! Error taxonomy for the save engine
//!
//! Root-level failures (root missing, endpoint absent, backup root not
//! creatable) abort the current operation and surface as `SaveError`.
//! Per-entry and per-file problems never do: they are collected as
//! [`Diagnostic`](crate::catalog::Diagnostic)s or
//! [`ItemOutcome`](crate::backend::ItemOutcome)s instead.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::backend::BackendKind;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("{backend} backend unavailable: {reason}")]
    BackendUnavailable { backend: BackendKind, reason: String },

    #[error("could not resolve last-modified time of '{entry}': {reason}")]
    Metadata { entry: String, reason: String },

    #[error("could not delete '{entry}': {reason}")]
    DeletionFailed { entry: String, reason: String },

    #[error("backup root {} unavailable: {source}", path.display())]
    BackupRootUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("bridge command `{command}` failed ({status}): {stderr}")]
    Bridge {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("bridge command `{command}` timed out after {}s", after.as_secs())]
    TimedOut { command: String, after: Duration },

    #[error("operation cancelled")]
    Cancelled,

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported operation: {0}")]
    Unsupported(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl SaveError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SaveError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn unavailable(backend: BackendKind, reason: impl Into<String>) -> Self {
        SaveError::BackendUnavailable {
            backend,
            reason: reason.into(),
        }
    }

    /// True when the failure means the remote endpoint could not be reached
    pub fn is_remote_unavailable(&self) -> bool {
        matches!(
            self,
            SaveError::BackendUnavailable {
                backend: BackendKind::Remote,
                ..
            }
        )
    }
}

pub type SaveResult<T> = Result<T, SaveError>;
