//! Backend trait abstraction - WHERE saves live
//!
//! Two backends share one capability set:
//! - Local: the PC's saves directory, plain filesystem calls
//! - Remote: the Android saves directory, reached only through the adb bridge
//!
//! `BackendKind` is closed on purpose. Adding a variant means adding a full
//! `Backend` implementation alongside it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cancel::CancelToken;
use crate::error::{SaveError, SaveResult};

mod device;
mod local;

pub use device::DeviceBridgeBackend;
pub use local::LocalFilesystemBackend;

/// Which storage location a save was found in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Local,
    Remote,
}

impl BackendKind {
    pub fn name(&self) -> &'static str {
        match self {
            BackendKind::Local => "local",
            BackendKind::Remote => "remote",
        }
    }

    /// The other backend of the pair
    pub fn opposite(&self) -> BackendKind {
        match self {
            BackendKind::Local => BackendKind::Remote,
            BackendKind::Remote => BackendKind::Local,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" | "pc" | "steam" => Ok(BackendKind::Local),
            "remote" | "device" | "android" => Ok(BackendKind::Remote),
            other => Err(format!("unknown backend '{}'", other)),
        }
    }
}

/// Lazy, finite, non-restartable sequence of entry names under a saves root
pub type EntryStream<'a> = Box<dyn Iterator<Item = String> + 'a>;

/// Result of one item (file, directory or whole entry) in a bulk operation
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Done,
    Failed(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ItemOutcome {
    pub item: PathBuf,
    pub outcome: Outcome,
}

impl ItemOutcome {
    pub fn done(item: impl Into<PathBuf>) -> Self {
        Self {
            item: item.into(),
            outcome: Outcome::Done,
        }
    }

    pub fn failed(item: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            outcome: Outcome::Failed(reason.into()),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, Outcome::Failed(_))
    }
}

/// Per-item results of a copy or delete, returned instead of only logged
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OperationReport {
    pub items: Vec<ItemOutcome>,
}

impl OperationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: ItemOutcome) {
        self.items.push(item);
    }

    pub fn failures(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.items.iter().filter(|i| i.is_failure())
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    /// Every item succeeded
    pub fn is_complete(&self) -> bool {
        self.failure_count() == 0
    }
}

/// Capability-based trait for save storage locations
pub trait Backend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Human readable root, for logs and the adapter's headers
    fn describe_root(&self) -> String;

    /// Root directory on the local filesystem, if this backend has one
    fn local_root(&self) -> Option<&Path> {
        None
    }

    /// Entry names directly under the saves root
    fn list(&self, cancel: &CancelToken) -> SaveResult<EntryStream<'_>>;

    /// Last-modified time of one entry
    fn metadata(&self, entry: &str, cancel: &CancelToken) -> SaveResult<chrono::NaiveDateTime>;

    /// Copy `entry` out of this backend into `dest_dir/<entry>` on the local filesystem
    fn copy_out(
        &self,
        entry: &str,
        dest_dir: &Path,
        cancel: &CancelToken,
    ) -> SaveResult<OperationReport>;

    /// Copy a local save directory into this backend's root under its own name
    fn copy_in(&self, src_entry_dir: &Path, cancel: &CancelToken) -> SaveResult<OperationReport>;

    /// Recursively remove `entry` from this backend
    fn delete(&self, entry: &str, cancel: &CancelToken) -> SaveResult<OperationReport>;

    /// Transfer one save's tree into `other`'s root under the same entry name.
    ///
    /// The local side decides the direction: a local source is pushed through
    /// `other.copy_in`, a local destination is pulled through `self.copy_out`.
    /// The source is left untouched.
    fn copy_into(
        &self,
        entry: &str,
        other: &dyn Backend,
        cancel: &CancelToken,
    ) -> SaveResult<OperationReport> {
        if let Some(root) = self.local_root() {
            return other.copy_in(&root.join(entry), cancel);
        }
        if let Some(dest_root) = other.local_root() {
            return self.copy_out(entry, dest_root, cancel);
        }
        Err(SaveError::Unsupported(format!(
            "neither {} nor {} is a local backend",
            self.kind(),
            other.kind()
        )))
    }
}
