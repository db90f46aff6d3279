//! Local filesystem backend (the PC saves directory)

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Local, NaiveDateTime};
use tracing::{debug, info, warn};

use super::{Backend, BackendKind, EntryStream, OperationReport};
use crate::cancel::CancelToken;
use crate::catalog::{is_quarantined, quarantine_name};
use crate::error::{SaveError, SaveResult};
use crate::util::{copy_dir_recursive, remove_dir_contents_first};

pub struct LocalFilesystemBackend {
    root: PathBuf,
}

impl LocalFilesystemBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn ensure_root(&self) -> SaveResult<()> {
        if self.root.is_dir() {
            Ok(())
        } else {
            Err(SaveError::unavailable(
                BackendKind::Local,
                format!("saves directory {} does not exist", self.root.display()),
            ))
        }
    }

    /// Move a partly deleted tree aside so the catalog no longer sees its identity
    fn park_remainder(
        &self,
        entry: &str,
        report: OperationReport,
    ) -> SaveResult<OperationReport> {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let target = self.root.join(entry);
        let parked = self.root.join(quarantine_name(entry, secs));

        match std::fs::rename(&target, &parked) {
            Ok(()) => {
                warn!(
                    "Save {} only partially deleted ({} failures), remainder moved to {}",
                    entry,
                    report.failure_count(),
                    parked.display()
                );
                Ok(report)
            }
            Err(e) => Err(SaveError::DeletionFailed {
                entry: entry.to_string(),
                reason: format!(
                    "{} item(s) could not be removed and the remainder could not be moved: {}",
                    report.failure_count(),
                    e
                ),
            }),
        }
    }
}

impl Backend for LocalFilesystemBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    fn describe_root(&self) -> String {
        self.root.display().to_string()
    }

    fn local_root(&self) -> Option<&Path> {
        Some(&self.root)
    }

    fn list(&self, cancel: &CancelToken) -> SaveResult<EntryStream<'_>> {
        cancel.check()?;
        let entries = std::fs::read_dir(&self.root).map_err(|e| {
            SaveError::unavailable(
                BackendKind::Local,
                format!("unable to access {}: {}", self.root.display(), e),
            )
        })?;

        let dirs = entries.filter_map(|entry| match entry {
            Ok(entry) if entry.path().is_dir() => {
                let name = entry.file_name().to_string_lossy().into_owned();
                if is_quarantined(&name) {
                    debug!("Skipping leftover of a partial delete: {}", name);
                    return None;
                }
                Some(name)
            }
            Ok(_) => None,
            Err(e) => {
                warn!("Skipping unreadable entry in saves directory: {}", e);
                None
            }
        });

        Ok(Box::new(dirs))
    }

    fn metadata(&self, entry: &str, _cancel: &CancelToken) -> SaveResult<NaiveDateTime> {
        let path = self.root.join(entry);
        let modified = std::fs::metadata(&path)
            .and_then(|m| m.modified())
            .map_err(|e| SaveError::Metadata {
                entry: entry.to_string(),
                reason: e.to_string(),
            })?;
        Ok(DateTime::<Local>::from(modified).naive_local())
    }

    fn copy_out(
        &self,
        entry: &str,
        dest_dir: &Path,
        cancel: &CancelToken,
    ) -> SaveResult<OperationReport> {
        let src = self.root.join(entry);
        if !src.is_dir() {
            return Err(SaveError::io(
                &src,
                std::io::Error::new(std::io::ErrorKind::NotFound, "save directory not found"),
            ));
        }
        copy_dir_recursive(&src, &dest_dir.join(entry), cancel)
    }

    fn copy_in(&self, src_entry_dir: &Path, cancel: &CancelToken) -> SaveResult<OperationReport> {
        self.ensure_root()?;
        let name = src_entry_dir.file_name().ok_or_else(|| {
            SaveError::Unsupported(format!("{} has no entry name", src_entry_dir.display()))
        })?;
        copy_dir_recursive(src_entry_dir, &self.root.join(name), cancel)
    }

    fn delete(&self, entry: &str, cancel: &CancelToken) -> SaveResult<OperationReport> {
        self.ensure_root()?;
        let target = self.root.join(entry);
        if !target.is_dir() {
            return Err(SaveError::DeletionFailed {
                entry: entry.to_string(),
                reason: format!("{} does not exist", target.display()),
            });
        }

        let (report, root_removed) = remove_dir_contents_first(&target, cancel)?;
        if root_removed {
            info!("Deleted local save {}", entry);
            return Ok(report);
        }

        self.park_remainder(entry, report)
    }
}
