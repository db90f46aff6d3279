//! Backup manager - full snapshots of the PC saves and single-save exports
//!
//! A snapshot always re-copies every local save into the backup root,
//! overwriting whatever is there. There is no versioning and no diffing.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::backend::{Backend, OperationReport};
use crate::cancel::CancelToken;
use crate::catalog::SaveRecord;
use crate::error::{SaveError, SaveResult};

/// Copy result of one entry during a snapshot
#[derive(Clone, Debug, PartialEq)]
pub struct EntryBackup {
    pub entry: String,
    pub report: OperationReport,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BackupReport {
    pub root: PathBuf,
    pub entries: Vec<EntryBackup>,
}

impl BackupReport {
    /// Entries with at least one failed file
    pub fn incomplete(&self) -> impl Iterator<Item = &EntryBackup> {
        self.entries.iter().filter(|e| !e.report.is_complete())
    }

    pub fn is_complete(&self) -> bool {
        self.incomplete().next().is_none()
    }
}

/// Snapshot every entry of `local` into `backup_root/<entry>`.
///
/// Aborts only when the backup root cannot be created or the saves directory
/// cannot be listed. Everything below that is recorded and skipped past.
pub fn snapshot_all(
    local: &dyn Backend,
    backup_root: &Path,
    cancel: &CancelToken,
) -> SaveResult<BackupReport> {
    if !backup_root.is_dir() {
        std::fs::create_dir_all(backup_root).map_err(|source| {
            warn!("Error creating backup directory {}: {}", backup_root.display(), source);
            SaveError::BackupRootUnavailable {
                path: backup_root.to_path_buf(),
                source,
            }
        })?;
    }

    let entries: Vec<String> = local.list(cancel)?.collect();
    let mut report = BackupReport {
        root: backup_root.to_path_buf(),
        entries: Vec::with_capacity(entries.len()),
    };

    for entry in entries {
        cancel.check()?;

        let entry_report = match local.copy_out(&entry, backup_root, cancel) {
            Ok(r) => r,
            Err(SaveError::Cancelled) => return Err(SaveError::Cancelled),
            Err(e) => {
                let mut r = OperationReport::new();
                r.push(crate::backend::ItemOutcome::failed(backup_root.join(&entry), e.to_string()));
                r
            }
        };

        if entry_report.is_complete() {
            info!("Backed up save: {}", entry);
        } else {
            warn!(
                "Backed up save {} with {} failed item(s)",
                entry,
                entry_report.failure_count()
            );
        }

        report.entries.push(EntryBackup {
            entry,
            report: entry_report,
        });
    }

    info!(
        "Snapshot of {} save(s) written to {}",
        report.entries.len(),
        backup_root.display()
    );

    Ok(report)
}

/// Copy one save from `backend` into `dest_dir/<entry>`
pub fn export_save(
    record: &SaveRecord,
    backend: &dyn Backend,
    dest_dir: &Path,
    cancel: &CancelToken,
) -> SaveResult<OperationReport> {
    let entry = record.entry_name();
    info!(
        "Exporting {} from {} to {}",
        entry,
        backend.describe_root(),
        dest_dir.display()
    );
    std::fs::create_dir_all(dest_dir).map_err(|e| SaveError::io(dest_dir, e))?;
    backend.copy_out(&entry, dest_dir, cancel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendKind, DeviceBridgeBackend, EntryStream, LocalFilesystemBackend};
    use crate::bridge::fake::{FAKE_REMOTE_ROOT, FakeAdb};
    use chrono::NaiveDateTime;
    use std::collections::BTreeMap;
    use std::fs;

    fn populate(root: &Path) {
        fs::create_dir_all(root.join("Robin_1001")).unwrap();
        fs::write(root.join("Robin_1001/Robin_1001"), b"<SaveGame>robin</SaveGame>").unwrap();
        fs::write(root.join("Robin_1001/SaveGameInfo"), b"robin-info").unwrap();
        fs::create_dir_all(root.join("BadName/nested")).unwrap();
        fs::write(root.join("BadName/nested/x"), b"x").unwrap();
    }

    /// Local saves where copying one entry fails outright
    struct OneBroken {
        inner: LocalFilesystemBackend,
        broken: &'static str,
    }

    impl Backend for OneBroken {
        fn kind(&self) -> BackendKind {
            BackendKind::Local
        }
        fn describe_root(&self) -> String {
            self.inner.describe_root()
        }
        fn list(&self, cancel: &CancelToken) -> SaveResult<EntryStream<'_>> {
            self.inner.list(cancel)
        }
        fn metadata(&self, entry: &str, cancel: &CancelToken) -> SaveResult<NaiveDateTime> {
            self.inner.metadata(entry, cancel)
        }
        fn copy_out(
            &self,
            entry: &str,
            dest_dir: &Path,
            cancel: &CancelToken,
        ) -> SaveResult<OperationReport> {
            if entry == self.broken {
                return Err(SaveError::io(
                    dest_dir.join(entry),
                    std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read error"),
                ));
            }
            self.inner.copy_out(entry, dest_dir, cancel)
        }
        fn copy_in(&self, src: &Path, cancel: &CancelToken) -> SaveResult<OperationReport> {
            self.inner.copy_in(src, cancel)
        }
        fn delete(&self, entry: &str, cancel: &CancelToken) -> SaveResult<OperationReport> {
            self.inner.delete(entry, cancel)
        }
    }

    /// Relative path -> contents for every file under `root`
    fn tree(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
        walkdir::WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                (
                    e.path().strip_prefix(root).unwrap().to_path_buf(),
                    fs::read(e.path()).unwrap(),
                )
            })
            .collect()
    }

    #[test]
    fn snapshot_creates_root_and_copies_every_entry() {
        let pc = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        populate(pc.path());
        let backup_root = out.path().join("SteamSavesBackup");
        let local = LocalFilesystemBackend::new(pc.path());

        let report = snapshot_all(&local, &backup_root, &CancelToken::new()).unwrap();

        assert!(report.is_complete());
        assert_eq!(report.entries.len(), 2);
        assert_eq!(tree(&backup_root), tree(pc.path()));
    }

    #[test]
    fn snapshot_twice_is_identical() {
        let pc = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        populate(pc.path());
        let local = LocalFilesystemBackend::new(pc.path());

        snapshot_all(&local, out.path(), &CancelToken::new()).unwrap();
        let first = tree(out.path());
        snapshot_all(&local, out.path(), &CancelToken::new()).unwrap();

        assert_eq!(tree(out.path()), first);
    }

    #[test]
    fn snapshot_overwrites_stale_backup() {
        let pc = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        populate(pc.path());
        fs::create_dir_all(out.path().join("Robin_1001")).unwrap();
        fs::write(out.path().join("Robin_1001/SaveGameInfo"), b"old old old").unwrap();
        let local = LocalFilesystemBackend::new(pc.path());

        snapshot_all(&local, out.path(), &CancelToken::new()).unwrap();

        assert_eq!(
            fs::read(out.path().join("Robin_1001/SaveGameInfo")).unwrap(),
            b"robin-info"
        );
    }

    #[test]
    fn failed_file_does_not_stop_the_rest() {
        let pc = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        populate(pc.path());
        // A directory where the file should go cannot be overwritten
        fs::create_dir_all(out.path().join("Robin_1001/SaveGameInfo/stale")).unwrap();
        let local = LocalFilesystemBackend::new(pc.path());

        let report = snapshot_all(&local, out.path(), &CancelToken::new()).unwrap();

        assert!(!report.is_complete());
        let robin = report.entries.iter().find(|e| e.entry == "Robin_1001").unwrap();
        assert_eq!(robin.report.failure_count(), 1);
        assert!(robin.report.failures().next().unwrap().item.ends_with("SaveGameInfo"));
        assert_eq!(
            fs::read(out.path().join("Robin_1001/Robin_1001")).unwrap(),
            b"<SaveGame>robin</SaveGame>"
        );
        assert_eq!(fs::read(out.path().join("BadName/nested/x")).unwrap(), b"x");
    }

    #[test]
    fn failed_entry_does_not_stop_other_entries() {
        let pc = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        populate(pc.path());
        let local = OneBroken {
            inner: LocalFilesystemBackend::new(pc.path()),
            broken: "BadName",
        };

        let report = snapshot_all(&local, out.path(), &CancelToken::new()).unwrap();

        assert_eq!(report.entries.len(), 2);
        let incomplete: Vec<&str> = report.incomplete().map(|e| e.entry.as_str()).collect();
        assert_eq!(incomplete, vec!["BadName"]);
        assert!(!out.path().join("BadName").exists());
        assert_eq!(
            fs::read(out.path().join("Robin_1001/SaveGameInfo")).unwrap(),
            b"robin-info"
        );
    }

    #[test]
    fn partial_delete_leftovers_are_not_backed_up() {
        let pc = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        populate(pc.path());
        fs::create_dir_all(pc.path().join("Abigail_22_deleted_1700000000")).unwrap();
        let local = LocalFilesystemBackend::new(pc.path());

        let report = snapshot_all(&local, out.path(), &CancelToken::new()).unwrap();

        assert_eq!(report.entries.len(), 2);
        assert!(!out.path().join("Abigail_22_deleted_1700000000").exists());
    }

    #[test]
    fn unreadable_source_aborts() {
        let pc = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let local = LocalFilesystemBackend::new(pc.path().join("missing"));

        let err = snapshot_all(&local, out.path(), &CancelToken::new())
            .err()
            .unwrap();
        assert!(matches!(err, SaveError::BackendUnavailable { .. }));
    }

    #[test]
    fn uncreatable_backup_root_aborts() {
        let pc = tempfile::tempdir().unwrap();
        populate(pc.path());
        let blocker = pc.path().join("not-a-dir");
        fs::write(&blocker, b"file").unwrap();
        let local = LocalFilesystemBackend::new(pc.path());

        let err = snapshot_all(&local, &blocker.join("backup"), &CancelToken::new())
            .err()
            .unwrap();
        assert!(matches!(err, SaveError::BackupRootUnavailable { .. }));
    }

    #[test]
    fn export_from_device_pulls_into_destination() {
        let phone = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        fs::create_dir_all(phone.path().join("Robin_1001")).unwrap();
        fs::write(phone.path().join("Robin_1001/SaveGameInfo"), b"phone").unwrap();
        let device = DeviceBridgeBackend::new(
            Box::new(FakeAdb::new(phone.path(), true)),
            FAKE_REMOTE_ROOT,
            None,
        );
        let record = SaveRecord {
            name: "Robin".to_string(),
            id: "1001".to_string(),
            last_played: None,
            backend: BackendKind::Remote,
        };

        export_save(&record, &device, dest.path(), &CancelToken::new()).unwrap();

        assert_eq!(
            fs::read(dest.path().join("Robin_1001/SaveGameInfo")).unwrap(),
            b"phone"
        );
    }
}
