//! SaveManager - the one type a presentation layer talks to
//!
//! Owns both backends and the backup root, and routes each call to the
//! matching engine. It holds no catalog state; callers re-scan after every
//! mutating operation.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::backend::{Backend, BackendKind, DeviceBridgeBackend, LocalFilesystemBackend, OperationReport};
use crate::backup::{self, BackupReport};
use crate::cancel::CancelToken;
use crate::catalog::{self, CatalogScan, FullCatalog, SaveRecord};
use crate::config::SvsmConfig;
use crate::deletion;
use crate::error::SaveResult;
use crate::transfer::{self, TransferError};

pub struct SaveManager {
    local: Box<dyn Backend>,
    remote: Box<dyn Backend>,
    backup_root: PathBuf,
}

impl SaveManager {
    pub fn new(local: Box<dyn Backend>, remote: Box<dyn Backend>, backup_root: impl Into<PathBuf>) -> Self {
        Self {
            local,
            remote,
            backup_root: backup_root.into(),
        }
    }

    /// Build the PC backend, the adb backend and the backup root from settings
    pub fn from_config(config: &SvsmConfig) -> SaveResult<Self> {
        let local_root = config.resolve_local_root()?;
        let backup_root = config.resolve_backup_root();

        info!("PC saves: {}", local_root.display());
        info!("Android saves: {}", config.remote_saves_root);
        info!("Backups: {}", backup_root.display());

        Ok(Self::new(
            Box::new(LocalFilesystemBackend::new(local_root)),
            Box::new(DeviceBridgeBackend::adb(&config.bridge, config.remote_saves_root.clone())),
            backup_root,
        ))
    }

    pub fn backend(&self, kind: BackendKind) -> &dyn Backend {
        match kind {
            BackendKind::Local => self.local.as_ref(),
            BackendKind::Remote => self.remote.as_ref(),
        }
    }

    pub fn backup_root(&self) -> &Path {
        &self.backup_root
    }

    /// Scan one backend; an unreachable backend comes back empty with a diagnostic
    pub fn scan(&self, kind: BackendKind, cancel: &CancelToken) -> CatalogScan {
        catalog::scan_or_report(self.backend(kind), cancel)
    }

    pub fn scan_all(&self, cancel: &CancelToken) -> FullCatalog {
        catalog::scan_all(self.local.as_ref(), self.remote.as_ref(), cancel)
    }

    /// Look up one save by identity, re-scanning the backend
    pub fn find(
        &self,
        kind: BackendKind,
        name: &str,
        id: &str,
        cancel: &CancelToken,
    ) -> SaveResult<Option<SaveRecord>> {
        let result = catalog::scan(self.backend(kind), cancel)?;
        Ok(result.find(name, id).cloned())
    }

    /// Copy `record` to the other backend; the source stays in place
    pub fn transfer(
        &self,
        record: &SaveRecord,
        cancel: &CancelToken,
    ) -> Result<OperationReport, TransferError> {
        self.transfer_to(record, record.backend.opposite(), cancel)
    }

    pub fn transfer_to(
        &self,
        record: &SaveRecord,
        to: BackendKind,
        cancel: &CancelToken,
    ) -> Result<OperationReport, TransferError> {
        transfer::transfer(record, self.backend(record.backend), self.backend(to), cancel)
    }

    pub fn delete(&self, record: &SaveRecord, cancel: &CancelToken) -> SaveResult<OperationReport> {
        deletion::delete(record, self.backend(record.backend), cancel)
    }

    /// Snapshot every PC save into the backup root
    pub fn snapshot(&self, cancel: &CancelToken) -> SaveResult<BackupReport> {
        backup::snapshot_all(self.local.as_ref(), &self.backup_root, cancel)
    }

    pub fn export(
        &self,
        record: &SaveRecord,
        dest_dir: &Path,
        cancel: &CancelToken,
    ) -> SaveResult<OperationReport> {
        backup::export_save(record, self.backend(record.backend), dest_dir, cancel)
    }
}
