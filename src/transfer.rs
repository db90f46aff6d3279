//! Transfer engine - copy one save between the PC and the device
//!
//! A transfer duplicates: the source copy is never removed, even though the
//! adapter labels the action "move". Callers wanting a relocation delete the
//! source explicitly afterwards.

use thiserror::Error;
use tracing::{info, warn};

use crate::backend::{Backend, BackendKind, OperationReport};
use crate::cancel::CancelToken;
use crate::catalog::SaveRecord;
use crate::error::SaveError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransferFailure {
    #[error("no Android device attached")]
    NoRemoteEndpoint,
    #[error("{0}")]
    IoFailure(String),
    /// The copy ran but some items failed; the report lists each of them
    #[error("{} item(s) could not be copied", .0.failure_count())]
    PartialCopy(OperationReport),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransferError {
    #[error("source and destination are both {0}")]
    SameBackend(BackendKind),
    #[error("transfer cancelled")]
    Cancelled,
    #[error("transfer failed: {0}")]
    Failed(TransferFailure),
}

impl From<SaveError> for TransferError {
    fn from(e: SaveError) -> Self {
        match e {
            SaveError::Cancelled => TransferError::Cancelled,
            e if e.is_remote_unavailable() => {
                TransferError::Failed(TransferFailure::NoRemoteEndpoint)
            }
            other => TransferError::Failed(TransferFailure::IoFailure(other.to_string())),
        }
    }
}

/// Copy `record`'s entry from `from` into `to` under the same entry name
pub fn transfer(
    record: &SaveRecord,
    from: &dyn Backend,
    to: &dyn Backend,
    cancel: &CancelToken,
) -> Result<OperationReport, TransferError> {
    if from.kind() == to.kind() {
        return Err(TransferError::SameBackend(from.kind()));
    }

    let entry = record.entry_name();
    info!(
        "Transferring {} from {} to {}",
        entry,
        from.describe_root(),
        to.describe_root()
    );

    let report = from.copy_into(&entry, to, cancel).map_err(|e| {
        warn!("Error transferring save {}: {}", entry, e);
        TransferError::from(e)
    })?;

    if report.is_complete() {
        info!("Save {} transferred successfully", entry);
        Ok(report)
    } else {
        let failed = report.failure_count();
        warn!("Save {} transferred with {} failed item(s)", entry, failed);
        Err(TransferError::Failed(TransferFailure::PartialCopy(report)))
    }
}
