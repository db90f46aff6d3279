//! Deletion engine
//!
//! No confirmation happens here; the presentation layer gates every call.

use tracing::info;

use crate::backend::{Backend, OperationReport};
use crate::cancel::CancelToken;
use crate::catalog::SaveRecord;
use crate::error::SaveResult;

/// Recursively remove `record`'s entry from `backend`.
///
/// Local deletion is best-effort: the returned report lists every file that
/// could not be removed, while the entry itself no longer shows up in scans.
pub fn delete(
    record: &SaveRecord,
    backend: &dyn Backend,
    cancel: &CancelToken,
) -> SaveResult<OperationReport> {
    let entry = record.entry_name();
    info!("Deleting {} from {}", entry, backend.describe_root());
    backend.delete(&entry, cancel)
}
