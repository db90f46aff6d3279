//! Catalog pipelines - turning a backend listing into save records

use std::collections::HashSet;

use tracing::{debug, info, warn};

use super::pure::parse_entry_name;
use super::types::{CatalogScan, Diagnostic, FullCatalog, SaveRecord};
use crate::backend::Backend;
use crate::cancel::CancelToken;
use crate::error::{SaveError, SaveResult};

/// Scan one backend.
///
/// Fails only when the backend cannot be listed (or the scan is cancelled).
/// Malformed names and unresolved timestamps become diagnostics. Records come
/// back in lexical entry order; when two entries share an identity the first
/// in that order wins and the other is reported as `DuplicateIdentity`.
pub fn scan(backend: &dyn Backend, cancel: &CancelToken) -> SaveResult<CatalogScan> {
    let kind = backend.kind();
    let mut entries: Vec<String> = backend.list(cancel)?.collect();
    entries.sort();

    let mut result = CatalogScan::empty(kind);
    let mut seen: HashSet<(String, String)> = HashSet::new();

    for entry in entries {
        cancel.check()?;

        let (name, id) = match parse_entry_name(&entry) {
            Ok(parts) => parts,
            Err(e) => {
                warn!("{} - Skipping invalid save folder name: {}", kind, entry);
                result.diagnostics.push(Diagnostic::ParseSkipped {
                    entry,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        if !seen.insert((name.clone(), id.clone())) {
            warn!("{} - Duplicate save identity: {}", kind, entry);
            result
                .diagnostics
                .push(Diagnostic::DuplicateIdentity { entry, name, id });
            continue;
        }

        let last_played = match backend.metadata(&entry, cancel) {
            Ok(time) => Some(time),
            Err(SaveError::Cancelled) => return Err(SaveError::Cancelled),
            Err(e) => {
                warn!("{} - Error getting last modified date for {}: {}", kind, entry, e);
                result.diagnostics.push(Diagnostic::MetadataUnresolved {
                    entry: entry.clone(),
                    reason: e.to_string(),
                });
                None
            }
        };

        debug!("{} - Found save {} ({})", kind, entry, backend.describe_root());
        result.records.push(SaveRecord {
            name,
            id,
            last_played,
            backend: kind,
        });
    }

    info!(
        "{} - Catalog: {} save(s), {} diagnostic(s)",
        kind,
        result.records.len(),
        result.diagnostics.len()
    );

    Ok(result)
}

/// Like [`scan`], but an unreachable backend yields an empty catalog carrying a
/// `BackendUnavailable` diagnostic instead of an error
pub fn scan_or_report(backend: &dyn Backend, cancel: &CancelToken) -> CatalogScan {
    match scan(backend, cancel) {
        Ok(result) => result,
        Err(e) => {
            warn!("{} - Scan failed: {}", backend.kind(), e);
            let mut result = CatalogScan::empty(backend.kind());
            let reason = match e {
                SaveError::BackendUnavailable { reason, .. } => reason,
                other => other.to_string(),
            };
            result.diagnostics.push(Diagnostic::BackendUnavailable {
                backend: backend.kind(),
                reason,
            });
            result
        }
    }
}

/// Scan both backends, one after the other; neither outcome affects the other
pub fn scan_all(local: &dyn Backend, remote: &dyn Backend, cancel: &CancelToken) -> FullCatalog {
    FullCatalog {
        local: scan_or_report(local, cancel),
        remote: scan_or_report(remote, cancel),
    }
}
