//! Catalog type definitions

use std::fmt;

use chrono::NaiveDateTime;
use regex::Regex;

use super::pure::entry_name;
use crate::backend::BackendKind;

/// Shown in place of a last-played date that could not be resolved
pub const LAST_PLAYED_UNKNOWN: &str = "N/A";

/// One discovered save, a transient view over the backend's directory
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveRecord {
    /// Farm name, the part before the separator
    pub name: String,
    /// Save identifier, the part after the separator
    pub id: String,
    pub last_played: Option<NaiveDateTime>,
    pub backend: BackendKind,
}

impl SaveRecord {
    /// Directory name on either backend
    pub fn entry_name(&self) -> String {
        entry_name(&self.name, &self.id)
    }

    /// "Robin Farm"
    pub fn farm_label(&self) -> String {
        format!("{} Farm", self.name)
    }

    /// `MM/dd/yyyy`, or "N/A"
    pub fn last_played_label(&self) -> String {
        self.last_played
            .map(|t| t.format("%m/%d/%Y").to_string())
            .unwrap_or_else(|| LAST_PLAYED_UNKNOWN.to_string())
    }

    pub fn same_identity(&self, other: &SaveRecord) -> bool {
        self.name == other.name && self.id == other.id
    }
}

/// Non-fatal finding reported alongside a scan
#[derive(Clone, Debug, PartialEq)]
pub enum Diagnostic {
    /// Entry name is not `<name>_<id>`; entry excluded
    ParseSkipped { entry: String, reason: String },
    /// Timestamp lookup failed; record kept without a date
    MetadataUnresolved { entry: String, reason: String },
    /// The backend could not be listed at all
    BackendUnavailable { backend: BackendKind, reason: String },
    /// A second entry parsed to an identity already in the catalog; later one dropped
    DuplicateIdentity { entry: String, name: String, id: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::ParseSkipped { entry, reason } => {
                write!(f, "skipping invalid save folder name '{}': {}", entry, reason)
            }
            Diagnostic::MetadataUnresolved { entry, reason } => {
                write!(f, "last played unknown for '{}': {}", entry, reason)
            }
            Diagnostic::BackendUnavailable { backend, reason } => {
                write!(f, "{} saves unavailable: {}", backend, reason)
            }
            Diagnostic::DuplicateIdentity { entry, name, id } => write!(
                f,
                "'{}' duplicates save {} ({}); keeping the first",
                entry, name, id
            ),
        }
    }
}

/// Result of scanning one backend
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogScan {
    pub backend: BackendKind,
    pub records: Vec<SaveRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

impl CatalogScan {
    pub fn empty(backend: BackendKind) -> Self {
        Self {
            backend,
            records: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn find(&self, name: &str, id: &str) -> Option<&SaveRecord> {
        self.records.iter().find(|r| r.name == name && r.id == id)
    }

    pub fn contains(&self, record: &SaveRecord) -> bool {
        self.records.iter().any(|r| r.same_identity(record))
    }

    /// Keep only records whose farm name or id matches `pattern`; diagnostics stay
    pub fn retain_matching(&mut self, pattern: &Regex) {
        self.records
            .retain(|r| pattern.is_match(&r.name) || pattern.is_match(&r.id));
    }

    /// Backend could not be listed during this scan
    pub fn is_unavailable(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::BackendUnavailable { .. }))
    }
}

/// Independent scans of both backends
#[derive(Clone, Debug, PartialEq)]
pub struct FullCatalog {
    pub local: CatalogScan,
    pub remote: CatalogScan,
}

impl FullCatalog {
    pub fn get(&self, kind: BackendKind) -> &CatalogScan {
        match kind {
            BackendKind::Local => &self.local,
            BackendKind::Remote => &self.remote,
        }
    }
}
