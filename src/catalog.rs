//! Save catalog - what saves exist on a backend
//!
//! A catalog is rebuilt from scratch on every scan; the backend's storage is
//! the only source of truth and records are never cached or updated in place.
//!
//! ## Module Structure
//! - `types.rs`: SaveRecord, Diagnostic, CatalogScan, FullCatalog
//! - `pure.rs`: Entry-name parsing and formatting, search patterns
//! - `pipelines.rs`: scan, scan_or_report, scan_all

mod pipelines;
mod pure;
mod types;

// Re-export types
pub use types::{CatalogScan, Diagnostic, FullCatalog, SaveRecord};

// Re-export pure functions
pub use pure::{
    ENTRY_SEPARATOR, EntryNameError, QUARANTINE_MARKER, entry_name, is_quarantined,
    parse_entry_name, quarantine_name, search_pattern,
};

// Re-export pipelines
pub use pipelines::{scan, scan_all, scan_or_report};
