//! Entry-name parsing
//!
//! Saves are directories named `<name>_<id>` on both backends.

use regex::{Regex, RegexBuilder};
use thiserror::Error;

pub const ENTRY_SEPARATOR: char = '_';

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EntryNameError {
    #[error("no '_' separator")]
    MissingSeparator,
    #[error("{0} parts instead of 2")]
    TooManyParts(usize),
    #[error("empty name or id")]
    EmptyPart,
}

/// Split a raw entry name into `(name, id)`.
///
/// Valid only when splitting on the separator yields exactly two non-empty parts.
pub fn parse_entry_name(raw: &str) -> Result<(String, String), EntryNameError> {
    let parts: Vec<&str> = raw.split(ENTRY_SEPARATOR).collect();
    match parts.as_slice() {
        [name, id] if !name.is_empty() && !id.is_empty() => {
            Ok((name.to_string(), id.to_string()))
        }
        [_, _] => Err(EntryNameError::EmptyPart),
        [_] => Err(EntryNameError::MissingSeparator),
        _ => Err(EntryNameError::TooManyParts(parts.len())),
    }
}

/// Rebuild the on-disk entry name from a save's identity
pub fn entry_name(name: &str, id: &str) -> String {
    format!("{}{}{}", name, ENTRY_SEPARATOR, id)
}

/// Infix of a partly deleted tree moved aside by a local delete
pub const QUARANTINE_MARKER: &str = "_deleted_";

/// `<entry>_deleted_<unix-secs>`; never parses as a save
pub fn quarantine_name(entry: &str, unix_secs: u64) -> String {
    format!("{}{}{}", entry, QUARANTINE_MARKER, unix_secs)
}

/// True for names produced by [`quarantine_name`]
pub fn is_quarantined(raw: &str) -> bool {
    match raw.rsplit_once(QUARANTINE_MARKER) {
        Some((entry, secs)) => {
            !entry.is_empty() && !secs.is_empty() && secs.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

/// Case-insensitive pattern for narrowing a listing by name or id
pub fn search_pattern(query: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(query).case_insensitive(true).build()
}
