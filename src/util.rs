//! Filesystem helpers shared by the local backend and the backup manager
//!
//! Both walks record one `ItemOutcome` per file/directory and keep going past
//! failures; only cancellation stops them early.

use std::path::Path;

use tracing::{debug, warn};

use crate::backend::{ItemOutcome, OperationReport};
use crate::cancel::CancelToken;
use crate::error::SaveResult;

/// Copy a directory tree into `dest`, overwriting files that already exist there
pub fn copy_dir_recursive(
    src: &Path,
    dest: &Path,
    cancel: &CancelToken,
) -> SaveResult<OperationReport> {
    debug!(
        "util::copy_dir_recursive - src: {}, dest: {}",
        src.display(),
        dest.display()
    );

    let mut report = OperationReport::new();

    if let Err(e) = std::fs::create_dir_all(dest) {
        warn!("Could not create {}: {}", dest.display(), e);
        report.push(ItemOutcome::failed(dest, e.to_string()));
        return Ok(report);
    }

    let walk_path = walkdir::WalkDir::new(src).min_depth(1).follow_links(false);

    for entry in walk_path {
        cancel.check()?;

        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let item = e.path().unwrap_or(src).to_path_buf();
                warn!("Could not read {}: {}", item.display(), e);
                report.push(ItemOutcome::failed(item, e.to_string()));
                continue;
            }
        };

        let rel_path = match entry.path().strip_prefix(src) {
            Ok(rel) => rel,
            Err(e) => {
                report.push(ItemOutcome::failed(entry.path(), e.to_string()));
                continue;
            }
        };
        let new_path = dest.join(rel_path);

        let result = if entry.file_type().is_dir() {
            std::fs::create_dir_all(&new_path)
        } else if entry.file_type().is_symlink() {
            copy_symlink(entry.path(), &new_path)
        } else {
            copy_file(entry.path(), &new_path)
        };

        match result {
            Ok(()) => report.push(ItemOutcome::done(entry.path())),
            Err(e) => {
                warn!("Error copying {}: {}", entry.path().display(), e);
                report.push(ItemOutcome::failed(entry.path(), e.to_string()));
            }
        }
    }

    Ok(report)
}

fn copy_file(src: &Path, dest: &Path) -> std::io::Result<()> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if dest.exists() {
        std::fs::remove_file(dest)?;
    }
    std::fs::copy(src, dest)?;
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dest: &Path) -> std::io::Result<()> {
    let target = std::fs::read_link(src)?;
    if dest.symlink_metadata().is_ok() {
        std::fs::remove_file(dest)?;
    }
    std::os::unix::fs::symlink(target, dest)
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dest: &Path) -> std::io::Result<()> {
    copy_file(src, dest)
}

/// Remove a tree children-before-parent.
///
/// Returns the per-item report and whether `root` itself is gone. A failed
/// child leaves its parents in place but never stops the walk.
pub fn remove_dir_contents_first(
    root: &Path,
    cancel: &CancelToken,
) -> SaveResult<(OperationReport, bool)> {
    let mut report = OperationReport::new();

    let walk_path = walkdir::WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .contents_first(true);

    for entry in walk_path {
        cancel.check()?;

        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let item = e.path().unwrap_or(root).to_path_buf();
                warn!("Could not read {}: {}", item.display(), e);
                report.push(ItemOutcome::failed(item, e.to_string()));
                continue;
            }
        };

        let result = if entry.file_type().is_dir() {
            std::fs::remove_dir(entry.path())
        } else {
            std::fs::remove_file(entry.path())
        };

        match result {
            Ok(()) => report.push(ItemOutcome::done(entry.path())),
            Err(e) => {
                warn!("Error deleting {}: {}", entry.path().display(), e);
                report.push(ItemOutcome::failed(entry.path(), e.to_string()));
            }
        }
    }

    let root_removed = match std::fs::remove_dir(root) {
        Ok(()) => {
            report.push(ItemOutcome::done(root));
            true
        }
        Err(e) => {
            warn!("Error deleting {}: {}", root.display(), e);
            report.push(ItemOutcome::failed(root, e.to_string()));
            false
        }
    };

    Ok((report, root_removed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn sample_tree(root: &Path) {
        fs::create_dir_all(root.join("sub/deeper")).unwrap();
        fs::write(root.join("Robin_1001"), b"<SaveGame/>").unwrap();
        fs::write(root.join("SaveGameInfo"), b"info").unwrap();
        fs::write(root.join("sub/deeper/extra.bin"), [1u8, 2, 3]).unwrap();
    }

    #[test]
    fn copy_reproduces_tree() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src");
        let dest = tmp.path().join("dest");
        sample_tree(&src);

        let report = copy_dir_recursive(&src, &dest, &CancelToken::new()).unwrap();

        assert!(report.is_complete());
        assert_eq!(fs::read(dest.join("Robin_1001")).unwrap(), b"<SaveGame/>");
        assert_eq!(fs::read(dest.join("sub/deeper/extra.bin")).unwrap(), [1u8, 2, 3]);
    }

    #[test]
    fn copy_overwrites_existing_files() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src");
        let dest = tmp.path().join("dest");
        sample_tree(&src);
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("SaveGameInfo"), b"stale and much longer").unwrap();

        copy_dir_recursive(&src, &dest, &CancelToken::new()).unwrap();

        assert_eq!(fs::read(dest.join("SaveGameInfo")).unwrap(), b"info");
    }

    #[test]
    fn copy_stops_when_cancelled() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src");
        sample_tree(&src);
        let cancel = CancelToken::new();
        cancel.cancel();

        let result = copy_dir_recursive(&src, &tmp.path().join("dest"), &cancel);
        assert!(matches!(result, Err(crate::error::SaveError::Cancelled)));
    }

    #[test]
    fn remove_deletes_children_before_parent() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("Robin_1001");
        sample_tree(&root);

        let (report, root_removed) =
            remove_dir_contents_first(&root, &CancelToken::new()).unwrap();

        assert!(root_removed);
        assert!(report.is_complete());
        assert!(!root.exists());

        let deeper = report
            .items
            .iter()
            .position(|i| i.item.ends_with("sub/deeper"))
            .unwrap();
        let sub = report
            .items
            .iter()
            .position(|i| i.item.ends_with("sub"))
            .unwrap();
        assert!(deeper < sub);
        assert_eq!(report.items.last().map(|i| i.item.clone()), Some(root));
    }
}
