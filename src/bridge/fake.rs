//! Scripted stand-in for adb, backed by a temp directory playing the device

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Local};

use super::BridgeRunner;
use super::types::BridgeOutput;
use crate::cancel::CancelToken;
use crate::error::SaveResult;
use crate::util::copy_dir_recursive;

pub const FAKE_REMOTE_ROOT: &str = "/storage/emulated/0/Android/data/com.chucklefish.stardewvalley/files/Saves";

pub struct FakeAdb {
    pub device_dir: PathBuf,
    pub attached: bool,
    pub calls: Mutex<Vec<Vec<String>>>,
}

impl FakeAdb {
    pub fn new(device_dir: &Path, attached: bool) -> Self {
        Self {
            device_dir: device_dir.to_path_buf(),
            attached,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    fn local_for(&self, remote: &str) -> Option<PathBuf> {
        let remote = unquote(remote);
        let rel = remote.strip_prefix(FAKE_REMOTE_ROOT)?;
        let rel = rel.trim_start_matches('/');
        if rel.is_empty() {
            Some(self.device_dir.clone())
        } else {
            Some(self.device_dir.join(rel))
        }
    }
}

fn unquote(s: &str) -> String {
    let inner = s
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(s);
    inner.replace(r"'\''", "'")
}

/// Where `cp -r src dest` puts the tree: inside `dest` when it is an existing
/// directory, otherwise `dest` itself becomes the copy
fn cp_r_target(src: &Path, dest: &Path) -> PathBuf {
    match src.file_name() {
        Some(name) if dest.is_dir() => dest.join(name),
        _ => dest.to_path_buf(),
    }
}

fn ok(stdout: impl Into<String>) -> BridgeOutput {
    BridgeOutput {
        status: Some(0),
        stdout: stdout.into(),
        stderr: String::new(),
    }
}

fn fail(stderr: impl Into<String>) -> BridgeOutput {
    BridgeOutput {
        status: Some(1),
        stdout: String::new(),
        stderr: stderr.into(),
    }
}

impl BridgeRunner for FakeAdb {
    fn run(&self, args: &[&str], cancel: &CancelToken) -> SaveResult<BridgeOutput> {
        cancel.check()?;
        self.calls
            .lock()
            .unwrap()
            .push(args.iter().map(|a| a.to_string()).collect());

        let output = match args {
            ["devices"] => {
                if self.attached {
                    ok("List of devices attached\nFAKE0001\tdevice\n\n")
                } else {
                    ok("List of devices attached\n\n")
                }
            }
            ["shell", "ls", "-1", "-p", path] => match self.local_for(path) {
                Some(dir) => match std::fs::read_dir(&dir) {
                    Ok(entries) => {
                        let mut out = String::new();
                        for entry in entries.flatten() {
                            out.push_str(&entry.file_name().to_string_lossy());
                            if entry.path().is_dir() {
                                out.push('/');
                            }
                            out.push('\n');
                        }
                        ok(out)
                    }
                    Err(e) => fail(e.to_string()),
                },
                None => fail("no such path"),
            },
            ["shell", "stat", "-c", "%y", path] => match self
                .local_for(path)
                .and_then(|p| std::fs::metadata(p).ok())
                .and_then(|m| m.modified().ok())
            {
                Some(modified) => ok(format!(
                    "{} +0000\n",
                    DateTime::<Local>::from(modified)
                        .naive_local()
                        .format("%Y-%m-%d %H:%M:%S%.9f")
                )),
                None => fail("stat: No such file or directory"),
            },
            ["pull", remote, dest] => match self.local_for(remote) {
                Some(src) if src.is_dir() => {
                    copy_dir_recursive(&src, &cp_r_target(&src, Path::new(dest)), cancel)?;
                    ok("1 file pulled")
                }
                _ => fail("remote object does not exist"),
            },
            ["push", src, remote_dest] => match self.local_for(remote_dest) {
                Some(dest) if Path::new(src).is_dir() => {
                    let src = Path::new(src);
                    copy_dir_recursive(src, &cp_r_target(src, &dest), cancel)?;
                    ok("1 file pushed")
                }
                _ => fail("push failed"),
            },
            ["shell", "mkdir", "-p", path] => match self.local_for(path) {
                Some(dir) => match std::fs::create_dir_all(dir) {
                    Ok(()) => ok(""),
                    Err(e) => fail(e.to_string()),
                },
                None => fail("mkdir failed"),
            },
            ["shell", "rm", "-rf", path] => match self.local_for(path) {
                Some(target) => {
                    let _ = std::fs::remove_dir_all(target);
                    ok("")
                }
                None => fail("rm failed"),
            },
            _ => fail(format!("unexpected command: {:?}", args)),
        };

        Ok(output)
    }
}
