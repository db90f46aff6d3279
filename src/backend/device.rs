//! Android device backend, reached only through the adb bridge
//!
//! Every operation is an external command. `list`, `copy_in`, `copy_out` and
//! `delete` first check that an endpoint is attached and ready, and fail with
//! `BackendUnavailable` before running anything else when it is not.

use std::path::Path;
use std::time::Duration;

use chrono::NaiveDateTime;
use tracing::{debug, info};

use super::{Backend, BackendKind, EntryStream, ItemOutcome, OperationReport};
use crate::bridge::{
    AdbBridge, BridgeRunner, parse_attached_devices, parse_directory_listing,
    parse_stat_timestamp, remote_join, shell_quote,
};
use crate::cancel::CancelToken;
use crate::config::BridgeConfig;
use crate::error::{SaveError, SaveResult};

pub struct DeviceBridgeBackend {
    runner: Box<dyn BridgeRunner>,
    root: String,
    serial: Option<String>,
}

impl DeviceBridgeBackend {
    pub fn new(runner: Box<dyn BridgeRunner>, root: impl Into<String>, serial: Option<String>) -> Self {
        Self {
            runner,
            root: root.into(),
            serial,
        }
    }

    /// Backend talking to a real adb binary per the bridge settings
    pub fn adb(config: &BridgeConfig, root: impl Into<String>) -> Self {
        let runner = AdbBridge::new(
            &config.program,
            config.serial.clone(),
            Duration::from_secs(config.timeout_secs),
        );
        Self::new(Box::new(runner), root, config.serial.clone())
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    fn entry_path(&self, entry: &str) -> String {
        remote_join(&self.root, entry)
    }

    /// Precondition for every mutating or listing call
    fn ensure_ready(&self, cancel: &CancelToken) -> SaveResult<String> {
        let output = match self.runner.run(&["devices"], cancel) {
            Ok(output) => output,
            Err(SaveError::Cancelled) => return Err(SaveError::Cancelled),
            Err(e) => return Err(SaveError::unavailable(BackendKind::Remote, e.to_string())),
        };

        if !output.success() {
            return Err(SaveError::unavailable(
                BackendKind::Remote,
                format!("device discovery failed ({})", output.status_label()),
            ));
        }

        let devices = parse_attached_devices(&output.stdout);
        let ready = devices.iter().find(|d| {
            d.is_ready() && self.serial.as_ref().is_none_or(|s| *s == d.serial)
        });

        match ready {
            Some(device) => {
                debug!("device - Endpoint ready: {}", device.serial);
                Ok(device.serial.clone())
            }
            None => {
                let reason = match (&self.serial, devices.is_empty()) {
                    (Some(serial), _) => format!("device {} is not attached and ready", serial),
                    (None, true) => "no Android device connected".to_string(),
                    (None, false) => format!(
                        "no ready device (found: {})",
                        devices
                            .iter()
                            .map(|d| format!("{} {}", d.serial, d.state))
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                };
                Err(SaveError::unavailable(BackendKind::Remote, reason))
            }
        }
    }

    fn run_checked(&self, args: &[&str], cancel: &CancelToken) -> SaveResult<String> {
        let output = self.runner.run(args, cancel)?;
        if output.success() {
            Ok(output.stdout)
        } else {
            Err(SaveError::Bridge {
                command: format!("adb {}", args.join(" ")),
                status: output.status_label(),
                stderr: output.stderr.trim().to_string(),
            })
        }
    }
}

impl Backend for DeviceBridgeBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }

    fn describe_root(&self) -> String {
        format!("adb:{}", self.root)
    }

    fn list(&self, cancel: &CancelToken) -> SaveResult<EntryStream<'_>> {
        self.ensure_ready(cancel)?;

        let quoted = shell_quote(&self.root);
        let stdout = match self.run_checked(&["shell", "ls", "-1", "-p", &quoted], cancel) {
            Ok(stdout) => stdout,
            Err(SaveError::Cancelled) => return Err(SaveError::Cancelled),
            Err(e) => return Err(SaveError::unavailable(BackendKind::Remote, e.to_string())),
        };

        Ok(Box::new(parse_directory_listing(&stdout).into_iter()))
    }

    fn metadata(&self, entry: &str, cancel: &CancelToken) -> SaveResult<NaiveDateTime> {
        let quoted = shell_quote(&self.entry_path(entry));
        let stdout = self
            .run_checked(&["shell", "stat", "-c", "%y", &quoted], cancel)
            .map_err(|e| match e {
                SaveError::Cancelled => SaveError::Cancelled,
                other => SaveError::Metadata {
                    entry: entry.to_string(),
                    reason: other.to_string(),
                },
            })?;

        parse_stat_timestamp(&stdout).ok_or_else(|| SaveError::Metadata {
            entry: entry.to_string(),
            reason: format!("unrecognised timestamp '{}'", stdout.trim()),
        })
    }

    fn copy_out(
        &self,
        entry: &str,
        dest_dir: &Path,
        cancel: &CancelToken,
    ) -> SaveResult<OperationReport> {
        self.ensure_ready(cancel)?;
        std::fs::create_dir_all(dest_dir).map_err(|e| SaveError::io(dest_dir, e))?;

        let remote = self.entry_path(entry);
        let dest = dest_dir.to_string_lossy();
        info!("device - Pulling {} -> {}", remote, dest);
        self.run_checked(&["pull", &remote, &dest], cancel)?;

        let mut report = OperationReport::new();
        report.push(ItemOutcome::done(dest_dir.join(entry)));
        Ok(report)
    }

    fn copy_in(&self, src_entry_dir: &Path, cancel: &CancelToken) -> SaveResult<OperationReport> {
        self.ensure_ready(cancel)?;
        if !src_entry_dir.is_dir() {
            return Err(SaveError::io(
                src_entry_dir,
                std::io::Error::new(std::io::ErrorKind::NotFound, "save directory not found"),
            ));
        }

        // push behaves like `cp -r`: only an existing root nests the tree as <root>/<entry>
        self.run_checked(&["shell", "mkdir", "-p", &shell_quote(&self.root)], cancel)?;

        let src = src_entry_dir.to_string_lossy();
        info!("device - Pushing {} -> {}", src, self.root);
        self.run_checked(&["push", &src, &self.root], cancel)?;

        let mut report = OperationReport::new();
        report.push(ItemOutcome::done(src_entry_dir));
        Ok(report)
    }

    fn delete(&self, entry: &str, cancel: &CancelToken) -> SaveResult<OperationReport> {
        self.ensure_ready(cancel)?;

        let remote = self.entry_path(entry);
        let quoted = shell_quote(&remote);
        match self.run_checked(&["shell", "rm", "-rf", &quoted], cancel) {
            Ok(_) => {
                info!("device - Deleted {}", remote);
                let mut report = OperationReport::new();
                report.push(ItemOutcome::done(&remote));
                Ok(report)
            }
            Err(SaveError::Cancelled) => Err(SaveError::Cancelled),
            Err(e) => Err(SaveError::DeletionFailed {
                entry: entry.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}
