use crate::error::{SaveError, SaveResult};
use crate::paths::{REMOTE_SAVES_ROOT, default_backup_root, default_local_saves_root};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_BRIDGE_TIMEOUT_SECS: u64 = 120;

/// How to reach the device
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BridgeConfig {
    /// adb executable (name on PATH or absolute path)
    #[serde(default = "default_program")]
    pub program: PathBuf,
    /// Target one device when several are attached (adb -s)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
    /// Hard limit for any single bridge command
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_program() -> PathBuf {
    PathBuf::from("adb")
}

fn default_timeout_secs() -> u64 {
    DEFAULT_BRIDGE_TIMEOUT_SECS
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            serial: None,
            timeout_secs: DEFAULT_BRIDGE_TIMEOUT_SECS,
        }
    }
}

/// Main application configuration
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SvsmConfig {
    /// Override for the PC saves directory (None = <app-data>/StardewValley/Saves)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_saves_root: Option<PathBuf>,
    #[serde(default = "default_remote_root")]
    pub remote_saves_root: String,
    /// Override for the snapshot directory (None = SteamSavesBackup beside the executable)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_root: Option<PathBuf>,
    /// Snapshot every local save when the program starts
    #[serde(default = "default_backup_on_start")]
    pub backup_on_start: bool,
    #[serde(default)]
    pub bridge: BridgeConfig,
}

fn default_remote_root() -> String {
    REMOTE_SAVES_ROOT.to_string()
}

fn default_backup_on_start() -> bool {
    true
}

impl Default for SvsmConfig {
    fn default() -> Self {
        SvsmConfig {
            local_saves_root: None,
            remote_saves_root: default_remote_root(),
            backup_root: None,
            backup_on_start: true,
            bridge: BridgeConfig::default(),
        }
    }
}

impl SvsmConfig {
    /// Repair values that would make the engine unusable
    /// Call this after loading config from disk
    pub fn migrate(&mut self) {
        if self.bridge.timeout_secs == 0 {
            self.bridge.timeout_secs = DEFAULT_BRIDGE_TIMEOUT_SECS;
        }
        if self.remote_saves_root.trim().is_empty() {
            self.remote_saves_root = default_remote_root();
        }
    }

    pub fn resolve_local_root(&self) -> SaveResult<PathBuf> {
        match &self.local_saves_root {
            Some(path) => Ok(path.clone()),
            None => default_local_saves_root().ok_or_else(|| {
                SaveError::Config(
                    "no application-data directory on this platform; set local_saves_root"
                        .to_string(),
                )
            }),
        }
    }

    pub fn resolve_backup_root(&self) -> PathBuf {
        self.backup_root.clone().unwrap_or_else(default_backup_root)
    }
}
