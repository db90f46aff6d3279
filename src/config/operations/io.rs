use crate::config::types::SvsmConfig;
use crate::error::{SaveError, SaveResult};
use crate::paths::PATH_SVSM;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::warn;

pub fn settings_path() -> Option<PathBuf> {
    PATH_SVSM.as_ref().map(|p| p.join("settings.json"))
}

pub fn load_cfg() -> SvsmConfig {
    match settings_path() {
        Some(path) => load_cfg_from(&path),
        None => SvsmConfig::default(),
    }
}

/// Read settings from `path`, falling back to defaults when the file is
/// missing or unreadable
pub fn load_cfg_from(path: &Path) -> SvsmConfig {
    if let Ok(file) = File::open(path) {
        match serde_json::from_reader::<_, SvsmConfig>(BufReader::new(file)) {
            Ok(mut config) => {
                config.migrate();
                return config;
            }
            Err(e) => warn!("Ignoring invalid settings file {}: {}", path.display(), e),
        }
    }

    SvsmConfig::default()
}

pub fn save_cfg(config: &SvsmConfig) -> SaveResult<()> {
    let path = settings_path()
        .ok_or_else(|| SaveError::Config("no configuration directory available".to_string()))?;
    save_cfg_to(config, &path)
}

pub fn save_cfg_to(config: &SvsmConfig, path: &Path) -> SaveResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| SaveError::io(parent, e))?;
    }
    let file = File::create(path).map_err(|e| SaveError::io(path, e))?;
    serde_json::to_writer_pretty(file, config).map_err(|e| SaveError::Config(e.to_string()))?;
    Ok(())
}
