use std::env;
use std::path::PathBuf;
use std::sync::LazyLock;

/// Saves directory on the device, as seen through `adb shell`
pub const REMOTE_SAVES_ROOT: &str =
    "/storage/emulated/0/Android/data/com.chucklefish.stardewvalley/files/Saves";

/// Saves directory relative to the platform's application-data directory
pub const LOCAL_SAVES_SUBPATH: &str = "StardewValley/Saves";

pub const BACKUP_DIR_NAME: &str = "SteamSavesBackup";

/// Roaming AppData on Windows, ~/.config on Linux
pub static PATH_APPDATA: LazyLock<Option<PathBuf>> = LazyLock::new(dirs::config_dir);

/// Where settings.json lives
pub static PATH_SVSM: LazyLock<Option<PathBuf>> =
    LazyLock::new(|| PATH_APPDATA.as_ref().map(|p| p.join("svsm")));

pub fn default_local_saves_root() -> Option<PathBuf> {
    PATH_APPDATA.as_ref().map(|p| p.join(LOCAL_SAVES_SUBPATH))
}

/// `SteamSavesBackup` beside the running executable, or the working directory
/// when the executable path cannot be resolved
pub fn default_backup_root() -> PathBuf {
    let base = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.to_path_buf()))
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    base.join(BACKUP_DIR_NAME)
}
