//! Where textarea-core keeps its config file and logs
//!
//! The root is `$XDG_CONFIG_HOME/textarea-core` (falling back to
//! `~/.config/textarea-core`) on Unix and macOS, `%APPDATA%\textarea-core`
//! on Windows. `config.yaml` and the `logs/` directory sit directly under it.

use std::ffi::OsString;
use std::path::PathBuf;

const APP_DIR: &str = "textarea-core";
const CONFIG_FILE: &str = "config.yaml";
const LOGS_DIR: &str = "logs";

/// Prefix of the daily rotated log files
pub const LOG_FILE_PREFIX: &str = "textarea.log";

#[cfg(target_os = "windows")]
const BASE_VAR: &str = "APPDATA";
#[cfg(not(target_os = "windows"))]
const BASE_VAR: &str = "XDG_CONFIG_HOME";

/// Resolve the app root from the platform base variable and the home dir.
/// An unset or empty base falls back to `<home>/.config`; Windows has no
/// fallback.
fn root_from(base: Option<OsString>, home: Option<PathBuf>) -> Option<PathBuf> {
    let base = base.filter(|b| !b.is_empty()).map(PathBuf::from);
    let base = if cfg!(target_os = "windows") {
        base
    } else {
        base.or_else(|| home.map(|h| h.join(".config")))
    };
    base.map(|b| b.join(APP_DIR))
}

pub fn config_dir() -> Option<PathBuf> {
    root_from(std::env::var_os(BASE_VAR), dirs::home_dir())
}

pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_FILE))
}

pub fn logs_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(LOGS_DIR))
}

/// Create the logs directory if needed and return it
pub fn ensure_logs_dir() -> Result<PathBuf, String> {
    let logs = logs_dir().ok_or_else(|| "No config directory available".to_string())?;
    std::fs::create_dir_all(&logs)
        .map_err(|e| format!("Failed to create directory {}: {}", logs.display(), e))?;
    Ok(logs)
}
