//! Settings path resolution
//!
//! Settings live next to the running executable unless `KNOBS_SETTINGS`
//! names a file explicitly.

use std::path::PathBuf;

use super::{ConfigError, ConfigResult};

/// Environment variable naming the settings file
pub const SETTINGS_ENV: &str = "KNOBS_SETTINGS";

/// File name used when no explicit path is given
pub const SETTINGS_FILE_NAME: &str = "knobs.toml";

/// Returns the directory containing the running executable
pub fn settings_dir() -> ConfigResult<PathBuf> {
    let exe = std::env::current_exe().map_err(ConfigError::IoError)?;
    exe.parent()
        .map(PathBuf::from)
        .ok_or(ConfigError::NoSettingsDirectory)
}

/// Returns the default settings path: `<exe dir>/knobs.toml`
pub fn default_settings_path() -> ConfigResult<PathBuf> {
    Ok(settings_dir()?.join(SETTINGS_FILE_NAME))
}

/// Returns the path named by `KNOBS_SETTINGS`, if set and non-empty
pub fn env_settings_path() -> Option<PathBuf> {
    std::env::var_os(SETTINGS_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Returns the settings path to use: `KNOBS_SETTINGS` if set, else the default
pub fn settings_path() -> ConfigResult<PathBuf> {
    match env_settings_path() {
        Some(path) => Ok(path),
        None => default_settings_path(),
    }
}
