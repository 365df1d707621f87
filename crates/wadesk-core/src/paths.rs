//! Path resolution utilities.

use crate::env::{self, vars};
use crate::error::ConfigError;
use std::path::PathBuf;

/// Get the wadesk base directory (`~/.wadesk`, or `$WADESK_HOME`).
pub fn base_dir() -> Result<PathBuf, ConfigError> {
    if let Some(home) = env::get_var(vars::WADESK_HOME) {
        return Ok(PathBuf::from(home));
    }
    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
    Ok(home.join(".wadesk"))
}

/// Get the main config file path (`~/.wadesk/wadesk.json5`).
pub fn config_file() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("wadesk.json5"))
}

/// Get the default SQLite database path (`~/.wadesk/wadesk.db`).
pub fn database_file() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("wadesk.db"))
}
