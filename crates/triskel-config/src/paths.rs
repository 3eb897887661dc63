//! Platform-specific configuration paths.
//!
//! - Linux: `~/.config/triskel/config.toml`
//! - macOS: `~/Library/Application Support/triskel/config.toml`
//! - Windows: `%APPDATA%\triskel\config.toml`

use std::path::PathBuf;

/// Application name used for directory paths.
const APP_NAME: &str = "triskel";

/// File name of the user configuration.
const CONFIG_FILE: &str = "config.toml";

/// Returns the user-specific configuration directory.
///
/// Falls back to the current directory if the platform config directory
/// cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Path of the user configuration file.
pub fn config_file() -> PathBuf {
    user_config_dir().join(CONFIG_FILE)
}

/// Ensure the user configuration directory exists.
pub fn ensure_user_config_dir() -> Result<PathBuf, crate::ConfigError> {
    let dir = user_config_dir();

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| crate::ConfigError::create_dir(&dir, e))?;
    }

    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_file_lives_in_app_dir() {
        let file = config_file();
        assert!(file.ends_with("triskel/config.toml"));
        assert_eq!(file.parent(), Some(user_config_dir().as_path()));
    }
}
