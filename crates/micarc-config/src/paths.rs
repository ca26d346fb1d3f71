//! Platform-specific paths for configuration.
//!
//! # Directory Structure
//!
//! - **User config**: `~/.config/micarc/` (Linux), `~/Library/Application Support/micarc/` (macOS), `%APPDATA%\micarc\` (Windows)
//! - **Default analysis config**: `analysis.toml` inside the user config directory
//!
//! # Example
//!
//! ```rust,no_run
//! use micarc_config::paths;
//!
//! // Explicit path wins, otherwise the user default if it exists
//! match paths::find_config(None) {
//!     Some(path) => println!("Using config at: {:?}", path),
//!     None => println!("Using built-in defaults"),
//! }
//! ```

use crate::error::{ConfigError, FileAction};
use std::path::{Path, PathBuf};

/// Application name used for directory paths.
const APP_NAME: &str = "micarc";

/// File name of the default analysis configuration.
const CONFIG_FILE: &str = "analysis.toml";

/// Returns the user-specific configuration directory.
///
/// # Platform Paths
///
/// - Linux: `~/.config/micarc/`
/// - macOS: `~/Library/Application Support/micarc/`
/// - Windows: `%APPDATA%\micarc\`
///
/// Returns a fallback path if the config directory cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Path of the default analysis configuration file.
pub fn default_config_path() -> PathBuf {
    user_config_dir().join(CONFIG_FILE)
}

/// Locate the analysis configuration to use.
///
/// An explicit path is returned as given, so a missing file is reported
/// when it is loaded. Without one, the user default is returned if it
/// exists; `None` means built-in defaults.
pub fn find_config(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let default = default_config_path();
    default.is_file().then_some(default)
}

/// Ensure the user config directory exists.
///
/// Creates the directory and any parent directories if they don't exist.
pub fn ensure_user_config_dir() -> Result<PathBuf, ConfigError> {
    let dir = user_config_dir();

    if !dir.exists() {
        std::fs::create_dir_all(&dir)
            .map_err(|e| ConfigError::file(FileAction::CreateDir, &dir, e))?;
    }

    Ok(dir)
}
