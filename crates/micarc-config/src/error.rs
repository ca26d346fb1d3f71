//! Error types for configuration operations.

use micarc_analysis::AnalysisError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Filesystem action that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
    /// Reading a config file.
    Read,
    /// Writing a config file.
    Write,
    /// Creating the directory that holds a config file.
    CreateDir,
}

impl fmt::Display for FileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FileAction::Read => "read",
            FileAction::Write => "write",
            FileAction::CreateDir => "create directory",
        })
    }
}

/// Errors raised while loading, saving or validating an analysis config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A filesystem operation on a config path failed.
    #[error("cannot {action} '{}': {source}", path.display())]
    File {
        /// What was being attempted.
        action: FileAction,
        /// Path involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for an analysis config.
    #[error("malformed analysis config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be encoded as TOML.
    #[error("cannot encode analysis config: {0}")]
    Encode(#[from] toml::ser::Error),

    /// A value is out of range for its section.
    #[error("invalid value for '{section}.{param}': {reason}")]
    InvalidParameter {
        /// TOML section holding the value.
        section: &'static str,
        /// Key within the section.
        param: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The analysis library rejected a value (unknown units, window...).
    #[error("invalid analysis settings: {0}")]
    Analysis(#[from] AnalysisError),
}

impl ConfigError {
    pub(crate) fn file(action: FileAction, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::File {
            action,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid(
        section: &'static str,
        param: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        ConfigError::InvalidParameter {
            section,
            param,
            reason: reason.into(),
        }
    }
}
