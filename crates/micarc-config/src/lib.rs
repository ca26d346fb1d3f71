//! Analysis configuration for MicArc.
//!
//! Loads and saves the TOML file that holds every analysis setting, from
//! the Welch segment length to the SPL integration band, and turns it into
//! the typed parameters of `micarc-analysis`.
//!
//! # Features
//!
//! - **Config files**: [`AnalysisConfig`] with `[psd]`, `[filter]`,
//!   `[broadband]`, `[peaks]` and `[spl]` sections, all defaulted
//! - **Validation**: [`AnalysisConfig::validate`] parses units strings and
//!   checks bands into [`micarc_analysis::DecompositionParams`]
//! - **Paths**: Platform-specific config directory and default file
//!
//! # Example
//!
//! ```rust,no_run
//! use micarc_config::{AnalysisConfig, default_config_path};
//!
//! // Load the user default, or built-in settings if there is none
//! let config = AnalysisConfig::resolve(None).unwrap();
//! let params = config.validate().unwrap();
//! let psd = config.psd_params(50000.0).unwrap();
//!
//! // Tweak and save
//! let mut config = config;
//! config.peaks.f_high = Some(5000.0);
//! config.save(default_config_path()).unwrap();
//! ```

mod analysis_config;
mod error;

/// Platform-specific paths for configuration.
pub mod paths;

pub use analysis_config::{
    AnalysisConfig, BroadbandConfig, FilterConfig, PeaksConfig, PsdConfig, SplConfig,
};
pub use error::{ConfigError, FileAction};
pub use paths::{default_config_path, ensure_user_config_dir, find_config, user_config_dir};
