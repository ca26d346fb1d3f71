//! Analysis configuration file format and operations.

use micarc_analysis::{
    ButterworthFilter, DecompositionParams, FilterKind, FrequencyBand, PsdParams, Units, Window,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConfigError, FileAction};
use crate::paths::find_config;

/// Settings of every analysis stage, from raw time series to SPL.
///
/// Every field has a default, so a file only needs the values it changes.
///
/// # TOML Format
///
/// ```toml
/// [psd]
/// ndft = 8192
/// overlap = 4096
/// window = "hann"
/// skip_seconds = 1.0
///
/// [filter]
/// kind = "highpass"
/// order = 3
/// cutoff_hz = 50.0
///
/// [broadband]
/// kernel_size = 100.0
/// units = "Hz"
///
/// [peaks]
/// f_low = 50.0
/// f_high = 5000.0
/// margin_db = 3.0
/// radius = 20.0
/// radius_units = "points"
///
/// [spl]
/// f_low = 50.0
/// f_high = 10000.0
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Welch PSD estimation.
    pub psd: PsdConfig,

    /// Optional zero-phase filter applied before the PSD.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterConfig>,

    /// Median-filter broadband estimate.
    pub broadband: BroadbandConfig,

    /// Peak detection and footprint search.
    pub peaks: PeaksConfig,

    /// Broadband and overall SPL integration band.
    pub spl: SplConfig,
}

/// `[psd]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PsdConfig {
    /// Segment length in samples.
    pub ndft: usize,
    /// Segment overlap in samples; half a segment when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlap: Option<usize>,
    /// Window name (`hann`, `hamming`, `blackman`, `rectangular`...).
    pub window: String,
    /// Initial stretch of the recording left out of the estimate, in seconds.
    pub skip_seconds: f64,
}

impl Default for PsdConfig {
    fn default() -> Self {
        Self {
            ndft: 8192,
            overlap: None,
            window: "hann".to_string(),
            skip_seconds: 0.0,
        }
    }
}

/// `[filter]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FilterConfig {
    /// `highpass` or `lowpass`.
    pub kind: String,
    /// Butterworth order.
    pub order: usize,
    /// Cutoff frequency in Hz.
    pub cutoff_hz: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            kind: "highpass".to_string(),
            order: 3,
            cutoff_hz: 50.0,
        }
    }
}

/// `[broadband]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BroadbandConfig {
    /// Median kernel size.
    pub kernel_size: f64,
    /// `Hz` or `points`.
    pub units: String,
}

impl Default for BroadbandConfig {
    fn default() -> Self {
        Self {
            kernel_size: 100.0,
            units: "Hz".to_string(),
        }
    }
}

/// `[peaks]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PeaksConfig {
    /// Lower edge of the search band in Hz.
    pub f_low: f64,
    /// Upper edge of the search band in Hz; Nyquist when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub f_high: Option<f64>,
    /// Required height above the broadband floor in dB.
    pub margin_db: f64,
    /// Footprint search radius.
    pub radius: f64,
    /// `points` or `Hz`.
    pub radius_units: String,
}

impl Default for PeaksConfig {
    fn default() -> Self {
        Self {
            f_low: 0.0,
            f_high: None,
            margin_db: 3.0,
            radius: 20.0,
            radius_units: "points".to_string(),
        }
    }
}

/// `[spl]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SplConfig {
    /// Lower edge of the integration band in Hz.
    pub f_low: f64,
    /// Upper edge of the integration band in Hz; Nyquist when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub f_high: Option<f64>,
}

fn band(f_low: f64, f_high: Option<f64>) -> Result<FrequencyBand, ConfigError> {
    Ok(FrequencyBand::new(f_low, f_high.unwrap_or(f64::INFINITY))?)
}

impl AnalysisConfig {
    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::file(FileAction::Read, path, e))?;
        Self::from_toml(&content)
    }

    /// Load a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Load the explicit file, else the user default, else built-in defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match find_config(explicit) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Save the configuration to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::file(FileAction::CreateDir, parent, e))?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .map_err(|e| ConfigError::file(FileAction::Write, path, e))?;
        Ok(())
    }

    /// Convert the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check the decomposition settings and convert them to typed parameters.
    ///
    /// Units strings are parsed here, so an unknown unit surfaces as
    /// [`micarc_analysis::AnalysisError::InvalidUnits`].
    pub fn validate(&self) -> Result<DecompositionParams, ConfigError> {
        let kernel_units: Units = self.broadband.units.parse()?;
        let radius_units: Units = self.peaks.radius_units.parse()?;

        if !(self.broadband.kernel_size.is_finite() && self.broadband.kernel_size > 0.0) {
            return Err(ConfigError::invalid(
                "broadband",
                "kernel_size",
                format!("must be positive, got {}", self.broadband.kernel_size),
            ));
        }
        if !(self.peaks.radius.is_finite() && self.peaks.radius > 0.0) {
            return Err(ConfigError::invalid(
                "peaks",
                "radius",
                format!("must be positive, got {}", self.peaks.radius),
            ));
        }
        if !self.peaks.margin_db.is_finite() {
            return Err(ConfigError::invalid(
                "peaks",
                "margin_db",
                format!("must be finite, got {}", self.peaks.margin_db),
            ));
        }

        Ok(DecompositionParams {
            kernel_size: self.broadband.kernel_size,
            kernel_units,
            peak_band: band(self.peaks.f_low, self.peaks.f_high)?,
            margin_db: self.peaks.margin_db,
            radius: self.peaks.radius,
            radius_units,
            spl_band: band(self.spl.f_low, self.spl.f_high)?,
        })
    }

    /// Welch parameters for a recording sampled at `sample_rate`.
    pub fn psd_params(&self, sample_rate: f64) -> Result<PsdParams, ConfigError> {
        let psd = &self.psd;
        if psd.ndft == 0 {
            return Err(ConfigError::invalid("psd", "ndft", "must be non-zero"));
        }
        let overlap = psd.overlap.unwrap_or(psd.ndft / 2);
        if overlap >= psd.ndft {
            return Err(ConfigError::invalid(
                "psd",
                "overlap",
                format!("{overlap} must be smaller than ndft {}", psd.ndft),
            ));
        }
        if !(psd.skip_seconds.is_finite() && psd.skip_seconds >= 0.0) {
            return Err(ConfigError::invalid(
                "psd",
                "skip_seconds",
                format!("must be non-negative, got {}", psd.skip_seconds),
            ));
        }
        let window: Window = psd.window.parse()?;

        Ok(PsdParams::new(sample_rate, psd.ndft)
            .with_overlap(overlap)
            .with_window(window))
    }

    /// The configured pre-filter for `sample_rate`, if any.
    pub fn build_filter(&self, sample_rate: f64) -> Result<Option<ButterworthFilter>, ConfigError> {
        let Some(filter) = &self.filter else {
            return Ok(None);
        };
        let kind: FilterKind = filter.kind.parse()?;
        Ok(Some(ButterworthFilter::new(
            kind,
            filter.order,
            filter.cutoff_hz,
            sample_rate,
        )?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use micarc_analysis::AnalysisError;

    #[test]
    fn test_empty_toml_is_default() {
        let config = AnalysisConfig::from_toml("").unwrap();
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(config.psd.ndft, 8192);
        assert!(config.filter.is_none());
    }

    #[test]
    fn test_defaults_validate() {
        let params = AnalysisConfig::default().validate().unwrap();
        assert_eq!(params, DecompositionParams::default());
    }

    #[test]
    fn test_partial_sections() {
        let toml = r#"
[peaks]
f_low = 100.0
f_high = 2000.0

[filter]
cutoff_hz = 20.0
"#;
        let config = AnalysisConfig::from_toml(toml).unwrap();
        assert_eq!(config.peaks.margin_db, 3.0);
        assert_eq!(config.peaks.radius_units, "points");

        let filter = config.filter.as_ref().unwrap();
        assert_eq!(filter.kind, "highpass");
        assert_eq!(filter.order, 3);
        assert_eq!(filter.cutoff_hz, 20.0);

        let params = config.validate().unwrap();
        assert_eq!(params.peak_band, FrequencyBand::new(100.0, 2000.0).unwrap());
        assert_eq!(params.spl_band.high, f64::INFINITY);
    }

    #[test]
    fn test_unknown_units_rejected() {
        let mut config = AnalysisConfig::default();
        config.broadband.units = "octaves".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Analysis(AnalysisError::InvalidUnits(ref s))) if s == "octaves"
        ));
    }

    #[test]
    fn test_inverted_band_rejected() {
        let mut config = AnalysisConfig::default();
        config.spl.f_low = 500.0;
        config.spl.f_high = Some(100.0);
        assert!(matches!(config.validate(), Err(ConfigError::Analysis(_))));
    }

    #[test]
    fn test_psd_params() {
        let config = AnalysisConfig::default();
        let params = config.psd_params(50000.0).unwrap();
        assert_eq!(params.ndft, 8192);
        assert_eq!(params.overlap, 4096);
        assert_eq!(params.window, Window::Hann);

        let mut config = AnalysisConfig::default();
        config.psd.overlap = Some(8192);
        assert!(matches!(
            config.psd_params(50000.0),
            Err(ConfigError::InvalidParameter { section: "psd", param: "overlap", .. })
        ));

        config.psd.overlap = None;
        config.psd.window = "triangle".to_string();
        assert!(matches!(config.psd_params(50000.0), Err(ConfigError::Analysis(_))));
    }

    #[test]
    fn test_build_filter() {
        let mut config = AnalysisConfig::default();
        assert!(config.build_filter(48000.0).unwrap().is_none());

        config.filter = Some(FilterConfig {
            kind: "lowpass".to_string(),
            order: 4,
            cutoff_hz: 1000.0,
        });
        let filter = config.build_filter(48000.0).unwrap().unwrap();
        assert_eq!(filter.kind(), FilterKind::Lowpass);
        assert_eq!(filter.order(), 4);

        // cutoff above Nyquist
        assert!(config.build_filter(1500.0).is_err());
    }

    #[test]
    fn test_roundtrip() {
        let mut original = AnalysisConfig::default();
        original.psd.ndft = 16384;
        original.psd.skip_seconds = 2.0;
        original.filter = Some(FilterConfig::default());
        original.peaks.f_high = Some(5000.0);

        let toml = original.to_toml().unwrap();
        assert!(toml.contains("[filter]"));
        assert!(toml.contains("ndft = 16384"));
        let parsed = AnalysisConfig::from_toml(&toml).unwrap();
        assert_eq!(parsed, original);
    }
}
