//! Full broadband/tonal decomposition of a spectrum.
//!
//! Chains [`estimate_broadband`], [`detect_peaks`], [`resolve_peak_widths`]
//! and [`integrate_spl`]. Every stage returns a new value and the chain
//! holds no state between calls; rerunning with other parameters gives an
//! independent [`Decomposition`].

use crate::broadband::{BroadbandSpectrum, estimate_broadband};
use crate::error::{AnalysisError, Result};
use crate::peak_width::{DEFAULT_RADIUS_POINTS, PeakWidthSet, resolve_peak_widths};
use crate::peaks::{DEFAULT_MARGIN_DB, PeakSet, detect_peaks};
use crate::refine::{PeakFrequency, refine_peak_frequency};
use crate::spectrum::Spectrum;
use crate::spl::{SplResult, integrate_spl};
use crate::units::Units;

/// Default median kernel width, in Hz.
pub const DEFAULT_KERNEL_HZ: f64 = 100.0;

/// Closed frequency interval `[low, high]` in Hz.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyBand {
    /// Lower edge in Hz.
    pub low: f64,
    /// Upper edge in Hz.
    pub high: f64,
}

impl FrequencyBand {
    /// Create a band, checking `low <= high`.
    pub fn new(low: f64, high: f64) -> Result<Self> {
        if low.is_nan() || high.is_nan() || low > high {
            return Err(AnalysisError::invalid_parameter(
                "band",
                format!("invalid frequency band [{low}, {high}]"),
            ));
        }
        Ok(Self { low, high })
    }

    /// Every non-negative frequency.
    pub fn full() -> Self {
        Self {
            low: 0.0,
            high: f64::INFINITY,
        }
    }
}

/// Parameters of every stage of the decomposition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecompositionParams {
    /// Median kernel size.
    pub kernel_size: f64,
    /// Units of `kernel_size`.
    pub kernel_units: Units,
    /// Band searched for peaks.
    pub peak_band: FrequencyBand,
    /// Peak height required above the floor, in dB.
    pub margin_db: f64,
    /// Footprint search radius.
    pub radius: f64,
    /// Units of `radius`.
    pub radius_units: Units,
    /// Integration band of broadband and overall SPL.
    pub spl_band: FrequencyBand,
}

impl Default for DecompositionParams {
    fn default() -> Self {
        Self {
            kernel_size: DEFAULT_KERNEL_HZ,
            kernel_units: Units::Hz,
            peak_band: FrequencyBand::full(),
            margin_db: DEFAULT_MARGIN_DB,
            radius: DEFAULT_RADIUS_POINTS,
            radius_units: Units::Points,
            spl_band: FrequencyBand::full(),
        }
    }
}

/// Results of every stage for one spectrum.
#[derive(Debug, Clone)]
pub struct Decomposition {
    /// Median-filtered floor.
    pub broadband: BroadbandSpectrum,
    /// Detected peaks.
    pub peaks: PeakSet,
    /// Footprints of the detected peaks.
    pub widths: PeakWidthSet,
    /// Integrated levels.
    pub spl: SplResult,
}

impl Decomposition {
    /// Refine the tallest peak in `band` against this decomposition's floor.
    pub fn peak_frequency(&self, spectrum: &Spectrum, band: FrequencyBand) -> Result<PeakFrequency> {
        refine_peak_frequency(spectrum, &self.broadband, band.low, band.high)
    }
}

/// Run the whole chain on `spectrum`.
pub fn decompose(spectrum: &Spectrum, params: &DecompositionParams) -> Result<Decomposition> {
    let broadband = estimate_broadband(spectrum, params.kernel_size, params.kernel_units)?;
    let peaks = detect_peaks(
        spectrum,
        &broadband,
        params.peak_band.low,
        params.peak_band.high,
        params.margin_db,
    )?;
    let widths = resolve_peak_widths(
        spectrum,
        &broadband,
        &peaks,
        params.radius,
        params.radius_units,
    )?;
    let spl = integrate_spl(
        spectrum,
        &broadband,
        &widths,
        params.spl_band.low,
        params.spl_band.high,
    )?;

    #[cfg(feature = "tracing")]
    tracing::debug!(
        channels = spectrum.num_channels(),
        max_peaks = peaks.max_peaks(),
        "decomposition complete"
    );

    Ok(Decomposition {
        broadband,
        peaks,
        widths,
        spl,
    })
}
