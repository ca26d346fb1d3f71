//! Broadband (noise floor) estimation by median filtering.
//!
//! A running median over a window wider than any tonal peak follows the
//! smooth part of the spectrum and ignores narrow peaks, giving an adaptive
//! floor that later stages compare the raw PSD against.

use crate::error::{AnalysisError, Result};
use crate::spectrum::{Spectrum, SpectrumId};
use crate::units::Units;

/// Median-filtered version of a [`Spectrum`], one row per channel.
#[derive(Debug, Clone)]
pub struct BroadbandSpectrum {
    source: SpectrumId,
    kernel_bins: usize,
    values: Vec<Vec<f64>>,
}

impl BroadbandSpectrum {
    /// Broadband PSD of one channel.
    pub fn channel(&self, ch: usize) -> &[f64] {
        &self.values[ch]
    }

    /// All channel rows.
    pub fn channels(&self) -> &[Vec<f64>] {
        &self.values
    }

    /// Number of channels.
    pub fn num_channels(&self) -> usize {
        self.values.len()
    }

    /// Median kernel length in bins (always odd).
    pub fn kernel_bins(&self) -> usize {
        self.kernel_bins
    }

    /// Id of the spectrum this floor was estimated from.
    pub fn source_id(&self) -> SpectrumId {
        self.source
    }

    /// Fail unless this floor belongs to `spectrum`.
    pub(crate) fn check_source(&self, spectrum: &Spectrum) -> Result<()> {
        AnalysisError::check_channels(spectrum.num_channels(), self.num_channels())?;
        if self.source != spectrum.id() {
            return Err(AnalysisError::PrecedingStageMissing { stage: "broadband" });
        }
        Ok(())
    }
}

/// Estimate the broadband component of every channel.
///
/// `kernel_size` is in bins or Hz according to `units`. Hz are converted
/// through the spectrum's resolution and rounded to the nearest odd bin
/// count; a kernel in points must already be odd.
pub fn estimate_broadband(
    spectrum: &Spectrum,
    kernel_size: f64,
    units: Units,
) -> Result<BroadbandSpectrum> {
    let kernel_bins = units.to_bins(kernel_size, spectrum.df())?;
    if kernel_bins % 2 == 0 {
        return Err(AnalysisError::invalid_parameter(
            "kernel_size",
            format!("median kernel must be odd, got {kernel_bins} points"),
        ));
    }

    let values = spectrum
        .channels()
        .iter()
        .map(|row| median_filter(row, kernel_bins))
        .collect();

    #[cfg(feature = "tracing")]
    tracing::debug!(
        channels = spectrum.num_channels(),
        kernel_bins,
        "broadband estimated"
    );

    Ok(BroadbandSpectrum {
        source: spectrum.id(),
        kernel_bins,
        values,
    })
}

/// Running median with an odd window, zero-padded past both ends.
///
/// The output has the same length as `data`.
pub fn median_filter(data: &[f64], kernel: usize) -> Vec<f64> {
    let half = kernel / 2;
    // Every window then holds more than `half` padding zeros
    if half >= data.len() {
        return vec![0.0; data.len()];
    }
    let mut window = Vec::with_capacity(kernel);

    (0..data.len())
        .map(|i| {
            window.clear();
            for j in i as isize - half as isize..=(i + half) as isize {
                let v = if j < 0 {
                    0.0
                } else {
                    data.get(j as usize).copied().unwrap_or(0.0)
                };
                window.push(v);
            }
            let (_, median, _) = window.select_nth_unstable_by(half, f64::total_cmp);
            *median
        })
        .collect()
}
