//! Sound pressure level integration.
//!
//! PSDs are in Pa²/Hz. Integrating over a band (sum times `df`) gives a
//! mean-square pressure, expressed as SPL in dB re [`P_REF`].

use crate::broadband::BroadbandSpectrum;
use crate::error::{AnalysisError, Result};
use crate::peak_width::PeakWidthSet;
use crate::spectrum::Spectrum;

/// Reference RMS pressure for SPL in air, 20 µPa.
pub const P_REF: f64 = 20e-6;

/// Convert a mean-square pressure (Pa²) to dB re [`P_REF`].
///
/// Zero maps to negative infinity.
pub fn mean_square_to_spl(mean_square: f64) -> f64 {
    10.0 * (mean_square / (P_REF * P_REF)).log10()
}

/// Convert SPL in dB re [`P_REF`] back to mean-square pressure (Pa²).
pub fn spl_to_mean_square(spl: f64) -> f64 {
    P_REF * P_REF * 10f64.powf(spl / 10.0)
}

/// Broadband SPL of every channel over `[f_low, f_high]`.
pub fn broadband_spl(
    spectrum: &Spectrum,
    broadband: &BroadbandSpectrum,
    f_low: f64,
    f_high: f64,
) -> Result<Vec<f64>> {
    broadband.check_source(spectrum)?;
    band_spl(spectrum, broadband.channels(), f_low, f_high)
}

/// Overall SPL of every channel over `[f_low, f_high]`, from the raw PSD.
pub fn overall_spl(spectrum: &Spectrum, f_low: f64, f_high: f64) -> Result<Vec<f64>> {
    band_spl(spectrum, spectrum.channels(), f_low, f_high)
}

fn band_spl(spectrum: &Spectrum, rows: &[Vec<f64>], f_low: f64, f_high: f64) -> Result<Vec<f64>> {
    let band = spectrum.band(f_low, f_high)?;
    let df = spectrum.df();
    Ok(rows
        .iter()
        .map(|row| mean_square_to_spl(row[band.clone()].iter().sum::<f64>() * df))
        .collect())
}

/// SPL of each resolved peak, shaped like the [`PeakWidthSet`].
#[derive(Debug, Clone, PartialEq)]
pub struct PeakSplSet {
    rows: Vec<Vec<Option<f64>>>,
}

impl PeakSplSet {
    /// Build from per-channel rows of optional levels.
    pub fn from_rows(rows: Vec<Vec<Option<f64>>>) -> Self {
        Self { rows }
    }

    /// Number of channels.
    pub fn num_channels(&self) -> usize {
        self.rows.len()
    }

    /// Slots of one channel.
    pub fn row(&self, ch: usize) -> &[Option<f64>] {
        &self.rows[ch]
    }

    /// All rows.
    pub fn rows(&self) -> &[Vec<Option<f64>>] {
        &self.rows
    }

    /// Rows with NaN in empty slots.
    pub fn to_nan_rows(&self) -> Vec<Vec<f64>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|v| v.unwrap_or(f64::NAN)).collect())
            .collect()
    }
}

/// Integrate the tonal energy of every resolved peak.
///
/// The floor is subtracted bin by bin over the closed footprint and
/// negative differences count as zero, so the level never exceeds what the
/// raw PSD holds above the floor. A footprint with no energy above the
/// floor gives negative infinity.
pub fn peak_spl(
    spectrum: &Spectrum,
    broadband: &BroadbandSpectrum,
    widths: &PeakWidthSet,
) -> Result<PeakSplSet> {
    broadband.check_source(spectrum)?;
    widths.check_source(spectrum)?;
    let df = spectrum.df();

    let rows = widths
        .rows()
        .iter()
        .enumerate()
        .map(|(ch, slots)| {
            let raw = spectrum.channel(ch);
            let floor = broadband.channel(ch);
            slots
                .iter()
                .map(|slot| {
                    slot.bounds().map(|(lower, upper)| {
                        let tonal: f64 = (lower..=upper)
                            .map(|i| (raw[i] - floor[i]).max(0.0))
                            .sum();
                        mean_square_to_spl(tonal * df)
                    })
                })
                .collect()
        })
        .collect();

    Ok(PeakSplSet { rows })
}

/// Energetic sum of each channel's peak levels.
///
/// Channels without any resolved peak have zero tonal energy, reported as
/// negative infinity.
pub fn tonal_spl(peaks: &PeakSplSet) -> Vec<f64> {
    peaks
        .rows()
        .iter()
        .map(|row| mean_square_to_spl(row.iter().flatten().map(|&spl| spl_to_mean_square(spl)).sum()))
        .collect()
}

/// All SPL figures of one decomposition.
#[derive(Debug, Clone, PartialEq)]
pub struct SplResult {
    /// Broadband SPL per channel.
    pub broadband: Vec<f64>,
    /// Overall SPL per channel.
    pub overall: Vec<f64>,
    /// SPL per (channel, peak) slot.
    pub peaks: PeakSplSet,
    /// Tonal SPL per channel.
    pub tonal: Vec<f64>,
}

/// Compute broadband, overall, per-peak and tonal SPL in one pass.
///
/// `[f_low, f_high]` is the integration band of the broadband and overall
/// levels; peak levels use each peak's own footprint.
pub fn integrate_spl(
    spectrum: &Spectrum,
    broadband: &BroadbandSpectrum,
    widths: &PeakWidthSet,
    f_low: f64,
    f_high: f64,
) -> Result<SplResult> {
    let peaks = peak_spl(spectrum, broadband, widths)?;
    AnalysisError::check_channels(spectrum.num_channels(), peaks.num_channels())?;
    let tonal = tonal_spl(&peaks);

    Ok(SplResult {
        broadband: broadband_spl(spectrum, broadband, f_low, f_high)?,
        overall: overall_spl(spectrum, f_low, f_high)?,
        peaks,
        tonal,
    })
}
