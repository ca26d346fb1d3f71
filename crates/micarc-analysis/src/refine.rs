//! Sub-bin frequency estimate of the dominant tone.

use crate::broadband::BroadbandSpectrum;
use crate::error::Result;
use crate::peaks::{DEFAULT_MARGIN_DB, detect_peaks};
use crate::spectrum::Spectrum;

/// Bins on each side of the tallest peak used for the centroid.
pub const CENTROID_RADIUS: usize = 2;

/// Refined frequency of the tallest peak.
#[derive(Debug, Clone, PartialEq)]
pub struct PeakFrequency {
    /// Centroid frequency per channel, `None` where no peak was found.
    pub per_channel: Vec<Option<f64>>,
    /// Mean over channels that found a peak.
    pub mean: Option<f64>,
}

/// Estimate the frequency of the tallest peak in `[f_low, f_high]`.
///
/// Peaks are detected 3 dB above the floor. In each channel the tallest one
/// is refined by the spectral centroid of the bins within
/// [`CENTROID_RADIUS`] of it (clipped to the spectrum), and the estimates
/// are averaged across channels.
pub fn refine_peak_frequency(
    spectrum: &Spectrum,
    broadband: &BroadbandSpectrum,
    f_low: f64,
    f_high: f64,
) -> Result<PeakFrequency> {
    let peaks = detect_peaks(spectrum, broadband, f_low, f_high, DEFAULT_MARGIN_DB)?;
    let freq = spectrum.freq();
    let last = spectrum.num_bins() - 1;

    let per_channel: Vec<Option<f64>> = (0..spectrum.num_channels())
        .map(|ch| {
            let psd = spectrum.channel(ch);
            let tallest = peaks.peaks(ch).reduce(|best, i| if psd[i] > psd[best] { i } else { best })?;
            let range = tallest.saturating_sub(CENTROID_RADIUS)..=(tallest + CENTROID_RADIUS).min(last);
            Some(spectral_centroid(&freq[range.clone()], &psd[range]))
        })
        .collect();

    let found: Vec<f64> = per_channel.iter().flatten().copied().collect();
    let mean = if found.is_empty() {
        None
    } else {
        Some(found.iter().sum::<f64>() / found.len() as f64)
    };

    #[cfg(feature = "tracing")]
    tracing::debug!(channels_with_peak = found.len(), ?mean, "peak frequency refined");

    Ok(PeakFrequency { per_channel, mean })
}

/// Power-weighted mean frequency, `Σ f·p / Σ p`.
///
/// Falls back to the middle frequency when the weights sum to zero.
pub fn spectral_centroid(freq: &[f64], psd: &[f64]) -> f64 {
    let weighted_sum: f64 = freq.iter().zip(psd).map(|(f, p)| f * p).sum();
    let power_sum: f64 = psd.iter().sum();

    if power_sum > 0.0 {
        weighted_sum / power_sum
    } else {
        freq.get(freq.len() / 2).copied().unwrap_or(0.0)
    }
}
