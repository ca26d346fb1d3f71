//! Tonal peak detection against the broadband floor.
//!
//! A bin is a peak when it is a local maximum of the raw PSD inside the
//! search band and its height exceeds `broadband * 10^(margin_db / 10)` at
//! that same bin. The threshold follows the floor, so a quiet tone in a
//! quiet region is found while a loud hump of broadband noise is not.

use std::ops::Range;

use crate::broadband::BroadbandSpectrum;
use crate::error::{AnalysisError, Result};
use crate::spectrum::{Spectrum, SpectrumId};

/// Default peak margin above the broadband floor, in dB.
pub const DEFAULT_MARGIN_DB: f64 = 3.0;

/// Detected peaks of every channel as a rectangular table.
///
/// Each row holds that channel's peaks in ascending bin order followed by
/// `None` padding up to the largest peak count over all channels. Indices
/// are global bin indices into the spectrum.
#[derive(Debug, Clone)]
pub struct PeakSet {
    source: SpectrumId,
    band: Range<usize>,
    rows: Vec<Vec<Option<usize>>>,
}

impl PeakSet {
    /// Number of channels.
    pub fn num_channels(&self) -> usize {
        self.rows.len()
    }

    /// Width of the table: the largest peak count found in any channel.
    pub fn max_peaks(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Padded slots of one channel.
    pub fn row(&self, ch: usize) -> &[Option<usize>] {
        &self.rows[ch]
    }

    /// All padded rows.
    pub fn rows(&self) -> &[Vec<Option<usize>>] {
        &self.rows
    }

    /// Peak bins actually found in one channel.
    pub fn peaks(&self, ch: usize) -> impl Iterator<Item = usize> + '_ {
        self.rows[ch].iter().flatten().copied()
    }

    /// Bin range that was searched.
    pub fn band(&self) -> Range<usize> {
        self.band.clone()
    }

    /// Id of the spectrum the peaks were found in.
    pub fn source_id(&self) -> SpectrumId {
        self.source
    }

    /// Rows with `-1` marking empty slots, for array-oriented consumers.
    pub fn to_sentinel_rows(&self) -> Vec<Vec<i64>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|p| p.map_or(-1, |i| i as i64)).collect())
            .collect()
    }

    pub(crate) fn check_source(&self, spectrum: &Spectrum) -> Result<()> {
        AnalysisError::check_channels(spectrum.num_channels(), self.num_channels())?;
        if self.source != spectrum.id() {
            return Err(AnalysisError::PrecedingStageMissing { stage: "peak detection" });
        }
        Ok(())
    }
}

/// Find tonal peaks in `[f_low, f_high]` rising `margin_db` above the floor.
pub fn detect_peaks(
    spectrum: &Spectrum,
    broadband: &BroadbandSpectrum,
    f_low: f64,
    f_high: f64,
    margin_db: f64,
) -> Result<PeakSet> {
    broadband.check_source(spectrum)?;
    if !margin_db.is_finite() {
        return Err(AnalysisError::invalid_parameter(
            "margin_db",
            format!("must be finite, got {margin_db}"),
        ));
    }

    let band = spectrum.band(f_low, f_high)?;
    let gain = 10f64.powf(margin_db / 10.0);

    let mut rows: Vec<Vec<Option<usize>>> = (0..spectrum.num_channels())
        .map(|ch| {
            let raw = spectrum.channel(ch);
            let floor = broadband.channel(ch);
            local_maxima(&raw[band.clone()])
                .into_iter()
                .map(|i| i + band.start)
                .filter(|&i| raw[i] > floor[i] * gain)
                .map(Some)
                .collect()
        })
        .collect();

    let max_peaks = rows.iter().map(Vec::len).max().unwrap_or(0);
    for row in &mut rows {
        row.resize(max_peaks, None);
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        band_start = band.start,
        band_end = band.end,
        margin_db,
        max_peaks,
        "peaks detected"
    );

    Ok(PeakSet {
        source: spectrum.id(),
        band,
        rows,
    })
}

/// Indices of local maxima of `x`.
///
/// A maximum is strictly higher than its left neighbour and than the first
/// differing sample to its right. Flat tops are reported at their middle
/// sample (rounding down). The first and last samples are never maxima.
pub fn local_maxima(x: &[f64]) -> Vec<usize> {
    let mut maxima = Vec::new();
    if x.len() < 3 {
        return maxima;
    }
    let last = x.len() - 1;

    let mut i = 1;
    while i < last {
        if x[i - 1] < x[i] {
            let mut ahead = i + 1;
            while ahead < last && x[ahead] == x[i] {
                ahead += 1;
            }
            if x[ahead] < x[i] {
                maxima.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    maxima
}
