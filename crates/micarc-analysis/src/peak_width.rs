//! Peak footprint resolution.
//!
//! The footprint of a peak is the closed bin interval around it bounded by
//! the nearest bins where the raw PSD drops to or below the broadband floor,
//! searched no further than a fixed radius on either side.

use std::collections::HashSet;

use crate::broadband::BroadbandSpectrum;
use crate::error::{AnalysisError, Result};
use crate::peaks::PeakSet;
use crate::spectrum::{Spectrum, SpectrumId};
use crate::units::Units;

/// Default search radius, in points.
pub const DEFAULT_RADIUS_POINTS: f64 = 20.0;

/// Footprint slot of one (channel, peak) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeakExtent {
    /// Closed bin interval `[lower, upper]` occupied by the peak.
    Resolved {
        /// First bin of the peak.
        lower: usize,
        /// Last bin of the peak.
        upper: usize,
    },
    /// The slot had no peak.
    NoPeak,
    /// Same interval as an earlier peak of the channel.
    Duplicate,
}

impl PeakExtent {
    /// Interval bounds when resolved.
    pub fn bounds(&self) -> Option<(usize, usize)> {
        match *self {
            PeakExtent::Resolved { lower, upper } => Some((lower, upper)),
            PeakExtent::NoPeak | PeakExtent::Duplicate => None,
        }
    }

    /// `[lower, upper]`, or `[-1, -1]` for empty and duplicate slots.
    pub fn to_sentinel(&self) -> [i64; 2] {
        self.bounds()
            .map_or([-1, -1], |(lower, upper)| [lower as i64, upper as i64])
    }
}

/// Footprints of every detected peak, shaped like the [`PeakSet`] they came from.
#[derive(Debug, Clone)]
pub struct PeakWidthSet {
    source: SpectrumId,
    radius_bins: usize,
    rows: Vec<Vec<PeakExtent>>,
}

impl PeakWidthSet {
    /// Number of channels.
    pub fn num_channels(&self) -> usize {
        self.rows.len()
    }

    /// Slots of one channel.
    pub fn row(&self, ch: usize) -> &[PeakExtent] {
        &self.rows[ch]
    }

    /// All rows.
    pub fn rows(&self) -> &[Vec<PeakExtent>] {
        &self.rows
    }

    /// Number of footprints of `ch` that survived deduplication.
    pub fn num_resolved(&self, ch: usize) -> usize {
        self.rows[ch]
            .iter()
            .filter(|extent| extent.bounds().is_some())
            .count()
    }

    /// Search radius in bins.
    pub fn radius_bins(&self) -> usize {
        self.radius_bins
    }

    /// Id of the spectrum the widths were resolved in.
    pub fn source_id(&self) -> SpectrumId {
        self.source
    }

    pub(crate) fn check_source(&self, spectrum: &Spectrum) -> Result<()> {
        AnalysisError::check_channels(spectrum.num_channels(), self.num_channels())?;
        if self.source != spectrum.id() {
            return Err(AnalysisError::PrecedingStageMissing { stage: "peak widths" });
        }
        Ok(())
    }
}

/// Resolve the footprint of every peak in `peaks`.
///
/// An interval identical to one already resolved in the same channel is
/// marked [`PeakExtent::Duplicate`] so its energy is only counted once.
pub fn resolve_peak_widths(
    spectrum: &Spectrum,
    broadband: &BroadbandSpectrum,
    peaks: &PeakSet,
    radius: f64,
    units: Units,
) -> Result<PeakWidthSet> {
    broadband.check_source(spectrum)?;
    peaks.check_source(spectrum)?;
    let radius_bins = units.to_bins(radius, spectrum.df())?;

    let rows = peaks
        .rows()
        .iter()
        .enumerate()
        .map(|(ch, slots)| {
            let raw = spectrum.channel(ch);
            let floor = broadband.channel(ch);
            let mut seen = HashSet::new();

            slots
                .iter()
                .map(|slot| match *slot {
                    None => PeakExtent::NoPeak,
                    Some(peak) => {
                        let bounds = peak_bounds(raw, floor, peak, radius_bins);
                        if seen.insert(bounds) {
                            PeakExtent::Resolved {
                                lower: bounds.0,
                                upper: bounds.1,
                            }
                        } else {
                            PeakExtent::Duplicate
                        }
                    }
                })
                .collect()
        })
        .collect();

    #[cfg(feature = "tracing")]
    tracing::debug!(radius_bins, "peak widths resolved");

    Ok(PeakWidthSet {
        source: spectrum.id(),
        radius_bins,
        rows,
    })
}

/// Crossing points of `raw` through `floor` around `peak`.
fn peak_bounds(raw: &[f64], floor: &[f64], peak: usize, radius: usize) -> (usize, usize) {
    let last = raw.len() - 1;
    let below = |i: &usize| raw[*i] <= floor[*i];

    let lower = if peak <= radius {
        0
    } else {
        (peak - radius..peak).rev().find(below).unwrap_or(peak - radius)
    };

    let upper = if peak.saturating_add(radius).saturating_add(1) > raw.len() {
        last
    } else {
        (peak..=peak + radius).find(below).unwrap_or(peak + radius)
    };

    (lower, upper)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadband::estimate_broadband;
    use crate::peaks::detect_peaks;
    use crate::spectrum::PsdParams;

    fn spectrum_with_rows(rows: Vec<Vec<f64>>) -> Spectrum {
        let bins = rows[0].len();
        let params = PsdParams::new((bins - 1) as f64 * 2.0, (bins - 1) * 2);
        Spectrum::with_standard_axis(rows, params).unwrap()
    }

    #[test]
    fn bounds_stop_at_floor_crossings() {
        let raw = [1.0, 1.0, 1.0, 2.0, 4.0, 5.0, 3.0, 2.0, 1.0, 1.0, 1.0, 1.0];
        let floor = [1.0; 12];
        assert_eq!(peak_bounds(&raw, &floor, 5, 4), (2, 8));
    }

    #[test]
    fn bounds_clamp_to_radius_without_crossing() {
        let raw = [2.0; 21];
        let floor = [1.0; 21];
        assert_eq!(peak_bounds(&raw, &floor, 10, 3), (7, 13));
    }

    #[test]
    fn bounds_clamp_to_data_edges() {
        let raw = [2.0; 10];
        let floor = [1.0; 10];
        assert_eq!(peak_bounds(&raw, &floor, 2, 3), (0, 5));
        assert_eq!(peak_bounds(&raw, &floor, 8, 3), (5, 9));
    }

    #[test]
    fn window_ending_on_last_bin_still_scans() {
        // 6 + 3 + 1 == 10 bins: the window reaches the last bin exactly
        let mut raw = [2.0; 10];
        raw[8] = 0.5;
        let floor = [1.0; 10];
        assert_eq!(peak_bounds(&raw, &floor, 6, 3), (3, 8));

        // No crossing: the radius bound coincides with the last bin
        let raw = [2.0; 10];
        assert_eq!(peak_bounds(&raw, &floor, 6, 3), (3, 9));
    }

    #[test]
    fn huge_radius_clamps_to_edges() {
        let raw = [2.0; 10];
        let floor = [1.0; 10];
        assert_eq!(peak_bounds(&raw, &floor, 4, usize::MAX / 2), (0, 9));

        let mut a = vec![1.0; 65];
        a[30] = 9.0;
        let s = spectrum_with_rows(vec![a]);
        let bb = estimate_broadband(&s, 9.0, Units::Points).unwrap();
        let peaks = detect_peaks(&s, &bb, 0.0, 1e9, 3.0).unwrap();
        let widths = resolve_peak_widths(&s, &bb, &peaks, 1e30, Units::Points).unwrap();
        assert_eq!(
            widths.row(0),
            &[PeakExtent::Resolved {
                lower: 0,
                upper: 64
            }]
        );
    }

    #[test]
    fn twin_peaks_share_footprint_once() {
        // Two maxima in one hump: both cross the floor at 18 and 24
        let mut a = vec![1.0; 65];
        for (i, v) in [(19, 4.0), (20, 6.0), (21, 5.0), (22, 6.0), (23, 4.0)] {
            a[i] = v;
        }
        let s = spectrum_with_rows(vec![a]);
        let bb = estimate_broadband(&s, 15.0, Units::Points).unwrap();
        let peaks = detect_peaks(&s, &bb, 0.0, 1e9, 3.0).unwrap();
        assert_eq!(peaks.row(0), &[Some(20), Some(22)]);

        let widths = resolve_peak_widths(&s, &bb, &peaks, 10.0, Units::Points).unwrap();
        assert_eq!(
            widths.row(0),
            &[
                PeakExtent::Resolved {
                    lower: 18,
                    upper: 24
                },
                PeakExtent::Duplicate
            ]
        );
        assert_eq!(widths.row(0)[1].to_sentinel(), [-1, -1]);
        assert_eq!(peaks.peaks(0).count(), 2);
        assert_eq!(widths.num_resolved(0), 1);
    }

    #[test]
    fn empty_slots_propagate() {
        let mut a = vec![1.0; 65];
        a[30] = 9.0;
        let s = spectrum_with_rows(vec![a, vec![1.0; 65]]);
        let bb = estimate_broadband(&s, 9.0, Units::Points).unwrap();
        let peaks = detect_peaks(&s, &bb, 0.0, 1e9, 3.0).unwrap();
        let widths = resolve_peak_widths(&s, &bb, &peaks, 20.0, Units::Points).unwrap();

        assert_eq!(
            widths.row(0),
            &[PeakExtent::Resolved {
                lower: 29,
                upper: 31
            }]
        );
        assert_eq!(widths.row(1), &[PeakExtent::NoPeak]);
    }

    #[test]
    fn peaks_from_other_spectrum_rejected() {
        let a = spectrum_with_rows(vec![vec![1.0; 65]]);
        let b = spectrum_with_rows(vec![vec![1.0; 65]]);
        let bb_a = estimate_broadband(&a, 3.0, Units::Points).unwrap();
        let bb_b = estimate_broadband(&b, 3.0, Units::Points).unwrap();
        let peaks_a = detect_peaks(&a, &bb_a, 0.0, 10.0, 3.0).unwrap();

        assert_eq!(
            resolve_peak_widths(&b, &bb_b, &peaks_a, 5.0, Units::Points).unwrap_err(),
            AnalysisError::PrecedingStageMissing {
                stage: "peak detection"
            }
        );
    }
}
