//! Property-based tests for the decomposition stages.
//!
//! Random non-negative spectra go through every stage and the structural
//! guarantees of each result are checked: shapes, odd kernels, interval
//! bounds and the absence of double-counted footprints.

use std::collections::HashSet;

use micarc_analysis::{
    MAX_BINS, PeakExtent, PsdParams, Spectrum, Units, detect_peaks, estimate_broadband,
    median_filter, peak_spl, resolve_peak_widths, round_to_nearest_odd,
};
use proptest::prelude::*;

/// 1-4 channels of equal length, 8-200 bins, values in [0, 1).
fn spectrum_rows() -> impl Strategy<Value = Vec<Vec<f64>>> {
    (1usize..=4, 8usize..200).prop_flat_map(|(channels, bins)| {
        prop::collection::vec(prop::collection::vec(0.0f64..1.0, bins), channels)
    })
}

/// Spectrum with df = 1 Hz, so bins and Hz coincide.
fn unit_spectrum(rows: Vec<Vec<f64>>) -> Spectrum {
    let ndft = (rows[0].len() - 1) * 2;
    Spectrum::with_standard_axis(rows, PsdParams::new(ndft as f64, ndft)).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// A kernel given in Hz always becomes an odd bin count of at least 1.
    #[test]
    fn hz_kernel_is_odd_and_positive(
        size in 0.01f64..10000.0,
        df in 0.01f64..100.0,
    ) {
        let bins = Units::Hz.to_bins(size, df).unwrap();
        prop_assert!(bins >= 1);
        prop_assert_eq!(bins % 2, 1, "size={} df={} gave {}", size, df, bins);
        prop_assert_eq!(bins, round_to_nearest_odd(size / df));
    }

    /// Any positive size and resolution, however extreme, gives an odd
    /// bin count without overflowing.
    #[test]
    fn hz_kernel_is_odd_for_any_magnitude(
        size in prop::num::f64::POSITIVE | prop::num::f64::NORMAL,
        df in prop::num::f64::POSITIVE | prop::num::f64::NORMAL,
    ) {
        prop_assume!(size.is_finite() && size > 0.0 && df.is_finite() && df > 0.0);
        let bins = Units::Hz.to_bins(size, df).unwrap();
        prop_assert!((1..=MAX_BINS).contains(&bins));
        prop_assert_eq!(bins % 2, 1, "size={} df={} gave {}", size, df, bins);
    }

    /// A radius of any size keeps every footprint inside the spectrum.
    #[test]
    fn huge_radius_stays_in_bounds(
        rows in spectrum_rows(),
        radius in 1.0f64..f64::MAX,
    ) {
        let s = unit_spectrum(rows);
        let bb = estimate_broadband(&s, 5.0, Units::Points).unwrap();
        let peaks = detect_peaks(&s, &bb, 0.0, f64::INFINITY, 0.0).unwrap();
        let widths = resolve_peak_widths(&s, &bb, &peaks, radius, Units::Points).unwrap();
        for row in widths.rows() {
            for extent in row {
                if let Some((lo, hi)) = extent.bounds() {
                    prop_assert!(lo <= hi && hi < s.num_bins());
                }
            }
        }
    }

    /// The floor has the shape of the spectrum and never exceeds its row maximum.
    #[test]
    fn broadband_matches_spectrum_shape(
        rows in spectrum_rows(),
        half_kernel in 0usize..15,
    ) {
        let s = unit_spectrum(rows);
        let bb = estimate_broadband(&s, (2 * half_kernel + 1) as f64, Units::Points).unwrap();

        prop_assert_eq!(bb.num_channels(), s.num_channels());
        for ch in 0..s.num_channels() {
            prop_assert_eq!(bb.channel(ch).len(), s.num_bins());
            let max = s.channel(ch).iter().copied().fold(0.0, f64::max);
            prop_assert!(bb.channel(ch).iter().all(|&v| (0.0..=max).contains(&v)));
        }
    }

    /// A length-1 median is the identity.
    #[test]
    fn unit_kernel_median_is_identity(
        data in prop::collection::vec(0.0f64..1.0, 1..100),
    ) {
        prop_assert_eq!(median_filter(&data, 1), data);
    }

    /// Resolved footprints contain their peak, lie inside the spectrum and
    /// are never repeated within a channel.
    #[test]
    fn footprints_are_bounded_and_unique(
        rows in spectrum_rows(),
        half_kernel in 1usize..10,
        margin_db in 0.0f64..6.0,
        radius in 1usize..30,
    ) {
        let s = unit_spectrum(rows);
        let bb = estimate_broadband(&s, (2 * half_kernel + 1) as f64, Units::Points).unwrap();
        let peaks = detect_peaks(&s, &bb, 0.0, f64::INFINITY, margin_db).unwrap();
        let widths =
            resolve_peak_widths(&s, &bb, &peaks, radius as f64, Units::Points).unwrap();

        for ch in 0..s.num_channels() {
            let mut seen = HashSet::new();
            for (slot, extent) in peaks.row(ch).iter().zip(widths.row(ch)) {
                match (slot, extent) {
                    (Some(p), PeakExtent::Resolved { lower, upper }) => {
                        prop_assert!(lower <= p && p <= upper);
                        prop_assert!(*upper < s.num_bins());
                        prop_assert!(seen.insert((*lower, *upper)));
                    }
                    (Some(_), PeakExtent::Duplicate) => {}
                    (None, PeakExtent::NoPeak) => {}
                    other => prop_assert!(false, "slot/extent mismatch {:?}", other),
                }
            }
        }
    }

    /// When no bin can clear the margin every level slot stays empty.
    #[test]
    fn unreachable_margin_leaves_no_levels(
        rows in spectrum_rows().prop_map(|rows| {
            // lift every bin so the floor is strictly positive
            rows.into_iter()
                .map(|row| row.into_iter().map(|v| v + 0.5).collect::<Vec<_>>())
                .collect::<Vec<_>>()
        }),
    ) {
        let s = unit_spectrum(rows);
        let bb = estimate_broadband(&s, 5.0, Units::Points).unwrap();
        // raw <= 1.5 and floor >= 0.5, so a 3x ratio is out of reach
        let peaks = detect_peaks(&s, &bb, 0.0, f64::INFINITY, 10.0).unwrap();
        let widths = resolve_peak_widths(&s, &bb, &peaks, 20.0, Units::Points).unwrap();
        let levels = peak_spl(&s, &bb, &widths).unwrap();

        prop_assert_eq!(peaks.max_peaks(), 0);
        prop_assert!(levels.rows().iter().all(|row| row.iter().all(Option::is_none)));
    }
}
