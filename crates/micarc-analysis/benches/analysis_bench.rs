//! Criterion benchmarks for micarc-analysis components
//!
//! Run with: cargo bench -p micarc-analysis

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use micarc_analysis::{
    ButterworthFilter, DecompositionParams, FilterKind, FrequencyBand, PsdParams, Spectrum, Units,
    decompose, detect_peaks, estimate_broadband, median_filter, resolve_peak_widths, welch_psd,
};
use std::f32::consts::PI;

const SAMPLE_RATE: f32 = 51200.0;

/// Noise plus a few tones, like a fan measurement
fn generate_signal(size: usize) -> Vec<f32> {
    let mut state = 0x12345678u32;
    (0..size)
        .map(|i| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            let t = i as f32 / SAMPLE_RATE;
            let noise = 0.1 * (state as i32 as f32) / (i32::MAX as f32);
            noise
                + 0.5 * (2.0 * PI * 750.0 * t).sin()
                + 0.2 * (2.0 * PI * 1500.0 * t).sin()
                + 0.1 * (2.0 * PI * 3100.0 * t).sin()
        })
        .collect()
}

/// Welch spectrum of `channels` copies of the test signal
fn generate_spectrum(channels: usize, ndft: usize) -> Spectrum {
    let signal = generate_signal(ndft * 16);
    let params = PsdParams::new(SAMPLE_RATE as f64, ndft);
    let row = welch_psd(&signal, &params).unwrap();
    Spectrum::with_standard_axis(vec![row; channels], params).unwrap()
}

// ============================================================================
// Upstream of the decomposition
// ============================================================================

fn bench_welch_psd(c: &mut Criterion) {
    let mut group = c.benchmark_group("WelchPSD");
    let signal = generate_signal(SAMPLE_RATE as usize * 4);

    for ndft in [1024, 4096, 8192, 16384] {
        let params = PsdParams::new(SAMPLE_RATE as f64, ndft);
        group.bench_with_input(BenchmarkId::from_parameter(ndft), &ndft, |b, _| {
            b.iter(|| welch_psd(black_box(&signal), black_box(&params)))
        });
    }

    group.finish();
}

fn bench_filtfilt(c: &mut Criterion) {
    let mut group = c.benchmark_group("Filtfilt");
    let signal = generate_signal(SAMPLE_RATE as usize);

    for order in [2, 3, 6] {
        let filter =
            ButterworthFilter::new(FilterKind::Highpass, order, 50.0, SAMPLE_RATE as f64).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(order), &order, |b, _| {
            b.iter(|| filter.filtfilt(black_box(&signal)))
        });
    }

    group.finish();
}

// ============================================================================
// Decomposition stages
// ============================================================================

fn bench_median_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("MedianFilter");
    let spectrum = generate_spectrum(1, 16384);
    let row = spectrum.channel(0);

    for kernel in [11, 33, 101, 301] {
        group.bench_with_input(BenchmarkId::from_parameter(kernel), &kernel, |b, &k| {
            b.iter(|| median_filter(black_box(row), k))
        });
    }

    group.finish();
}

fn bench_peaks_and_widths(c: &mut Criterion) {
    let spectrum = generate_spectrum(8, 8192);
    let bb = estimate_broadband(&spectrum, 100.0, Units::Hz).unwrap();

    c.bench_function("DetectPeaks_8ch", |b| {
        b.iter(|| detect_peaks(black_box(&spectrum), black_box(&bb), 50.0, 10000.0, 3.0))
    });

    let peaks = detect_peaks(&spectrum, &bb, 50.0, 10000.0, 3.0).unwrap();
    c.bench_function("ResolvePeakWidths_8ch", |b| {
        b.iter(|| resolve_peak_widths(black_box(&spectrum), &bb, &peaks, 20.0, Units::Points))
    });
}

fn bench_decompose(c: &mut Criterion) {
    let mut group = c.benchmark_group("Decompose");
    let params = DecompositionParams {
        peak_band: FrequencyBand::new(50.0, 10000.0).unwrap(),
        spl_band: FrequencyBand::new(50.0, 20000.0).unwrap(),
        ..DecompositionParams::default()
    };

    for channels in [1, 8, 32] {
        let spectrum = generate_spectrum(channels, 8192);
        group.bench_with_input(
            BenchmarkId::from_parameter(channels),
            &channels,
            |b, _| b.iter(|| decompose(black_box(&spectrum), black_box(&params))),
        );
    }

    group.finish();
}

criterion_group!(upstream, bench_welch_psd, bench_filtfilt);
criterion_group!(
    decomposition,
    bench_median_filter,
    bench_peaks_and_widths,
    bench_decompose
);
criterion_main!(upstream, decomposition);
