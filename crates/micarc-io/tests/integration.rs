//! Integration tests for micarc-io recording I/O.

use micarc_analysis::{ButterworthFilter, FilterKind, PsdParams};
use micarc_io::{
    ChannelSelection, DEFAULT_PEAK_NDFT, Error, TimeSeries, read_wav_channels, read_wav_info,
    write_wav_channels,
};
use std::f32::consts::PI;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const SR: u32 = 8192;

fn sine(freq_hz: f32, amplitude: f32, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|i| amplitude * (2.0 * PI * freq_hz * i as f32 / SR as f32).sin())
        .collect()
}

/// Three mics (tones at 500, 1000, 1500 Hz on a DC offset) plus an rpm channel.
fn write_recording(dir: &TempDir, seconds: usize) -> std::path::PathBuf {
    let n = SR as usize * seconds;
    let mut rows: Vec<Vec<f32>> = [500.0, 1000.0, 1500.0]
        .iter()
        .map(|&f| sine(f, 0.3, n).into_iter().map(|x| x + 0.2).collect())
        .collect();
    rows.push((0..n).map(|i| 1800.0 + (i % 2) as f32 * 4.0).collect());

    let path = dir.path().join("run.wav");
    write_wav_channels(&path, &rows, SR).unwrap();
    path
}

fn mics() -> Vec<String> {
    vec!["front".into(), "side".into(), "rear".into()]
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

#[test]
fn read_assigns_mics_then_aux_in_order() {
    let dir = TempDir::new().unwrap();
    let path = write_recording(&dir, 2);

    let ts = TimeSeries::read(&path, &mics(), &["rpm"], 2.0).unwrap();
    assert_eq!(ts.num_channels(), 3);
    assert_eq!(ts.sample_rate(), SR as f64);
    assert_eq!(ts.mic_names(), mics().as_slice());
    assert_eq!(ts.num_samples(), 2 * SR as usize);
    assert_eq!(ts.aux_names().collect::<Vec<_>>(), vec!["rpm"]);
    assert_eq!(ts.aux("rpm").unwrap()[1], 1804.0);
    assert!(ts.source().unwrap().ends_with("run.wav"));
}

#[test]
fn short_recording_is_zero_padded() {
    let dir = TempDir::new().unwrap();
    let path = write_recording(&dir, 1);

    let ts = TimeSeries::read(&path, &mics(), &[] as &[&str], 3.0).unwrap();
    assert_eq!(ts.num_samples(), 3 * SR as usize);
    assert!((ts.duration() - 3.0).abs() < 1e-12);
    assert!(ts.mic(0)[SR as usize..].iter().all(|&x| x == 0.0));
}

#[test]
fn long_recording_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_recording(&dir, 2);

    let err = TimeSeries::read(&path, &mics(), &[] as &[&str], 1.0).unwrap_err();
    assert!(matches!(
        err,
        Error::RecordingTooLong { frames, nominal } if frames == 2 * SR as usize && nominal == SR as usize
    ));
}

#[test]
fn too_many_names_are_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_recording(&dir, 1);

    let err = TimeSeries::read(&path, &mics(), &["rpm", "temp"], 1.0).unwrap_err();
    assert!(matches!(
        err,
        Error::TooManyChannels {
            requested: 5,
            available: 4
        }
    ));
}

#[test]
fn missing_file_is_a_wav_error() {
    let dir = TempDir::new().unwrap();
    let err = TimeSeries::read(dir.path().join("nope.wav"), &mics(), &[] as &[&str], 1.0)
        .unwrap_err();
    assert!(matches!(err, Error::Wav(_)));
}

// ---------------------------------------------------------------------------
// Processing
// ---------------------------------------------------------------------------

#[test]
fn channel_means_of_aux_and_mics() {
    let dir = TempDir::new().unwrap();
    let path = write_recording(&dir, 1);
    let ts = TimeSeries::read(&path, &mics(), &["rpm"], 1.0).unwrap();

    let means = ts.channel_means(&["rpm", "front"]).unwrap();
    assert!((means["rpm"] - 1802.0).abs() < 1e-9);
    // whole number of periods, so only the offset survives
    assert!((means["front"] - 0.2).abs() < 1e-4);
}

#[test]
fn highpass_removes_offset_and_keeps_tones() {
    let dir = TempDir::new().unwrap();
    let path = write_recording(&dir, 1);
    let ts = TimeSeries::read(&path, &mics(), &["rpm"], 1.0).unwrap();

    let hp = ButterworthFilter::new(FilterKind::Highpass, 3, 50.0, ts.sample_rate()).unwrap();
    let filtered = ts.filter(&hp);

    let means = filtered.channel_means(&["front", "side", "rear"]).unwrap();
    assert!(means.values().all(|m| m.abs() < 0.01), "{means:?}");
    // aux channels are not filtered
    assert_eq!(filtered.aux("rpm"), ts.aux("rpm"));
    // the original is untouched
    assert!((ts.channel_means(&["front"]).unwrap()["front"] - 0.2).abs() < 1e-4);
}

#[test]
fn psd_finds_each_mic_tone() {
    let dir = TempDir::new().unwrap();
    let path = write_recording(&dir, 2);
    let ts = TimeSeries::read(&path, &mics(), &["rpm"], 2.0).unwrap();

    let spectrum = ts.psd(PsdParams::new(ts.sample_rate(), 1024), 0.5).unwrap();
    assert_eq!(spectrum.num_channels(), 3);
    assert_eq!(spectrum.df(), 8.0);
    assert!(spectrum.source().unwrap().ends_with("run.wav"));

    for (ch, bin) in [62usize, 125, 187].into_iter().enumerate() {
        // 500/8 is not whole, so look at the tallest bin
        let row = spectrum.channel(ch);
        let peak = (1..row.len()).max_by(|&a, &b| row[a].total_cmp(&row[b])).unwrap();
        assert!(peak.abs_diff(bin) <= 1, "ch {ch}: peak at {peak}");
    }
}

#[test]
fn peak_frequency_is_averaged_over_mics() {
    let dir = TempDir::new().unwrap();
    let n = SR as usize * 4;
    let rows = vec![sine(1000.0, 0.5, n), sine(1000.0, 0.3, n)];
    let path = dir.path().join("tone.wav");
    write_wav_channels(&path, &rows, SR).unwrap();

    let ts = TimeSeries::read(&path, &["a", "b"], &[] as &[&str], 4.0).unwrap();
    let f = ts
        .estimate_peak_frequency(800.0, 1200.0, DEFAULT_PEAK_NDFT)
        .unwrap()
        .unwrap();
    assert!((f - 1000.0).abs() < 0.5, "estimated {f} Hz");
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[test]
fn export_first_channels_appends_extension() {
    let dir = TempDir::new().unwrap();
    let path = write_recording(&dir, 1);
    let ts = TimeSeries::read(&path, &mics(), &["rpm"], 1.0).unwrap();

    let written = ts
        .export_wav(dir.path().join("out"), &ChannelSelection::First(2))
        .unwrap();
    assert_eq!(written, dir.path().join("out.wav"));

    let info = read_wav_info(&written).unwrap();
    assert_eq!(info.spec.channels, 2);
    assert_eq!(info.spec.bits_per_sample, 32);
    assert_eq!(info.spec.sample_rate, SR);

    let (rows, _) = read_wav_channels(&written).unwrap();
    assert_eq!(rows[0], ts.mic(0));
    assert_eq!(rows[1], ts.mic(1));
}

#[test]
fn export_list_keeps_given_order() {
    let dir = TempDir::new().unwrap();
    let path = write_recording(&dir, 1);
    let ts = TimeSeries::read(&path, &mics(), &[] as &[&str], 1.0).unwrap();

    let written = ts
        .export_wav(dir.path().join("sel.wav"), &ChannelSelection::List(vec![2, 0]))
        .unwrap();
    let (rows, _) = read_wav_channels(&written).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0], ts.mic(2));
    assert_eq!(rows[1], ts.mic(0));
}
