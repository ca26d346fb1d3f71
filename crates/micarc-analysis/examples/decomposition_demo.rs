//! Decomposition demo: Welch PSD, broadband floor, tonal peaks and SPL.
//!
//! Run with: cargo run -p micarc-analysis --example decomposition_demo

use micarc_analysis::{
    ButterworthFilter, DecompositionParams, FilterKind, FrequencyBand, PsdParams, decompose,
    welch_spectrum,
};
use std::f32::consts::PI;

fn main() -> micarc_analysis::Result<()> {
    let sample_rate = 25600.0f32;
    let num_samples = sample_rate as usize * 4;

    // --- Two synthetic microphones: shared noise floor, different tones ---
    println!("=== Synthetic Fan Recording ===\n");

    let mut state = 0x2545_f491u32;
    let mut noise = || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        0.05 * (state as i32 as f32) / (i32::MAX as f32)
    };

    let tones: [&[(f32, f32)]; 2] = [&[(400.0, 0.2)], &[(400.0, 0.2), (1200.0, 0.1)]];
    let channels: Vec<Vec<f32>> = tones
        .iter()
        .map(|mic| {
            (0..num_samples)
                .map(|i| {
                    let t = i as f32 / sample_rate;
                    // DC offset the highpass will remove
                    0.3 + noise()
                        + mic
                            .iter()
                            .map(|&(f, a)| a * (2.0 * PI * f * t).sin())
                            .sum::<f32>()
                })
                .collect()
        })
        .collect();

    for (ch, mic) in tones.iter().enumerate() {
        let list: Vec<String> = mic.iter().map(|(f, a)| format!("{f} Hz @ {a}")).collect();
        println!("mic{ch}: noise + {}", list.join(" + "));
    }

    // --- Zero-phase highpass, then Welch ---
    let highpass = ButterworthFilter::new(FilterKind::Highpass, 3, 50.0, sample_rate as f64)?;
    let filtered: Vec<Vec<f32>> = channels.iter().map(|ch| highpass.filtfilt(ch)).collect();

    let params = PsdParams::new(sample_rate as f64, 8192);
    let spectrum = welch_spectrum(&filtered, params)?;
    println!(
        "\nPSD: {} channels x {} bins, df = {:.3} Hz",
        spectrum.num_channels(),
        spectrum.num_bins(),
        spectrum.df()
    );

    // --- Decomposition ---
    println!("\n=== Broadband / Tonal Decomposition ===\n");

    let decomposition_params = DecompositionParams {
        peak_band: FrequencyBand::new(100.0, 5000.0)?,
        spl_band: FrequencyBand::new(100.0, 10000.0)?,
        ..DecompositionParams::default()
    };
    let result = decompose(&spectrum, &decomposition_params)?;

    println!(
        "{:<6} {:>12} {:>12} {:>12}",
        "Mic", "Broadband", "Overall", "Tonal"
    );
    println!("{:-<6} {:->12} {:->12} {:->12}", "", "", "", "");
    for ch in 0..spectrum.num_channels() {
        println!(
            "{:<6} {:>9.1} dB {:>9.1} dB {:>9.1} dB",
            format!("mic{ch}"),
            result.spl.broadband[ch],
            result.spl.overall[ch],
            result.spl.tonal[ch]
        );
    }

    println!("\nPeaks:");
    for ch in 0..spectrum.num_channels() {
        let levels = result.spl.peaks.row(ch);
        for (slot, (peak, extent)) in result
            .peaks
            .row(ch)
            .iter()
            .zip(result.widths.row(ch))
            .enumerate()
        {
            let (Some(bin), Some((lower, upper))) = (peak, extent.bounds()) else {
                continue;
            };
            println!(
                "  mic{ch} #{slot}: {:>7.1} Hz, bins {lower}..={upper}, {:.1} dB",
                spectrum.freq()[*bin],
                levels[slot].unwrap_or(f64::NAN)
            );
        }
    }

    // --- Refined frequency of the blade-pass tone ---
    let refined = result.peak_frequency(&spectrum, FrequencyBand::new(300.0, 500.0)?)?;
    if let Some(f) = refined.mean {
        println!("\nRefined tone frequency: {f:.2} Hz (true 400 Hz)");
    }

    Ok(())
}
