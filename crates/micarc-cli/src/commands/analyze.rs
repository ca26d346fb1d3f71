//! Broadband/tonal decomposition of a recording.

use super::common::{RecordingArgs, format_db};
use clap::Args;
use micarc_analysis::{Decomposition, Spectrum, decompose};
use micarc_config::AnalysisConfig;
use std::path::PathBuf;

/// Decompose a recording into broadband and tonal levels.
#[derive(Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    recording: RecordingArgs,

    /// Analysis settings file (default: the user config, then built-in settings)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write a JSON report
    #[arg(long, value_name = "FILE")]
    json: Option<PathBuf>,

    /// Skip the configured filter
    #[arg(long)]
    no_filter: bool,
}

/// Run the analyze command.
pub fn run(args: AnalyzeArgs) -> anyhow::Result<()> {
    let config = AnalysisConfig::resolve(args.config.as_deref())?;
    let params = config.validate()?;
    tracing::debug!(?params, "analysis settings resolved");

    let mut series = args.recording.load()?;
    let fs = series.sample_rate();
    let filter = if args.no_filter {
        None
    } else {
        config.build_filter(fs)?
    };
    if let Some(filter) = &filter {
        series = series.filter(filter);
    }

    let psd_params = config.psd_params(fs)?;
    let spectrum = series.psd(psd_params, config.psd.skip_seconds)?;
    let result = decompose(&spectrum, &params)?;
    let tone = result.peak_frequency(&spectrum, params.peak_band)?;

    let aux_names: Vec<&str> = series.aux_names().collect();
    let aux_means = series.channel_means(&aux_names)?;

    println!(
        "Analyzed {} ({} mics, {} Hz, df {:.3} Hz)",
        args.recording.input.display(),
        series.num_channels(),
        fs,
        spectrum.df()
    );
    println!();
    print_levels(series.mic_names(), &result);
    print_peaks(series.mic_names(), &spectrum, &result);

    match tone.mean {
        Some(f) => println!("\nDominant tone: {f:.2} Hz"),
        None => println!("\nDominant tone: none"),
    }
    for (name, mean) in &aux_means {
        println!("Mean {name}: {mean:.3}");
    }

    if let Some(path) = args.json {
        let freq = spectrum.freq();
        let peak_freq: Vec<Vec<f64>> = result
            .peaks
            .rows()
            .iter()
            .map(|row| row.iter().map(|p| p.map_or(-1.0, |bin| freq[bin])).collect())
            .collect();
        let widths: Vec<Vec<[i64; 2]>> = result
            .widths
            .rows()
            .iter()
            .map(|row| row.iter().map(|w| w.to_sentinel()).collect())
            .collect();

        let report = serde_json::json!({
            "input": args.recording.input.display().to_string(),
            "sample_rate": fs,
            "ndft": spectrum.params().ndft,
            "df": spectrum.df(),
            "channels": series.mic_names(),
            "peak_band": [params.peak_band.low, params.peak_band.high],
            "spl_band": [params.spl_band.low, params.spl_band.high],
            "broadband_spl": result.spl.broadband,
            "overall_spl": result.spl.overall,
            "tonal_spl": result.spl.tonal,
            "peaks": result.peaks.to_sentinel_rows(),
            "peak_freq": peak_freq,
            "peak_widths": widths,
            "peak_spl": result.spl.peaks.to_nan_rows(),
            "dominant_tone": tone.mean,
            "aux_means": aux_means,
        });
        std::fs::write(&path, serde_json::to_string_pretty(&report)?)?;
        tracing::info!(path = %path.display(), "report written");
        println!("Report written to {}", path.display());
    }

    Ok(())
}

fn print_levels(names: &[String], result: &Decomposition) {
    println!(
        "{:<12} {:>10} {:>10} {:>10} {:>6}",
        "channel", "broadband", "overall", "tonal", "peaks"
    );
    for (ch, name) in names.iter().enumerate() {
        println!("{}", level_row(name, result, ch));
    }
}

/// Levels of one channel; the count matches the peaks listed per channel.
fn level_row(name: &str, result: &Decomposition, ch: usize) -> String {
    format!(
        "{:<12} {:>10} {:>10} {:>10} {:>6}",
        name,
        format_db(result.spl.broadband[ch]),
        format_db(result.spl.overall[ch]),
        format_db(result.spl.tonal[ch]),
        result.widths.num_resolved(ch)
    )
}

fn print_peaks(names: &[String], spectrum: &Spectrum, result: &Decomposition) {
    let freq = spectrum.freq();
    for (ch, name) in names.iter().enumerate() {
        let levels = result.spl.peaks.row(ch);
        let extents = result.widths.row(ch);
        let rows: Vec<String> = result
            .peaks
            .row(ch)
            .iter()
            .zip(levels)
            .zip(extents)
            .filter_map(|((peak, spl), extent)| {
                let bin = (*peak)?;
                let (lo, hi) = extent.bounds()?;
                Some(format!(
                    "  {:>10.2} Hz  {:>8} dB  [{:.2}, {:.2}] Hz",
                    freq[bin],
                    format_db(spl.unwrap_or(f64::NAN)),
                    freq[lo],
                    freq[hi]
                ))
            })
            .collect();

        if rows.is_empty() {
            continue;
        }
        println!("\nPeaks in {name}:");
        for row in rows {
            println!("{row}");
        }
    }
}
