//! Dominant tone frequency estimate.

use super::common::RecordingArgs;
use clap::Args;
use micarc_io::DEFAULT_PEAK_NDFT;

/// Estimate the dominant tone of a recording.
#[derive(Args)]
pub struct PeakFreqArgs {
    #[command(flatten)]
    recording: RecordingArgs,

    /// Lower edge of the search band in Hz
    #[arg(long, default_value = "0")]
    f_low: f64,

    /// Upper edge of the search band in Hz (default: Nyquist)
    #[arg(long)]
    f_high: Option<f64>,

    /// PSD segment length
    #[arg(long, default_value_t = DEFAULT_PEAK_NDFT)]
    ndft: usize,
}

/// Run the peak-freq command.
pub fn run(args: PeakFreqArgs) -> anyhow::Result<()> {
    let series = args.recording.load()?;
    let f_high = args.f_high.unwrap_or(series.sample_rate() / 2.0);

    match series.estimate_peak_frequency(args.f_low, f_high, args.ndft)? {
        Some(f) => println!("{f:.3} Hz"),
        None => anyhow::bail!(
            "no peak between {} and {} Hz in any channel",
            args.f_low,
            f_high
        ),
    }

    Ok(())
}
