//! Channel export to a new WAV file.

use super::common::RecordingArgs;
use clap::Args;
use micarc_analysis::{ButterworthFilter, FilterKind};
use micarc_io::ChannelSelection;
use std::path::PathBuf;

/// Export microphone channels.
#[derive(Args)]
pub struct ExportArgs {
    #[command(flatten)]
    recording: RecordingArgs,

    /// Output WAV file (".wav" is appended when missing)
    #[arg(short, long)]
    output: PathBuf,

    /// Export the first N microphone channels
    #[arg(long, conflicts_with = "select")]
    channels: Option<usize>,

    /// Export these microphone channel indices, in this order
    #[arg(long, value_delimiter = ',')]
    select: Vec<usize>,

    /// Highpass cutoff in Hz applied before export
    #[arg(long)]
    highpass: Option<f64>,

    /// Highpass filter order
    #[arg(long, default_value = "3")]
    order: usize,
}

/// Run the export command.
pub fn run(args: ExportArgs) -> anyhow::Result<()> {
    let mut series = args.recording.load()?;

    if let Some(cutoff) = args.highpass {
        let filter =
            ButterworthFilter::new(FilterKind::Highpass, args.order, cutoff, series.sample_rate())?;
        series = series.filter(&filter);
    }

    let selection = if !args.select.is_empty() {
        ChannelSelection::List(args.select)
    } else {
        ChannelSelection::First(args.channels.unwrap_or(series.num_channels()))
    };

    let path = series.export_wav(&args.output, &selection)?;
    println!("Wrote {}", path.display());

    Ok(())
}
