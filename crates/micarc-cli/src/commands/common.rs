//! Shared CLI helpers used across multiple commands.

use clap::Args;
use micarc_io::{TimeSeries, read_wav_info};
use std::path::PathBuf;

/// Options locating a recording and naming its channels.
#[derive(Args)]
pub struct RecordingArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Microphone channel names, in file order (default: every channel not named by --aux)
    #[arg(long = "mic", value_name = "NAME")]
    pub mics: Vec<String>,

    /// Auxiliary channel names, following the microphones in the file
    #[arg(long = "aux", value_name = "NAME")]
    pub aux: Vec<String>,

    /// Nominal recording length in seconds; shorter microphone channels are zero-padded
    #[arg(long)]
    pub duration: Option<f64>,
}

impl RecordingArgs {
    /// Load the recording described by these options.
    pub fn load(&self) -> anyhow::Result<TimeSeries> {
        let info = read_wav_info(&self.input)?;

        let mics = if self.mics.is_empty() {
            let count = usize::from(info.spec.channels).saturating_sub(self.aux.len());
            default_mic_names(count)
        } else {
            self.mics.clone()
        };
        let duration = self.duration.unwrap_or_else(|| info.duration_secs());

        Ok(TimeSeries::read(&self.input, &mics, &self.aux, duration)?)
    }
}

fn default_mic_names(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("mic{i}")).collect()
}

/// Format an SPL for a table cell, blank when there is no level.
pub fn format_db(spl: f64) -> String {
    if spl.is_finite() {
        format!("{spl:.1}")
    } else {
        "-".to_string()
    }
}
