//! Recording I/O for MicArc.
//!
//! This crate provides:
//!
//! - **WAV file I/O**: [`read_wav_info`], [`read_wav_channels`] and
//!   [`write_wav_channels`] for multichannel files
//! - **Time series**: [`TimeSeries`] holding named microphone and auxiliary
//!   channels of one measurement, with filtering, PSD estimation and export
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use micarc_io::{ChannelSelection, TimeSeries};
//! use micarc_analysis::{ButterworthFilter, FilterKind, PsdParams};
//!
//! // Eight mics followed by a tachometer channel, 30 s nominal
//! let mics: Vec<String> = (0..8).map(|i| format!("mic{i}")).collect();
//! let ts = TimeSeries::read("run01.wav", &mics, &["rpm"], 30.0)?;
//!
//! let hp = ButterworthFilter::new(FilterKind::Highpass, 3, 50.0, ts.sample_rate())?;
//! let ts = ts.filter(&hp);
//! let spectrum = ts.psd(PsdParams::new(ts.sample_rate(), 8192), 0.0)?;
//!
//! ts.export_wav("run01_hp", &ChannelSelection::First(4))?;
//! ```

mod timeseries;
mod wav;

pub use timeseries::{ChannelSelection, DEFAULT_PEAK_NDFT, PEAK_KERNEL_HZ, TimeSeries};
pub use wav::{WavFormat, WavInfo, WavSpec, read_wav_channels, read_wav_info, write_wav_channels};

/// Error types for recording I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Analysis of the loaded data failed.
    #[error(transparent)]
    Analysis(#[from] micarc_analysis::AnalysisError),

    /// More channel names were given than the file holds.
    #[error("{requested} channel names given but the file has {available} channels")]
    TooManyChannels {
        /// Number of names requested.
        requested: usize,
        /// Number of channels in the file.
        available: usize,
    },

    /// No microphone channel was named.
    #[error("at least one microphone channel name is required")]
    NoMicChannels,

    /// The recording is longer than its declared nominal duration.
    #[error("recording has {frames} frames, longer than the nominal {nominal}")]
    RecordingTooLong {
        /// Frames found in the file.
        frames: usize,
        /// Frames implied by the nominal duration.
        nominal: usize,
    },

    /// A channel name does not exist in this time series.
    #[error("channel not found: {0}")]
    ChannelNotFound(String),

    /// A channel index is out of range.
    #[error("channel index {index} out of range for {available} channels")]
    ChannelIndex {
        /// Requested index.
        index: usize,
        /// Number of microphone channels.
        available: usize,
    },
}

/// Convenience result type for recording I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
