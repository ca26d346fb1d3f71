//! Immutable multichannel single-sided PSD with its frequency axis.

use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{AnalysisError, Result};
use crate::fft::Window;

static NEXT_SPECTRUM_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`Spectrum`].
///
/// Derived results record the id of the spectrum they were computed from so
/// later stages can reject results belonging to a different spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpectrumId(u64);

impl SpectrumId {
    fn next() -> Self {
        SpectrumId(NEXT_SPECTRUM_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Acquisition parameters of the periodogram that produced a spectrum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PsdParams {
    /// Sampling rate in Hz.
    pub sample_rate: f64,
    /// DFT (segment) size in samples.
    pub ndft: usize,
    /// Overlap between segments in samples.
    pub overlap: usize,
    /// Window applied to each segment.
    pub window: Window,
}

impl PsdParams {
    /// Hann window with 50% overlap.
    pub fn new(sample_rate: f64, ndft: usize) -> Self {
        Self {
            sample_rate,
            ndft,
            overlap: ndft / 2,
            window: Window::Hann,
        }
    }

    /// Set the segment overlap in samples.
    pub fn with_overlap(mut self, overlap: usize) -> Self {
        self.overlap = overlap;
        self
    }

    /// Set the window function.
    pub fn with_window(mut self, window: Window) -> Self {
        self.window = window;
        self
    }

    /// Frequency resolution `fs / ndft` in Hz.
    pub fn df(&self) -> f64 {
        self.sample_rate / self.ndft as f64
    }

    /// Number of single-sided bins, `ndft / 2 + 1`.
    pub fn num_bins(&self) -> usize {
        self.ndft / 2 + 1
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(AnalysisError::invalid_parameter(
                "sample_rate",
                format!("must be positive, got {}", self.sample_rate),
            ));
        }
        if self.ndft == 0 {
            return Err(AnalysisError::invalid_parameter("ndft", "must be non-zero"));
        }
        if self.overlap >= self.ndft {
            return Err(AnalysisError::invalid_parameter(
                "overlap",
                format!("{} must be smaller than ndft {}", self.overlap, self.ndft),
            ));
        }
        Ok(())
    }
}

/// Single-sided power spectral density of every channel of one measurement.
///
/// Rows are channels, columns are frequency bins. Values are non-negative
/// and the frequency axis is strictly increasing. Never mutated once built.
#[derive(Debug, Clone)]
pub struct Spectrum {
    id: SpectrumId,
    psd: Vec<Vec<f64>>,
    freq: Vec<f64>,
    params: PsdParams,
    source: Option<String>,
}

impl Spectrum {
    /// Build a spectrum from per-channel PSD rows and a frequency axis.
    pub fn new(psd: Vec<Vec<f64>>, freq: Vec<f64>, params: PsdParams) -> Result<Self> {
        params.validate()?;
        if psd.is_empty() || freq.is_empty() {
            return Err(AnalysisError::EmptySpectrum);
        }
        for row in &psd {
            if row.len() != freq.len() {
                return Err(AnalysisError::LengthMismatch {
                    what: "PSD channel",
                    expected: freq.len(),
                    found: row.len(),
                });
            }
            if let Some(bad) = row.iter().find(|v| !v.is_finite() || **v < 0.0) {
                return Err(AnalysisError::invalid_parameter(
                    "psd",
                    format!("values must be finite and non-negative, got {bad}"),
                ));
            }
        }
        if freq.windows(2).any(|w| w[1] <= w[0]) {
            return Err(AnalysisError::invalid_parameter(
                "freq",
                "frequency axis must be strictly increasing",
            ));
        }

        Ok(Self {
            id: SpectrumId::next(),
            psd,
            freq,
            params,
            source: None,
        })
    }

    /// Build a spectrum on the standard axis `i * fs / ndft`, `ndft / 2 + 1` bins.
    pub fn with_standard_axis(psd: Vec<Vec<f64>>, params: PsdParams) -> Result<Self> {
        params.validate()?;
        let df = params.df();
        let freq = (0..params.num_bins()).map(|i| i as f64 * df).collect();
        Self::new(psd, freq, params)
    }

    /// Attach the name of the recording this spectrum came from.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Identity used to check provenance of derived results.
    pub fn id(&self) -> SpectrumId {
        self.id
    }

    /// Number of channels.
    pub fn num_channels(&self) -> usize {
        self.psd.len()
    }

    /// Number of frequency bins per channel.
    pub fn num_bins(&self) -> usize {
        self.freq.len()
    }

    /// PSD values of one channel.
    pub fn channel(&self, ch: usize) -> &[f64] {
        &self.psd[ch]
    }

    /// All channel rows.
    pub fn channels(&self) -> &[Vec<f64>] {
        &self.psd
    }

    /// Frequency axis in Hz.
    pub fn freq(&self) -> &[f64] {
        &self.freq
    }

    /// Periodogram parameters.
    pub fn params(&self) -> &PsdParams {
        &self.params
    }

    /// Sampling rate in Hz.
    pub fn sample_rate(&self) -> f64 {
        self.params.sample_rate
    }

    /// Frequency resolution `fs / ndft` in Hz.
    pub fn df(&self) -> f64 {
        self.params.df()
    }

    /// Name of the originating recording, if known.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Bin range whose frequencies satisfy `f_low <= f <= f_high`.
    ///
    /// The axis is increasing so the mask is always contiguous. The range is
    /// empty when no bin falls inside the band.
    pub fn band(&self, f_low: f64, f_high: f64) -> Result<Range<usize>> {
        if f_low.is_nan() || f_high.is_nan() || f_low > f_high {
            return Err(AnalysisError::invalid_parameter(
                "band",
                format!("invalid frequency band [{f_low}, {f_high}]"),
            ));
        }
        let start = self.freq.partition_point(|&f| f < f_low);
        let end = self.freq.partition_point(|&f| f <= f_high).max(start);
        Ok(start..end)
    }
}
