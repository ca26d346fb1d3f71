//! Named multichannel time series of one measurement.
//!
//! A [`TimeSeries`] holds the microphone channels that feed the PSD
//! estimate, in a fixed order, plus any auxiliary channels (tachometer,
//! temperature, load cell...) keyed by name.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use micarc_analysis::{
    AnalysisError, ButterworthFilter, PsdParams, Spectrum, Units, estimate_broadband,
    refine_peak_frequency, welch_spectrum,
};

use crate::wav::{read_wav_channels, write_wav_channels};
use crate::{Error, Result};

/// Default DFT size for [`TimeSeries::estimate_peak_frequency`].
pub const DEFAULT_PEAK_NDFT: usize = 1 << 14;

/// Broadband kernel used as the peak threshold when estimating peak frequency, in Hz.
pub const PEAK_KERNEL_HZ: f64 = 100.0;

/// Which microphone channels to export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelSelection {
    /// The first `n` channels in order.
    First(usize),
    /// These channel indices, in the given order.
    List(Vec<usize>),
}

/// Microphone and auxiliary channels sampled at one rate.
#[derive(Debug, Clone)]
pub struct TimeSeries {
    source: Option<String>,
    sample_rate: f64,
    mic_names: Vec<String>,
    mic_data: Vec<Vec<f32>>,
    aux: BTreeMap<String, Vec<f32>>,
}

impl TimeSeries {
    /// Build a time series from in-memory microphone channels.
    ///
    /// Every channel must have the same length.
    pub fn new(sample_rate: f64, mic_names: Vec<String>, mic_data: Vec<Vec<f32>>) -> Result<Self> {
        if mic_names.is_empty() {
            return Err(Error::NoMicChannels);
        }
        if mic_names.len() != mic_data.len() {
            return Err(AnalysisError::LengthMismatch {
                what: "microphone names",
                expected: mic_data.len(),
                found: mic_names.len(),
            }
            .into());
        }
        let len = mic_data[0].len();
        if let Some(row) = mic_data.iter().find(|row| row.len() != len) {
            return Err(AnalysisError::LengthMismatch {
                what: "microphone channel",
                expected: len,
                found: row.len(),
            }
            .into());
        }
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(AnalysisError::invalid_parameter(
                "sample_rate",
                format!("must be positive, got {sample_rate}"),
            )
            .into());
        }

        Ok(Self {
            source: None,
            sample_rate,
            mic_names,
            mic_data,
            aux: BTreeMap::new(),
        })
    }

    /// Attach an auxiliary channel.
    pub fn with_aux(mut self, name: impl Into<String>, data: Vec<f32>) -> Self {
        self.aux.insert(name.into(), data);
        self
    }

    /// Read a multichannel WAV recording.
    ///
    /// File channels are assigned to `mic_names` first and then to
    /// `aux_names`, in order; extra file channels are ignored. Microphone
    /// channels shorter than `nominal_duration` are zero-padded to it.
    pub fn read<P, M, A>(
        path: P,
        mic_names: &[M],
        aux_names: &[A],
        nominal_duration: f64,
    ) -> Result<Self>
    where
        P: AsRef<Path>,
        M: AsRef<str>,
        A: AsRef<str>,
    {
        let path = path.as_ref();
        if mic_names.is_empty() {
            return Err(Error::NoMicChannels);
        }

        let (mut rows, spec) = read_wav_channels(path)?;
        let requested = mic_names.len() + aux_names.len();
        if requested > rows.len() {
            return Err(Error::TooManyChannels {
                requested,
                available: rows.len(),
            });
        }

        let sample_rate = spec.sample_rate as f64;
        let nominal = (nominal_duration * sample_rate).round() as usize;
        let frames = rows.first().map_or(0, Vec::len);
        if frames > nominal {
            return Err(Error::RecordingTooLong { frames, nominal });
        }

        rows.truncate(requested);
        let aux_rows = rows.split_off(mic_names.len());
        let mut mic_data = rows;
        for row in &mut mic_data {
            row.resize(nominal, 0.0);
        }

        let aux = aux_names
            .iter()
            .map(|name| name.as_ref().to_string())
            .zip(aux_rows)
            .collect();

        tracing::info!(
            path = %path.display(),
            mics = mic_names.len(),
            aux = aux_names.len(),
            frames,
            padded_to = nominal,
            sample_rate,
            "recording loaded"
        );

        Ok(Self {
            source: Some(path.display().to_string()),
            sample_rate,
            mic_names: mic_names.iter().map(|n| n.as_ref().to_string()).collect(),
            mic_data,
            aux,
        })
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Number of microphone channels.
    pub fn num_channels(&self) -> usize {
        self.mic_data.len()
    }

    /// Samples per microphone channel.
    pub fn num_samples(&self) -> usize {
        self.mic_data.first().map_or(0, Vec::len)
    }

    /// Length of the microphone channels in seconds.
    pub fn duration(&self) -> f64 {
        self.num_samples() as f64 / self.sample_rate
    }

    /// Microphone channel names in order.
    pub fn mic_names(&self) -> &[String] {
        &self.mic_names
    }

    /// One microphone channel.
    pub fn mic(&self, ch: usize) -> &[f32] {
        &self.mic_data[ch]
    }

    /// All microphone channels.
    pub fn mic_channels(&self) -> &[Vec<f32>] {
        &self.mic_data
    }

    /// Auxiliary channel by name.
    pub fn aux(&self, name: &str) -> Option<&[f32]> {
        self.aux.get(name).map(Vec::as_slice)
    }

    /// Auxiliary channel names, sorted.
    pub fn aux_names(&self) -> impl Iterator<Item = &str> {
        self.aux.keys().map(String::as_str)
    }

    /// File the data was read from, if any.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    fn channel_by_name(&self, name: &str) -> Option<&[f32]> {
        self.aux(name).or_else(|| {
            self.mic_names
                .iter()
                .position(|n| n == name)
                .map(|i| self.mic(i))
        })
    }

    /// Time average of each named channel.
    ///
    /// Auxiliary channels are looked up first, then microphones.
    pub fn channel_means<S: AsRef<str>>(&self, names: &[S]) -> Result<BTreeMap<String, f64>> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                let data = self
                    .channel_by_name(name)
                    .ok_or_else(|| Error::ChannelNotFound(name.to_string()))?;
                let mean = data.iter().map(|&x| x as f64).sum::<f64>() / data.len() as f64;
                Ok((name.to_string(), mean))
            })
            .collect()
    }

    /// Copy with every microphone channel zero-phase filtered.
    ///
    /// Auxiliary channels are copied unchanged.
    pub fn filter(&self, filter: &ButterworthFilter) -> TimeSeries {
        tracing::debug!(
            kind = %filter.kind(),
            order = filter.order(),
            cutoff_hz = filter.cutoff(),
            channels = self.num_channels(),
            "filtering microphone channels"
        );

        TimeSeries {
            source: self.source.clone(),
            sample_rate: self.sample_rate,
            mic_names: self.mic_names.clone(),
            mic_data: self.mic_data.iter().map(|ch| filter.filtfilt(ch)).collect(),
            aux: self.aux.clone(),
        }
    }

    /// Welch PSD of every microphone channel, skipping the first `skip_seconds`.
    pub fn psd(&self, params: PsdParams, skip_seconds: f64) -> Result<Spectrum> {
        if !skip_seconds.is_finite() || skip_seconds < 0.0 {
            return Err(AnalysisError::invalid_parameter(
                "skip_seconds",
                format!("must be non-negative, got {skip_seconds}"),
            )
            .into());
        }
        let skip = ((skip_seconds * self.sample_rate).round() as usize).min(self.num_samples());
        let params = PsdParams {
            sample_rate: self.sample_rate,
            ..params
        };

        let segments: Vec<&[f32]> = self.mic_data.iter().map(|ch| &ch[skip..]).collect();
        let spectrum = welch_spectrum(&segments, params)?;
        Ok(match &self.source {
            Some(source) => spectrum.with_source(source.clone()),
            None => spectrum,
        })
    }

    /// Refined frequency of the tallest peak in `[f_low, f_high]`, averaged over channels.
    ///
    /// Uses a Hann, 50 % overlap PSD of `ndft` points and a
    /// [`PEAK_KERNEL_HZ`] broadband floor. `None` when no channel has a peak.
    pub fn estimate_peak_frequency(
        &self,
        f_low: f64,
        f_high: f64,
        ndft: usize,
    ) -> Result<Option<f64>> {
        let spectrum = self.psd(PsdParams::new(self.sample_rate, ndft), 0.0)?;
        let broadband = estimate_broadband(&spectrum, PEAK_KERNEL_HZ, Units::Hz)?;
        let estimate = refine_peak_frequency(&spectrum, &broadband, f_low, f_high)?;
        Ok(estimate.mean)
    }

    /// Write selected microphone channels to a 32-bit float WAV file.
    ///
    /// Appends `.wav` to `path` when missing and returns the path written.
    pub fn export_wav<P: AsRef<Path>>(
        &self,
        path: P,
        selection: &ChannelSelection,
    ) -> Result<PathBuf> {
        let indices: Vec<usize> = match selection {
            ChannelSelection::First(n) => (0..*n).collect(),
            ChannelSelection::List(list) => list.clone(),
        };
        if let Some(&index) = indices.iter().find(|&&i| i >= self.num_channels()) {
            return Err(Error::ChannelIndex {
                index,
                available: self.num_channels(),
            });
        }

        let channels: Vec<&[f32]> = indices.iter().map(|&i| self.mic(i)).collect();
        if channels.iter().any(|ch| ch.iter().any(|x| x.abs() > 1.0)) {
            tracing::warn!("some microphone signal amplitudes are above unity");
        }

        let path = with_wav_extension(path.as_ref());
        write_wav_channels(&path, &channels, self.sample_rate.round() as u32)?;
        tracing::info!(path = %path.display(), channels = indices.len(), "WAV exported");
        Ok(path)
    }
}

fn with_wav_extension(path: &Path) -> PathBuf {
    if path.extension().is_some_and(|ext| ext == "wav") {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_owned();
        name.push(".wav");
        PathBuf::from(name)
    }
}
