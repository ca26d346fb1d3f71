//! Multichannel WAV file reading and writing.

use crate::Result;
use hound::{SampleFormat, WavReader, WavWriter};
use std::path::Path;

/// Sample encoding of a WAV file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavFormat {
    /// Integer PCM, scaled to [-1, 1) on read.
    Pcm,
    /// 32-bit float samples, read as stored.
    IeeeFloat,
}

/// Layout of a WAV file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Number of interleaved channels.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample (16, 24 or 32).
    pub bits_per_sample: u16,
    /// Sample encoding.
    pub format: WavFormat,
}

impl From<hound::WavSpec> for WavSpec {
    fn from(spec: hound::WavSpec) -> Self {
        Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            format: match spec.sample_format {
                SampleFormat::Float => WavFormat::IeeeFloat,
                SampleFormat::Int => WavFormat::Pcm,
            },
        }
    }
}

/// Header of a recording, read without loading its samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavInfo {
    /// File layout.
    pub spec: WavSpec,
    /// Samples per channel.
    pub num_frames: u64,
}

impl WavInfo {
    /// Recording length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.num_frames as f64 / f64::from(self.spec.sample_rate)
    }
}

/// Read the header of a WAV file.
pub fn read_wav_info<P: AsRef<Path>>(path: P) -> Result<WavInfo> {
    let reader = WavReader::open(path)?;
    let spec = WavSpec::from(reader.spec());
    // hound counts samples across all channels
    let num_frames = u64::from(reader.len()) / u64::from(spec.channels.max(1));
    Ok(WavInfo { spec, num_frames })
}

/// Read every channel of a WAV file as f32, deinterleaved.
///
/// Integer PCM is scaled to [-1, 1). Returns one row per channel.
pub fn read_wav_channels<P: AsRef<Path>>(path: P) -> Result<(Vec<Vec<f32>>, WavSpec)> {
    let reader = WavReader::open(path)?;
    let spec = WavSpec::from(reader.spec());
    let channels = spec.channels as usize;

    let interleaved: Vec<f32> = match spec.format {
        WavFormat::IeeeFloat => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        WavFormat::Pcm => {
            let full_scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / full_scale))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    let frames = interleaved.len() / channels.max(1);
    let mut rows = vec![Vec::with_capacity(frames); channels];
    for frame in interleaved.chunks_exact(channels.max(1)) {
        for (row, &sample) in rows.iter_mut().zip(frame) {
            row.push(sample);
        }
    }

    Ok((rows, spec))
}

/// Write channel rows to a 32-bit float WAV file.
///
/// Rows are written up to the length of the shortest one.
pub fn write_wav_channels<P: AsRef<Path>, S: AsRef<[f32]>>(
    path: P,
    channels: &[S],
    sample_rate: u32,
) -> Result<()> {
    let hound_spec = hound::WavSpec {
        channels: channels.len() as u16,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(path, hound_spec)?;

    let frames = channels
        .iter()
        .map(|ch| ch.as_ref().len())
        .min()
        .unwrap_or(0);
    for i in 0..frames {
        for ch in channels {
            writer.write_sample(ch.as_ref()[i])?;
        }
    }

    writer.finalize()?;
    Ok(())
}
