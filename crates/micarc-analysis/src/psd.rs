//! Welch power spectral density estimation.
//!
//! Produces the single-sided, density-scaled PSD (Pa²/Hz for signals in Pa)
//! that [`Spectrum`] stores. Segments of `ndft` samples overlap by
//! `overlap` samples, have their mean removed, are windowed and their
//! periodograms averaged.

use crate::error::{AnalysisError, Result};
use crate::fft::Fft;
use crate::spectrum::{PsdParams, Spectrum};

/// Welch PSD of one signal on the axis `i * fs / ndft`, `ndft / 2 + 1` bins.
pub fn welch_psd(signal: &[f32], params: &PsdParams) -> Result<Vec<f64>> {
    params.validate()?;
    let n = params.ndft;
    if signal.len() < n {
        return Err(AnalysisError::invalid_parameter(
            "signal",
            format!("{} samples is shorter than one segment of {n}", signal.len()),
        ));
    }

    let window = params.window.coefficients(n);
    let window_power: f64 = window.iter().map(|w| w * w).sum();
    if window_power <= 0.0 {
        return Err(AnalysisError::invalid_parameter(
            "window",
            format!("{} window of {n} points has no energy", params.window),
        ));
    }

    let fft = Fft::new(n);
    let step = n - params.overlap;
    let num_segments = (signal.len() - n) / step + 1;
    let mut acc = vec![0.0f64; params.num_bins()];
    let mut frame = vec![0.0f64; n];

    for seg in 0..num_segments {
        let chunk = &signal[seg * step..seg * step + n];
        let mean = chunk.iter().map(|&x| x as f64).sum::<f64>() / n as f64;
        for ((out, &x), &w) in frame.iter_mut().zip(chunk).zip(&window) {
            *out = (x as f64 - mean) * w;
        }
        for (a, c) in acc.iter_mut().zip(fft.forward(&frame)) {
            *a += c.norm_sqr();
        }
    }

    let scale = 1.0 / (params.sample_rate * window_power * num_segments as f64);
    let nyquist = (n % 2 == 0).then_some(n / 2);
    for (i, a) in acc.iter_mut().enumerate() {
        *a *= scale;
        if i != 0 && Some(i) != nyquist {
            *a *= 2.0;
        }
    }

    Ok(acc)
}

/// Welch PSD of every channel, packed into a [`Spectrum`].
pub fn welch_spectrum<S: AsRef<[f32]>>(channels: &[S], params: PsdParams) -> Result<Spectrum> {
    let psd = channels
        .iter()
        .map(|ch| welch_psd(ch.as_ref(), &params))
        .collect::<Result<Vec<_>>>()?;

    #[cfg(feature = "tracing")]
    tracing::debug!(
        channels = psd.len(),
        ndft = params.ndft,
        overlap = params.overlap,
        window = %params.window,
        "welch PSD estimated"
    );

    Spectrum::with_standard_axis(psd, params)
}
