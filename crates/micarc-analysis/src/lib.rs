//! MicArc Analysis - broadband/tonal decomposition of acoustic spectra
//!
//! Splits a multichannel power spectral density into a slowly varying
//! broadband floor and a set of discrete tonal peaks, then integrates each
//! part into sound pressure levels:
//!
//! - [`spectrum`] - Immutable multichannel PSD with its frequency axis
//! - [`broadband`] - Median-filtered noise floor
//! - [`peaks`] - Local maxima above the floor plus a dB margin
//! - [`peak_width`] - Footprint of each peak between floor crossings
//! - [`spl`] - Broadband, overall, per-peak and tonal SPL
//! - [`refine`] - Sub-bin frequency of the tallest peak
//! - [`pipeline`] - The whole chain in one call
//!
//! Upstream of the decomposition:
//!
//! - [`psd`] - Welch PSD estimation
//! - [`filter`] - Zero-phase Butterworth filtering
//! - [`fft`] - FFT wrapper with windowing functions
//!
//! ## Example Workflow
//!
//! ```rust,ignore
//! use micarc_analysis::{DecompositionParams, FrequencyBand, PsdParams, decompose, welch_spectrum};
//!
//! // 1. Estimate the PSD of each microphone channel
//! let spectrum = welch_spectrum(&channels, PsdParams::new(50000.0, 8192))?;
//!
//! // 2. Split into broadband and tonal parts
//! let params = DecompositionParams {
//!     peak_band: FrequencyBand::new(50.0, 5000.0)?,
//!     spl_band: FrequencyBand::new(50.0, 10000.0)?,
//!     ..DecompositionParams::default()
//! };
//! let result = decompose(&spectrum, &params)?;
//!
//! // 3. Read off the levels
//! for (ch, tonal) in result.spl.tonal.iter().enumerate() {
//!     println!("ch {ch}: broadband {:.1} dB, tonal {:.1} dB", result.spl.broadband[ch], tonal);
//! }
//! ```
//!
//! Each stage can also be called on its own; later stages take the earlier
//! results as arguments and refuse results computed for another spectrum.

pub mod broadband;
pub mod error;
pub mod fft;
pub mod filter;
pub mod peak_width;
pub mod peaks;
pub mod pipeline;
pub mod psd;
pub mod refine;
pub mod spectrum;
pub mod spl;
pub mod units;

// Re-export main types
pub use broadband::{BroadbandSpectrum, estimate_broadband, median_filter};
pub use error::{AnalysisError, Result};
pub use fft::{Fft, Window};
pub use filter::{ButterworthFilter, FilterKind};
pub use peak_width::{PeakExtent, PeakWidthSet, resolve_peak_widths};
pub use peaks::{PeakSet, detect_peaks, local_maxima};
pub use pipeline::{Decomposition, DecompositionParams, FrequencyBand, decompose};
pub use psd::{welch_psd, welch_spectrum};
pub use refine::{PeakFrequency, refine_peak_frequency, spectral_centroid};
pub use spectrum::{PsdParams, Spectrum, SpectrumId};
pub use spl::{
    P_REF, PeakSplSet, SplResult, broadband_spl, integrate_spl, overall_spl, peak_spl, tonal_spl,
};
pub use units::{MAX_BINS, Units, round_to_nearest_odd};
