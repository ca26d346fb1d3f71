//! Zero-phase Butterworth filtering of time series.
//!
//! The filter is a cascade of second-order sections built with the RBJ
//! cookbook formulas at the Butterworth pole Qs, plus a first-order section
//! for odd orders. [`ButterworthFilter::filtfilt`] runs it forward and
//! backward, which cancels the phase response and squares the magnitude
//! response.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use crate::error::{AnalysisError, Result};

/// Highest supported filter order.
pub const MAX_ORDER: usize = 16;

/// Response type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Pass below the cutoff.
    Lowpass,
    /// Pass above the cutoff.
    Highpass,
}

impl FromStr for FilterKind {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "lowpass" | "low" | "lp" => Ok(FilterKind::Lowpass),
            "highpass" | "high" | "hp" => Ok(FilterKind::Highpass),
            _ => Err(AnalysisError::invalid_parameter(
                "kind",
                format!("unknown filter type '{s}'"),
            )),
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterKind::Lowpass => f.write_str("lowpass"),
            FilterKind::Highpass => f.write_str("highpass"),
        }
    }
}

/// One section in transposed direct form II, coefficients normalised by a0.
#[derive(Debug, Clone, Copy)]
struct Section {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

impl Section {
    fn from_unnormalised(b0: f64, b1: f64, b2: f64, a0: f64, a1: f64, a2: f64) -> Self {
        let a0_inv = 1.0 / a0;
        Self {
            b0: b0 * a0_inv,
            b1: b1 * a0_inv,
            b2: b2 * a0_inv,
            a1: a1 * a0_inv,
            a2: a2 * a0_inv,
        }
    }

    /// RBJ cookbook biquad.
    fn second_order(kind: FilterKind, cutoff: f64, q: f64, sample_rate: f64) -> Self {
        let omega = 2.0 * PI * cutoff / sample_rate;
        let cos_omega = omega.cos();
        let alpha = omega.sin() / (2.0 * q);

        let (b0, b1, b2) = match kind {
            FilterKind::Lowpass => ((1.0 - cos_omega) / 2.0, 1.0 - cos_omega, (1.0 - cos_omega) / 2.0),
            FilterKind::Highpass => ((1.0 + cos_omega) / 2.0, -(1.0 + cos_omega), (1.0 + cos_omega) / 2.0),
        };
        Self::from_unnormalised(b0, b1, b2, 1.0 + alpha, -2.0 * cos_omega, 1.0 - alpha)
    }

    /// Bilinear transform of the first-order Butterworth prototype.
    fn first_order(kind: FilterKind, cutoff: f64, sample_rate: f64) -> Self {
        let k = (PI * cutoff / sample_rate).tan();
        let (b0, b1) = match kind {
            FilterKind::Lowpass => (k, k),
            FilterKind::Highpass => (1.0, -1.0),
        };
        Self::from_unnormalised(b0, b1, 0.0, 1.0 + k, k - 1.0, 0.0)
    }

    fn dc_gain(&self) -> f64 {
        (self.b0 + self.b1 + self.b2) / (1.0 + self.a1 + self.a2)
    }

    /// State that makes a unit step input produce its steady-state output.
    fn step_state(&self) -> [f64; 2] {
        let y = self.dc_gain();
        [y - self.b0, self.b2 - self.a2 * y]
    }

    fn run(&self, data: &mut [f64], mut state: [f64; 2]) {
        for x in data.iter_mut() {
            let input = *x;
            let output = self.b0 * input + state[0];
            state[0] = self.b1 * input - self.a1 * output + state[1];
            state[1] = self.b2 * input - self.a2 * output;
            *x = output;
        }
    }
}

/// Butterworth low- or high-pass filter as cascaded sections.
#[derive(Debug, Clone)]
pub struct ButterworthFilter {
    kind: FilterKind,
    order: usize,
    cutoff: f64,
    sections: Vec<Section>,
}

impl ButterworthFilter {
    /// Design a filter of `order` with its -3 dB point at `cutoff_hz`.
    pub fn new(kind: FilterKind, order: usize, cutoff_hz: f64, sample_rate: f64) -> Result<Self> {
        if order == 0 || order > MAX_ORDER {
            return Err(AnalysisError::invalid_parameter(
                "order",
                format!("must be in 1..={MAX_ORDER}, got {order}"),
            ));
        }
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(AnalysisError::invalid_parameter(
                "sample_rate",
                format!("must be positive, got {sample_rate}"),
            ));
        }
        if !cutoff_hz.is_finite() || cutoff_hz <= 0.0 || cutoff_hz >= sample_rate / 2.0 {
            return Err(AnalysisError::invalid_parameter(
                "cutoff_hz",
                format!("{cutoff_hz} Hz is outside (0, {})", sample_rate / 2.0),
            ));
        }

        let mut sections: Vec<Section> = (0..order / 2)
            .map(|k| {
                let q = 1.0 / (2.0 * (PI * (2 * k + 1) as f64 / (2 * order) as f64).sin());
                Section::second_order(kind, cutoff_hz, q, sample_rate)
            })
            .collect();
        if order % 2 == 1 {
            sections.push(Section::first_order(kind, cutoff_hz, sample_rate));
        }

        Ok(Self {
            kind,
            order,
            cutoff: cutoff_hz,
            sections,
        })
    }

    /// Response type.
    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    /// Filter order.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Cutoff frequency in Hz.
    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Forward-backward filter `signal` with zero phase.
    ///
    /// Both ends are extended by odd reflection and each pass starts from
    /// the steady state of its first sample, which suppresses start-up
    /// transients.
    pub fn filtfilt(&self, signal: &[f32]) -> Vec<f32> {
        let n = signal.len();
        if n < 2 {
            return signal.to_vec();
        }
        let pad = (3 * (2 * self.sections.len() + 1)).min(n - 1);

        let first = signal[0] as f64;
        let last = signal[n - 1] as f64;
        let mut ext: Vec<f64> = Vec::with_capacity(n + 2 * pad);
        ext.extend((1..=pad).rev().map(|i| 2.0 * first - signal[i] as f64));
        ext.extend(signal.iter().map(|&x| x as f64));
        ext.extend((1..=pad).map(|i| 2.0 * last - signal[n - 1 - i] as f64));

        self.run_cascade(&mut ext);
        ext.reverse();
        self.run_cascade(&mut ext);
        ext.reverse();

        ext[pad..pad + n].iter().map(|&y| y as f32).collect()
    }

    fn run_cascade(&self, data: &mut [f64]) {
        let mut level = data[0];
        for section in &self.sections {
            let [z1, z2] = section.step_state();
            section.run(data, [z1 * level, z2 * level]);
            level *= section.dc_gain();
        }
    }
}
