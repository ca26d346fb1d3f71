//! Units for window sizes and search radii expressed in bins or in Hz.

use std::fmt;
use std::str::FromStr;

use crate::error::{AnalysisError, Result};

/// Largest bin count a conversion returns; odd, and small enough that
/// index arithmetic on it cannot overflow.
pub const MAX_BINS: usize = usize::MAX / 2;

/// How a kernel size or search radius is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Units {
    /// Number of frequency bins.
    Points,
    /// Width in Hz, converted to bins through the frequency resolution.
    #[default]
    Hz,
}

impl Units {
    /// Convert `size` to a bin count.
    ///
    /// `Points` rounds to the nearest integer. `Hz` divides by `df` and
    /// rounds to the nearest odd integer, so the result is always odd and
    /// at least 1. Both saturate at [`MAX_BINS`].
    pub fn to_bins(self, size: f64, df: f64) -> Result<usize> {
        if !size.is_finite() || size <= 0.0 {
            return Err(AnalysisError::invalid_parameter(
                "size",
                format!("must be positive and finite, got {size}"),
            ));
        }
        match self {
            Units::Points => {
                let bins = size.round();
                if bins < 1.0 {
                    return Err(AnalysisError::invalid_parameter(
                        "size",
                        format!("{size} points rounds to zero bins"),
                    ));
                }
                Ok((bins as usize).min(MAX_BINS))
            }
            Units::Hz => {
                if !df.is_finite() || df <= 0.0 {
                    return Err(AnalysisError::invalid_parameter(
                        "df",
                        format!("frequency resolution must be positive, got {df}"),
                    ));
                }
                Ok(round_to_nearest_odd(size / df))
            }
        }
    }
}

impl FromStr for Units {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "points" => Ok(Units::Points),
            "Hz" => Ok(Units::Hz),
            other => Err(AnalysisError::InvalidUnits(other.to_string())),
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Units::Points => f.write_str("points"),
            Units::Hz => f.write_str("Hz"),
        }
    }
}

/// Round to the nearest odd integer, never below 1.
///
/// Ties between two odd neighbours (exact even inputs) round away from zero.
/// Inputs beyond [`MAX_BINS`], including infinity, saturate to it.
pub fn round_to_nearest_odd(x: f64) -> usize {
    if x.is_nan() || x <= 1.0 {
        return 1;
    }
    let half = (((x - 1.0) / 2.0).round() as usize).min(MAX_BINS / 2);
    half * 2 + 1
}
