//! Error types for spectral decomposition.

use thiserror::Error;

/// Errors raised by the decomposition stages and their numerical collaborators.
///
/// Every variant is a contract violation by the caller. Channels without
/// tonal peaks are not errors; they are carried in-band as empty slots.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// Unit string outside `points` / `Hz`.
    #[error("unknown units '{0}' (expected 'points' or 'Hz')")]
    InvalidUnits(String),

    /// A stage received a predecessor result that was not derived from the
    /// spectrum it is operating on.
    #[error("{stage} was not computed for this spectrum")]
    PrecedingStageMissing {
        /// Name of the missing or mismatched predecessor stage.
        stage: &'static str,
    },

    /// Inputs across stages disagree on the number of channels.
    #[error("channel count mismatch: expected {expected}, found {found}")]
    ChannelCountMismatch {
        /// Channel count of the reference input.
        expected: usize,
        /// Channel count of the offending input.
        found: usize,
    },

    /// A spectrum was built with no channels or no bins.
    #[error("spectrum has no channels or no frequency bins")]
    EmptySpectrum,

    /// Two arrays that must have equal length do not.
    #[error("{what} has length {found}, expected {expected}")]
    LengthMismatch {
        /// Which array is wrong.
        what: &'static str,
        /// Required length.
        expected: usize,
        /// Actual length.
        found: usize,
    },

    /// A scalar parameter is out of its valid domain.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

impl AnalysisError {
    /// Create an invalid parameter error.
    pub fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        AnalysisError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// Fail with [`AnalysisError::ChannelCountMismatch`] unless the counts agree.
    pub(crate) fn check_channels(expected: usize, found: usize) -> Result<()> {
        if expected == found {
            Ok(())
        } else {
            Err(AnalysisError::ChannelCountMismatch { expected, found })
        }
    }
}

/// Convenience result type for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;
