//! DSP Error Types

use thiserror::Error;

/// Errors that can occur while building the band plan or running analysis
#[derive(Error, Debug)]
pub enum DspError {
    #[error("Band plan is empty: {0}")]
    EmptyBandPlan(String),

    #[error("Band range {low}Hz..{high}Hz is invalid at sample rate {sample_rate}Hz")]
    InvalidBandRange {
        low: f64,
        high: f64,
        sample_rate: f64,
    },

    #[error("Noise reference range {low}Hz..{high}Hz resolves to no bins")]
    EmptyNoiseRange { low: f64, high: f64 },

    #[error("Bin {bin} is outside the one-sided spectrum (len {spectrum_len})")]
    BinOutOfRange { bin: usize, spectrum_len: usize },

    #[error("Window length mismatch: expected {expected}, got {got}")]
    WindowSizeMismatch { expected: usize, got: usize },

    #[error("Need {expected} band coefficients, got {got}")]
    CoefficientCountMismatch { expected: usize, got: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DspError::InvalidBandRange {
            low: 1550.0,
            high: 700.0,
            sample_rate: 8000.0,
        };
        assert!(err.to_string().contains("1550"));

        let err = DspError::WindowSizeMismatch {
            expected: 16464,
            got: 512,
        };
        assert!(err.to_string().contains("16464"));
    }
}
