//! Multithreshold Detector
//!
//! A channel detects a siren when more than half of the bands individually
//! exceed their tuned coefficient. Requiring a majority of bands rejects
//! narrowband interferers that light up a single band.

use crate::analysis::BandAnalysis;
use crate::error::DspError;

/// Per-band threshold outcome for one analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    bands: Vec<bool>,
    count: usize,
}

impl Detection {
    /// Which bands crossed their coefficient
    pub fn bands(&self) -> &[bool] {
        &self.bands
    }

    /// Number of bands that crossed
    pub fn count(&self) -> usize {
        self.count
    }

    /// Strictly more than half the bands fired
    pub fn is_positive(&self) -> bool {
        self.count > self.bands.len() / 2
    }

    /// Some bands fired but not a majority; candidate for boundary rescue
    pub fn is_weak(&self) -> bool {
        self.count > 0 && !self.is_positive()
    }
}

/// Threshold `analysis` against the per-band coefficients
pub fn detect(analysis: &BandAnalysis, coeffs: &[f64]) -> Result<Detection, DspError> {
    let ratios = analysis.band_ratios();
    if coeffs.len() != ratios.len() {
        return Err(DspError::CoefficientCountMismatch {
            expected: ratios.len(),
            got: coeffs.len(),
        });
    }

    let bands: Vec<bool> = ratios
        .iter()
        .zip(coeffs.iter())
        .map(|(ratio, coeff)| ratio >= coeff)
        .collect();
    let count = bands.iter().filter(|&&b| b).count();

    Ok(Detection { bands, count })
}
