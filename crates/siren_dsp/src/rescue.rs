//! Boundary Rescue
//!
//! A wailing siren's amplitude minimum can land exactly on the join between
//! two windows, leaving each window with only a weak detection. Re-analyzing
//! a synthetic window made of the second half of the previous window and the
//! first half of the current one recovers those detections. This is the only
//! temporal coupling between consecutive windows, kept as a free function so
//! two synthetic windows can drive it directly in tests.

use crate::analysis::{analyze, BandAnalysis};
use crate::band_plan::BandPlan;
use crate::detector::{detect, Detection};
use crate::error::DspError;
use crate::spectrum::SpectrumAnalyzer;

/// Re-evaluate a weak detection across the window boundary
///
/// Returns `Some((analysis, detection))` only when the half-shifted window
/// fires strictly more bands than `baseline`; the caller then replaces its
/// analysis and detection with the rescued pair. Detection count therefore
/// never decreases through rescue.
pub fn rescue(
    analyzer: &mut SpectrumAnalyzer,
    plan: &BandPlan,
    coeffs: &[f64],
    previous: &[f64],
    current: &[f64],
    baseline: &Detection,
) -> Result<Option<(BandAnalysis, Detection)>, DspError> {
    let stitched = stitch_halves(previous, current);
    let spectrum = analyzer.process(&stitched)?;
    let analysis = analyze(spectrum, plan);
    let detection = detect(&analysis, coeffs)?;

    if detection.count() > baseline.count() {
        Ok(Some((analysis, detection)))
    } else {
        Ok(None)
    }
}

/// Second half of `previous` followed by first half of `current`
pub fn stitch_halves(previous: &[f64], current: &[f64]) -> Vec<f64> {
    let half = previous.len() / 2;
    let mut stitched = Vec::with_capacity(previous.len());
    stitched.extend_from_slice(&previous[half..]);
    stitched.extend_from_slice(&current[..half]);
    stitched
}
