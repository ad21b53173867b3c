//! Band Analyzer
//!
//! Reduces a magnitude spectrum to the adaptive noise floor and the per-band
//! average ratios the detector thresholds against. Ratios are dimensionless:
//! scaling every input sample by a positive constant leaves them unchanged,
//! which is what makes fixed per-band coefficients workable across gain
//! setups.

use crate::band_plan::BandPlan;

/// Reduction of one window: noise floor plus one ratio per band
///
/// Immutable value type; the orchestrator copies it into the per-channel
/// history ring.
#[derive(Debug, Clone, PartialEq)]
pub struct BandAnalysis {
    noise_floor: f64,
    band_ratios: Vec<f64>,
}

impl BandAnalysis {
    /// Average spectral magnitude over the two noise reference ranges
    pub fn noise_floor(&self) -> f64 {
        self.noise_floor
    }

    /// Per-band average magnitude divided by the noise floor
    pub fn band_ratios(&self) -> &[f64] {
        &self.band_ratios
    }

    /// A frame with no measurable ambient noise (all-zero input)
    pub fn is_silent(&self) -> bool {
        self.noise_floor == 0.0
    }

    /// Mean of all band ratios; the location estimator's per-channel level
    pub fn band_mean(&self) -> f64 {
        self.band_ratios.iter().sum::<f64>() / self.band_ratios.len() as f64
    }

    /// Mean of the band ratios restricted to bands that individually crossed
    /// their coefficient; the direction estimator's window energy
    pub fn gated_mean(&self, coeffs: &[f64]) -> f64 {
        let sum: f64 = self
            .band_ratios
            .iter()
            .zip(coeffs.iter())
            .filter(|(ratio, coeff)| *ratio >= *coeff)
            .map(|(ratio, _)| ratio)
            .sum();
        sum / self.band_ratios.len() as f64
    }

    #[cfg(test)]
    pub(crate) fn from_ratios(noise_floor: f64, band_ratios: Vec<f64>) -> Self {
        Self {
            noise_floor,
            band_ratios,
        }
    }
}

/// Reduce `spectrum` under `plan`
///
/// A silent frame (zero noise floor) yields all-zero ratios rather than a
/// division by zero; the detector then sees nothing to threshold.
pub fn analyze(spectrum: &[f64], plan: &BandPlan) -> BandAnalysis {
    let noise_sum: f64 = spectrum[plan.noise_low()].iter().sum::<f64>()
        + spectrum[plan.noise_high()].iter().sum::<f64>();
    let noise_bins = plan.noise_low().len() + plan.noise_high().len();
    let noise_floor = noise_sum / noise_bins as f64;

    let band_ratios = (0..plan.bands())
        .map(|i| {
            if noise_floor == 0.0 {
                return 0.0;
            }
            let band_sum: f64 = spectrum[plan.band_range(i)].iter().sum();
            band_sum / plan.band_len() as f64 / noise_floor
        })
        .collect();

    BandAnalysis {
        noise_floor,
        band_ratios,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::band_plan::BandPlanSpec;
    use crate::spectrum::SpectrumAnalyzer;

    /// Plan with easy round numbers: df = 2.5Hz, 4 bands of 20 bins
    fn small_plan() -> BandPlan {
        BandPlan::new(&BandPlanSpec {
            sample_rate: 1000.0,
            window_len: 400,
            bands: 4,
            band_min_hz: 100.0,
            band_max_hz: 300.0,
            noise_low_hz: (25.0, 75.0),
            noise_high_hz: (350.0, 450.0),
            doppler: None,
        })
        .unwrap()
    }

    #[test]
    fn test_flat_spectrum_gives_unit_ratios() {
        let plan = small_plan();
        let spectrum = vec![1.0; plan.spectrum_len()];
        let analysis = analyze(&spectrum, &plan);

        assert!((analysis.noise_floor() - 1.0).abs() < 1e-12);
        for &ratio in analysis.band_ratios() {
            assert!((ratio - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_silent_frame_zeroes_ratios() {
        let plan = small_plan();
        let analysis = analyze(&vec![0.0; plan.spectrum_len()], &plan);

        assert!(analysis.is_silent());
        assert!(analysis.band_ratios().iter().all(|&r| r == 0.0));
    }

    #[test]
    fn test_single_hot_band() {
        let plan = small_plan();
        let mut spectrum = vec![1.0; plan.spectrum_len()];
        for bin in plan.band_range(2) {
            spectrum[bin] = 5.0;
        }
        let analysis = analyze(&spectrum, &plan);

        assert!((analysis.band_ratios()[2] - 5.0).abs() < 1e-12);
        assert!((analysis.band_ratios()[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_ratios_scale_invariant_on_raw_spectrum() {
        let plan = small_plan();
        let spectrum: Vec<f64> = (0..plan.spectrum_len())
            .map(|i| 0.5 + (i % 7) as f64)
            .collect();
        let scaled: Vec<f64> = spectrum.iter().map(|m| m * 37.5).collect();

        let a = analyze(&spectrum, &plan);
        let b = analyze(&scaled, &plan);
        for (x, y) in a.band_ratios().iter().zip(b.band_ratios()) {
            assert!((x - y).abs() < 1e-9);
        }
    }

    #[test]
    fn test_ratios_scale_invariant_through_fft() {
        let n = 1024;
        let plan = BandPlan::new(&BandPlanSpec {
            sample_rate: 8000.0,
            window_len: n,
            bands: 6,
            band_min_hz: 700.0,
            band_max_hz: 1550.0,
            noise_low_hz: (150.0, 510.0),
            noise_high_hz: (1885.0, 3000.0),
            doppler: None,
        })
        .unwrap();

        // Deterministic wideband signal: chirp through the band plus
        // pseudo-random noise for a non-zero floor.
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        let mut noise = move || {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (state >> 33) as f64 / (1u64 << 31) as f64 - 1.0
        };
        let window: Vec<f64> = (0..n)
            .map(|i| {
                let t = i as f64 / 8000.0;
                let f = 700.0 + 850.0 * i as f64 / n as f64;
                100.0 * (2.0 * std::f64::consts::PI * f * t).sin() + noise()
            })
            .collect();
        let scaled: Vec<f64> = window.iter().map(|s| s * 3.0).collect();

        let mut analyzer = SpectrumAnalyzer::new(n);
        let a = analyze(analyzer.process(&window).unwrap(), &plan);
        let b = analyze(analyzer.process(&scaled).unwrap(), &plan);

        for (x, y) in a.band_ratios().iter().zip(b.band_ratios()) {
            let tolerance = 1e-6 * x.abs().max(1.0);
            assert!((x - y).abs() < tolerance, "{} vs {}", x, y);
        }
    }

    #[test]
    fn test_band_mean() {
        let analysis = BandAnalysis::from_ratios(1.0, vec![1.0, 2.0, 3.0, 6.0]);
        assert!((analysis.band_mean() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_gated_mean_counts_only_crossing_bands() {
        let analysis = BandAnalysis::from_ratios(1.0, vec![4.0, 1.0, 8.0, 1.0]);
        let coeffs = [3.0, 3.0, 3.0, 3.0];
        // (4 + 8) / 4 bands
        assert!((analysis.gated_mean(&coeffs) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_gated_mean_zero_when_nothing_crosses() {
        let analysis = BandAnalysis::from_ratios(1.0, vec![1.0, 1.0, 1.0, 1.0]);
        assert_eq!(analysis.gated_mean(&[3.0, 3.0, 3.0, 3.0]), 0.0);
    }
}
