//! Band Plan
//!
//! Resolves the configured frequency ranges (band of interest, noise
//! references) into bin indices for one FFT window length. Built once at
//! startup and shared by every analysis; all range errors are caught here so
//! the per-window path never has to bounds-check.

use std::ops::Range;

use crate::error::DspError;

/// Frequency-domain layout request, in Hz
#[derive(Debug, Clone)]
pub struct BandPlanSpec {
    /// Sample rate in Hz
    pub sample_rate: f64,

    /// Window length in samples (FFT size)
    pub window_len: usize,

    /// Number of equal-width detection bands
    pub bands: usize,

    /// Band of interest, low edge
    pub band_min_hz: f64,

    /// Band of interest, high edge
    pub band_max_hz: f64,

    /// Low noise reference range (contains only ambient noise)
    pub noise_low_hz: (f64, f64),

    /// High noise reference range
    pub noise_high_hz: (f64, f64),

    /// Doppler widening coefficients `(d_min, d_max)`, or `None` to take the
    /// band of interest as configured
    pub doppler: Option<(f64, f64)>,
}

/// Bin-index layout for one window length
///
/// Invariants established at construction:
/// - `band_edge(0) < band_edge(1) < … < band_edge(bands)`, all within the
///   one-sided spectrum
/// - every band is exactly `band_len` bins wide
/// - both noise reference ranges are non-empty and in range
#[derive(Debug, Clone)]
pub struct BandPlan {
    edges: Vec<usize>,
    band_len: usize,
    noise_low: Range<usize>,
    noise_high: Range<usize>,
    spectrum_len: usize,
}

impl BandPlan {
    pub fn new(spec: &BandPlanSpec) -> Result<Self, DspError> {
        if spec.bands == 0 {
            return Err(DspError::EmptyBandPlan("band count is zero".into()));
        }
        if spec.window_len < 4 {
            return Err(DspError::EmptyBandPlan(format!(
                "window of {} samples has no usable spectrum",
                spec.window_len
            )));
        }

        // A moving source smears the siren's fundamental; widening the band
        // of interest by the extreme doppler shifts keeps it inside.
        let (low_hz, high_hz) = match spec.doppler {
            Some((d_min, d_max)) => (spec.band_min_hz * d_min, spec.band_max_hz * d_max),
            None => (spec.band_min_hz, spec.band_max_hz),
        };
        if !(low_hz > 0.0) || !(high_hz > low_hz) {
            return Err(DspError::InvalidBandRange {
                low: low_hz,
                high: high_hz,
                sample_rate: spec.sample_rate,
            });
        }

        let spectrum_len = spec.window_len / 2 - 1;
        let df = spec.sample_rate / spec.window_len as f64;

        let first = (low_hz / df) as usize;
        let last = (high_hz / df) as usize;
        let band_len = (last - first) / spec.bands;
        if band_len == 0 {
            return Err(DspError::EmptyBandPlan(format!(
                "{}..{}Hz resolves to fewer than one bin per band",
                low_hz, high_hz
            )));
        }

        // Truncate the division remainder so every band is equal-width.
        let edges: Vec<usize> = (0..=spec.bands).map(|i| first + i * band_len).collect();
        let top = *edges.last().unwrap_or(&0);
        if top > spectrum_len {
            return Err(DspError::BinOutOfRange {
                bin: top,
                spectrum_len,
            });
        }

        let noise_low = Self::resolve_noise(spec.noise_low_hz, df, spectrum_len)?;
        let noise_high = Self::resolve_noise(spec.noise_high_hz, df, spectrum_len)?;

        Ok(Self {
            edges,
            band_len,
            noise_low,
            noise_high,
            spectrum_len,
        })
    }

    fn resolve_noise(
        (low, high): (f64, f64),
        df: f64,
        spectrum_len: usize,
    ) -> Result<Range<usize>, DspError> {
        let lo = (low / df) as usize;
        let hi = (high / df) as usize;
        if hi <= lo {
            return Err(DspError::EmptyNoiseRange { low, high });
        }
        if hi > spectrum_len {
            return Err(DspError::BinOutOfRange {
                bin: hi,
                spectrum_len,
            });
        }
        Ok(lo..hi)
    }

    /// Number of detection bands
    pub fn bands(&self) -> usize {
        self.edges.len() - 1
    }

    /// Width of every band in bins
    pub fn band_len(&self) -> usize {
        self.band_len
    }

    /// Bin edge `i` (`0..=bands`)
    pub fn band_edge(&self, i: usize) -> usize {
        self.edges[i]
    }

    /// Bin range of band `i`
    pub fn band_range(&self, i: usize) -> Range<usize> {
        self.edges[i]..self.edges[i + 1]
    }

    /// Low noise reference bins
    pub fn noise_low(&self) -> Range<usize> {
        self.noise_low.clone()
    }

    /// High noise reference bins
    pub fn noise_high(&self) -> Range<usize> {
        self.noise_high.clone()
    }

    /// Length of the one-sided spectrum this plan addresses
    pub fn spectrum_len(&self) -> usize {
        self.spectrum_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_spec() -> BandPlanSpec {
        BandPlanSpec {
            sample_rate: 8000.0,
            window_len: 16464,
            bands: 6,
            band_min_hz: 700.0,
            band_max_hz: 1550.0,
            noise_low_hz: (150.0, 510.0),
            noise_high_hz: (1885.0, 3000.0),
            doppler: Some((0.8491, 1.0425)),
        }
    }

    #[test]
    fn test_edges_strictly_increasing_and_in_range() {
        let plan = BandPlan::new(&reference_spec()).unwrap();
        for i in 0..plan.bands() {
            assert!(plan.band_edge(i) < plan.band_edge(i + 1));
        }
        assert!(plan.band_edge(plan.bands()) <= plan.spectrum_len());
    }

    #[test]
    fn test_bands_equal_width_and_contiguous() {
        let plan = BandPlan::new(&reference_spec()).unwrap();
        for i in 0..plan.bands() {
            assert_eq!(plan.band_range(i).len(), plan.band_len());
        }
        for i in 1..plan.bands() {
            assert_eq!(plan.band_range(i - 1).end, plan.band_range(i).start);
        }
    }

    #[test]
    fn test_doppler_widens_band() {
        let mut spec = reference_spec();
        let widened = BandPlan::new(&spec).unwrap();
        spec.doppler = None;
        let plain = BandPlan::new(&spec).unwrap();

        assert!(widened.band_edge(0) < plain.band_edge(0));
        assert!(widened.band_edge(widened.bands()) > plain.band_edge(plain.bands()));
    }

    #[test]
    fn test_reference_bin_arithmetic() {
        // df = 8000 / 16464 ≈ 0.4859 Hz; the widened band is
        // 594.4..1615.9 Hz, so the first edge sits at bin 1223.
        let plan = BandPlan::new(&reference_spec()).unwrap();
        assert_eq!(plan.band_edge(0), 1223);
        assert_eq!(plan.bands(), 6);
        assert_eq!(plan.noise_low(), 308..1049);
    }

    #[test]
    fn test_rejects_inverted_band() {
        let mut spec = reference_spec();
        spec.band_min_hz = 1550.0;
        spec.band_max_hz = 700.0;
        assert!(matches!(
            BandPlan::new(&spec),
            Err(DspError::InvalidBandRange { .. })
        ));
    }

    #[test]
    fn test_rejects_zero_bands() {
        let mut spec = reference_spec();
        spec.bands = 0;
        assert!(matches!(
            BandPlan::new(&spec),
            Err(DspError::EmptyBandPlan(_))
        ));
    }

    #[test]
    fn test_rejects_band_beyond_nyquist() {
        let mut spec = reference_spec();
        spec.band_max_hz = 5000.0; // above 4kHz Nyquist
        assert!(BandPlan::new(&spec).is_err());
    }

    #[test]
    fn test_rejects_empty_noise_range() {
        let mut spec = reference_spec();
        spec.noise_low_hz = (510.0, 150.0);
        assert!(matches!(
            BandPlan::new(&spec),
            Err(DspError::EmptyNoiseRange { .. })
        ));
    }

    #[test]
    fn test_narrow_window_rejected() {
        let mut spec = reference_spec();
        spec.window_len = 16; // one band would be zero bins wide
        assert!(BandPlan::new(&spec).is_err());
    }
}
