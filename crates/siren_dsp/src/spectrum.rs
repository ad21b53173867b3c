//! Spectrum Engine
//!
//! Real-to-complex FFT of one sample window, reduced to a one-sided
//! normalized magnitude spectrum. The plan and all working buffers are
//! allocated once and reused every window, so the per-window path is
//! allocation-free.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::error::DspError;

/// Plan-style FFT handle
///
/// Owns the forward plan, the complex working buffer, the FFT scratch and
/// the magnitude output for one window length. `process` borrows it mutably;
/// the returned spectrum is valid until the next call.
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f64>>,
    window_len: usize,
    buffer: Vec<Complex<f64>>,
    scratch: Vec<Complex<f64>>,
    magnitude: Vec<f64>,
    /// Precomputed Hann table, `None` for the default rectangular window
    hann: Option<Vec<f64>>,
}

impl SpectrumAnalyzer {
    /// Create an analyzer for windows of `window_len` samples (rectangular)
    pub fn new(window_len: usize) -> Self {
        Self::build(window_len, false)
    }

    /// Create an analyzer that applies a Hann window before the transform
    pub fn with_hann(window_len: usize) -> Self {
        Self::build(window_len, true)
    }

    fn build(window_len: usize, hann: bool) -> Self {
        let fft = FftPlanner::<f64>::new().plan_fft_forward(window_len);
        let scratch_len = fft.get_inplace_scratch_len();

        let hann = hann.then(|| {
            (0..window_len)
                .map(|i| {
                    0.5 * (1.0
                        - (2.0 * std::f64::consts::PI * i as f64 / (window_len - 1) as f64).cos())
                })
                .collect()
        });

        Self {
            fft,
            window_len,
            buffer: vec![Complex::new(0.0, 0.0); window_len],
            scratch: vec![Complex::new(0.0, 0.0); scratch_len],
            magnitude: vec![0.0; window_len / 2 - 1],
            hann,
        }
    }

    /// Window length this analyzer was planned for
    pub fn window_len(&self) -> usize {
        self.window_len
    }

    /// Length of the one-sided spectrum produced by `process`
    pub fn spectrum_len(&self) -> usize {
        self.magnitude.len()
    }

    /// Transform one window into the normalized one-sided magnitude spectrum
    ///
    /// Bin 0 is the DC term divided by the window length; every other bin is
    /// `2·|X_k| / N`, so an on-bin sine of amplitude `A` reads back as `A`.
    pub fn process(&mut self, window: &[f64]) -> Result<&[f64], DspError> {
        if window.len() != self.window_len {
            return Err(DspError::WindowSizeMismatch {
                expected: self.window_len,
                got: window.len(),
            });
        }

        match &self.hann {
            Some(table) => {
                for (slot, (&sample, &coeff)) in
                    self.buffer.iter_mut().zip(window.iter().zip(table.iter()))
                {
                    *slot = Complex::new(sample * coeff, 0.0);
                }
            }
            None => {
                for (slot, &sample) in self.buffer.iter_mut().zip(window.iter()) {
                    *slot = Complex::new(sample, 0.0);
                }
            }
        }

        self.fft
            .process_with_scratch(&mut self.buffer, &mut self.scratch);

        let n = self.window_len as f64;
        self.magnitude[0] = self.buffer[0].re / n;
        for (k, slot) in self.magnitude.iter_mut().enumerate().skip(1) {
            *slot = 2.0 * self.buffer[k].norm() / n;
        }

        Ok(&self.magnitude)
    }
}

/// Dump a magnitude spectrum as `frequency: magnitude` lines for offline
/// threshold tuning. `df` is the bin width in Hz.
pub fn write_spectrum(path: &Path, magnitude: &[f64], df: f64) -> std::io::Result<()> {
    let mut out = BufWriter::new(fs::File::create(path)?);
    for (i, mag) in magnitude.iter().enumerate() {
        writeln!(out, "{:.1}: {:.6}", i as f64 * df, mag)?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    const N: usize = 1024;

    fn sine(bin: usize, amplitude: f64) -> Vec<f64> {
        (0..N)
            .map(|i| {
                amplitude * (2.0 * std::f64::consts::PI * bin as f64 * i as f64 / N as f64).sin()
            })
            .collect()
    }

    #[test]
    fn test_silence_is_all_zero() {
        let mut analyzer = SpectrumAnalyzer::new(N);
        let spectrum = analyzer.process(&vec![0.0; N]).unwrap();
        assert!(spectrum.iter().all(|&m| m == 0.0));
    }

    #[test]
    fn test_on_bin_sine_amplitude_recovery() {
        let mut analyzer = SpectrumAnalyzer::new(N);
        let spectrum = analyzer.process(&sine(10, 2.0)).unwrap();

        assert!((spectrum[10] - 2.0).abs() < 1e-9);
        // Leakage-free: neighbours stay at rounding-noise level
        assert!(spectrum[9] < 1e-9);
        assert!(spectrum[11] < 1e-9);
    }

    #[test]
    fn test_dc_normalization() {
        let mut analyzer = SpectrumAnalyzer::new(N);
        let spectrum = analyzer.process(&vec![3.5; N]).unwrap();

        assert!((spectrum[0] - 3.5).abs() < 1e-9);
        assert!(spectrum[1] < 1e-9);
    }

    #[test]
    fn test_spectrum_length() {
        let mut analyzer = SpectrumAnalyzer::new(N);
        let spectrum = analyzer.process(&vec![0.0; N]).unwrap();
        assert_eq!(spectrum.len(), N / 2 - 1);
        assert_eq!(analyzer.spectrum_len(), N / 2 - 1);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let mut analyzer = SpectrumAnalyzer::new(N);
        assert!(matches!(
            analyzer.process(&vec![0.0; N / 2]),
            Err(DspError::WindowSizeMismatch { .. })
        ));
    }

    #[test]
    fn test_hann_window_tapers_edges() {
        let mut rect = SpectrumAnalyzer::new(N);
        let mut hann = SpectrumAnalyzer::with_hann(N);

        // Off-bin tone: the Hann analyzer concentrates more energy near the
        // peak than the rectangular one does far from it.
        let tone: Vec<f64> = (0..N)
            .map(|i| (2.0 * std::f64::consts::PI * 10.5 * i as f64 / N as f64).sin())
            .collect();

        let far_rect = rect.process(&tone).unwrap()[200];
        let far_hann = hann.process(&tone).unwrap()[200];
        assert!(far_hann < far_rect);
    }

    #[test]
    fn test_spectrum_dump_format() {
        let mut analyzer = SpectrumAnalyzer::new(N);
        let spectrum = analyzer.process(&sine(10, 2.0)).unwrap().to_vec();

        let path = std::env::temp_dir().join("sirend_spectrum_dump.txt");
        write_spectrum(&path, &spectrum, 8000.0 / N as f64).unwrap();

        let dump = std::fs::read_to_string(&path).unwrap();
        assert_eq!(dump.lines().count(), spectrum.len());
        // Bin 10 of a 1024-point window at 8kHz sits at 78.1Hz
        assert!(dump.lines().nth(10).unwrap().starts_with("78.1:"));
    }

    #[test]
    fn test_reusable_across_windows() {
        let mut analyzer = SpectrumAnalyzer::new(N);
        analyzer.process(&sine(10, 1.0)).unwrap();
        let spectrum = analyzer.process(&sine(20, 1.0)).unwrap();

        // Second call must not see residue from the first
        assert!(spectrum[10] < 1e-9);
        assert!((spectrum[20] - 1.0).abs() < 1e-9);
    }
}
