//! Detector Configuration
//!
//! Every tuning constant of the pipeline lives here: sampling geometry,
//! frequency plan, detection coefficients, margins and timing limits. A
//! partial JSON file works because every field carries a default matching
//! the reference deployment (8kHz, 2.058s windows, four mics, six bands).

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use siren_dsp::BandPlanSpec;
use siren_platform::Cardinal;

use crate::error::{EngineError, EngineResult};

/// Immutable-for-a-run detector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Sample rate in Hz
    #[serde(default = "default_sample_rate")]
    pub sample_rate: f64,

    /// Window length in samples (chosen so window ≈ 2.058s)
    #[serde(default = "default_window_samples")]
    pub window_samples: usize,

    /// Number of microphone channels (3 or 4, matching the array)
    #[serde(default = "default_channels")]
    pub channels: usize,

    /// Number of detection bands
    #[serde(default = "default_bands")]
    pub bands: usize,

    /// Band of interest, Hz
    #[serde(default = "default_band_min_hz")]
    pub band_min_hz: f64,
    #[serde(default = "default_band_max_hz")]
    pub band_max_hz: f64,

    /// Noise reference ranges known to carry only ambient noise, Hz
    #[serde(default = "default_noise_low")]
    pub noise_low: (f64, f64),
    #[serde(default = "default_noise_high")]
    pub noise_high: (f64, f64),

    /// Per-band detection coefficients
    #[serde(default = "default_band_coeffs")]
    pub band_coeffs: Vec<f64>,

    /// Extreme doppler shift coefficients widening the band of interest
    #[serde(default = "default_doppler_min")]
    pub doppler_min: f64,
    #[serde(default = "default_doppler_max")]
    pub doppler_max: f64,
    #[serde(default = "default_use_doppler")]
    pub use_doppler: bool,

    /// Relative margin before a ratio trend counts as a direction
    #[serde(default = "default_direction_margin")]
    pub direction_margin: f64,

    /// Relative margin under which opposite channels count as a wall echo
    #[serde(default = "default_location_margin")]
    pub location_margin: f64,

    /// Analyses retained per channel (≥ 2 for direction estimation)
    #[serde(default = "default_history_depth")]
    pub history_depth: usize,

    /// Windows without a detection before the display blanks
    #[serde(default = "default_max_cycles")]
    pub max_cycles: u32,

    /// Calibrated inner-loop delay for the sampling cadence
    #[serde(default = "default_sample_delay_us")]
    pub sample_delay_us: u64,

    /// Which cardinal each microphone channel faces
    #[serde(default = "default_channel_layout")]
    pub channel_layout: BTreeMap<u8, Cardinal>,

    /// Relative sampling drift tolerated before the window is dropped
    #[serde(default = "default_timing_tolerance")]
    pub timing_tolerance: f64,

    /// Hard cap on sampling wall time as a multiple of the expected duration
    #[serde(default = "default_max_sample_stretch")]
    pub max_sample_stretch: f64,

    /// Apply a Hann window before the transform (default rectangular)
    #[serde(default)]
    pub use_hann_window: bool,
}

fn default_sample_rate() -> f64 {
    8000.0
}
fn default_window_samples() -> usize {
    16464
}
fn default_channels() -> usize {
    4
}
fn default_bands() -> usize {
    6
}
fn default_band_min_hz() -> f64 {
    700.0
}
fn default_band_max_hz() -> f64 {
    1550.0
}
fn default_noise_low() -> (f64, f64) {
    (150.0, 510.0)
}
fn default_noise_high() -> (f64, f64) {
    (1885.0, 3000.0)
}
fn default_band_coeffs() -> Vec<f64> {
    vec![2.6, 2.5, 2.8, 2.9, 2.9, 2.8]
}
fn default_doppler_min() -> f64 {
    0.8491
}
fn default_doppler_max() -> f64 {
    1.0425
}
fn default_use_doppler() -> bool {
    true
}
fn default_direction_margin() -> f64 {
    0.02
}
fn default_location_margin() -> f64 {
    0.10
}
fn default_history_depth() -> usize {
    2
}
fn default_max_cycles() -> u32 {
    2
}
fn default_sample_delay_us() -> u64 {
    21
}
fn default_channel_layout() -> BTreeMap<u8, Cardinal> {
    BTreeMap::from([
        (0, Cardinal::South),
        (1, Cardinal::West),
        (2, Cardinal::East),
        (3, Cardinal::North),
    ])
}
fn default_timing_tolerance() -> f64 {
    0.02
}
fn default_max_sample_stretch() -> f64 {
    1.2
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            window_samples: default_window_samples(),
            channels: default_channels(),
            bands: default_bands(),
            band_min_hz: default_band_min_hz(),
            band_max_hz: default_band_max_hz(),
            noise_low: default_noise_low(),
            noise_high: default_noise_high(),
            band_coeffs: default_band_coeffs(),
            doppler_min: default_doppler_min(),
            doppler_max: default_doppler_max(),
            use_doppler: default_use_doppler(),
            direction_margin: default_direction_margin(),
            location_margin: default_location_margin(),
            history_depth: default_history_depth(),
            max_cycles: default_max_cycles(),
            sample_delay_us: default_sample_delay_us(),
            channel_layout: default_channel_layout(),
            timing_tolerance: default_timing_tolerance(),
            max_sample_stretch: default_max_sample_stretch(),
            use_hann_window: false,
        }
    }
}

impl DetectorConfig {
    /// Load a configuration file, falling back to defaults for absent fields
    pub fn load(path: &Path) -> EngineResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("{}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| EngineError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Check the fatal-at-startup invariants
    pub fn validate(&self) -> EngineResult<()> {
        if !(self.sample_rate > 0.0) {
            return Err(EngineError::Config(format!(
                "sample rate must be positive, got {}",
                self.sample_rate
            )));
        }
        if self.window_samples < 16 {
            return Err(EngineError::Config(format!(
                "window of {} samples is too short to analyze",
                self.window_samples
            )));
        }
        if !(3..=4).contains(&self.channels) {
            return Err(EngineError::Config(format!(
                "channel count must be 3 or 4, got {}",
                self.channels
            )));
        }
        if self.bands == 0 {
            return Err(EngineError::Config("band count must be non-zero".into()));
        }
        if self.band_coeffs.len() != self.bands {
            return Err(EngineError::Config(format!(
                "need {} band coefficients, got {}",
                self.bands,
                self.band_coeffs.len()
            )));
        }
        if self.history_depth < 2 {
            return Err(EngineError::Config(format!(
                "history depth must be at least 2, got {}",
                self.history_depth
            )));
        }
        if !(self.band_min_hz > 0.0 && self.band_max_hz > self.band_min_hz) {
            return Err(EngineError::Config(format!(
                "band of interest {}..{}Hz is invalid",
                self.band_min_hz, self.band_max_hz
            )));
        }
        if self.use_doppler && !(self.doppler_min > 0.0 && self.doppler_min <= 1.0 && self.doppler_max >= 1.0)
        {
            return Err(EngineError::Config(format!(
                "doppler coefficients must satisfy 0 < min ≤ 1 ≤ max, got {}..{}",
                self.doppler_min, self.doppler_max
            )));
        }
        for (label, (low, high)) in [("low", self.noise_low), ("high", self.noise_high)] {
            if !(low >= 0.0 && high > low) {
                return Err(EngineError::Config(format!(
                    "{} noise reference {}..{}Hz is invalid",
                    label, low, high
                )));
            }
        }
        if !(self.timing_tolerance > 0.0) {
            return Err(EngineError::Config(
                "timing tolerance must be positive".into(),
            ));
        }
        if !(self.max_sample_stretch > 1.0) {
            return Err(EngineError::Config(
                "max sample stretch must exceed 1.0".into(),
            ));
        }

        if self.channel_layout.len() != self.channels {
            return Err(EngineError::Config(format!(
                "channel layout maps {} channels, array has {}",
                self.channel_layout.len(),
                self.channels
            )));
        }
        for ch in 0..self.channels as u8 {
            if !self.channel_layout.contains_key(&ch) {
                return Err(EngineError::Config(format!(
                    "channel layout is missing channel {}",
                    ch
                )));
            }
        }
        let mut cardinals: Vec<Cardinal> = self.channel_layout.values().copied().collect();
        cardinals.sort_by_key(|c| *c as u8);
        cardinals.dedup();
        if cardinals.len() != self.channels {
            return Err(EngineError::Config(
                "channel layout assigns the same cardinal twice".into(),
            ));
        }

        Ok(())
    }

    /// Band plan request for this configuration
    pub fn band_plan_spec(&self) -> BandPlanSpec {
        BandPlanSpec {
            sample_rate: self.sample_rate,
            window_len: self.window_samples,
            bands: self.bands,
            band_min_hz: self.band_min_hz,
            band_max_hz: self.band_max_hz,
            noise_low_hz: self.noise_low,
            noise_high_hz: self.noise_high,
            doppler: self
                .use_doppler
                .then_some((self.doppler_min, self.doppler_max)),
        }
    }

    /// Nominal wall time of one sampling window
    pub fn window_duration(&self) -> Duration {
        Duration::from_secs_f64(self.window_samples as f64 / self.sample_rate)
    }

    /// Channel layout as a dense per-channel table
    pub fn layout_table(&self) -> Vec<Cardinal> {
        (0..self.channels as u8)
            .map(|ch| self.channel_layout[&ch])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = DetectorConfig::default();
        config.validate().unwrap();

        assert_eq!(config.sample_rate, 8000.0);
        assert_eq!(config.window_samples, 16464);
        // ≈ 2.058s windows
        assert!((config.window_duration().as_secs_f64() - 2.058).abs() < 1e-9);
    }

    #[test]
    fn test_partial_file_gets_defaults() {
        let config: DetectorConfig =
            serde_json::from_str(r#"{ "channels": 3, "sample_delay_us": 55 }"#).unwrap();
        assert_eq!(config.channels, 3);
        assert_eq!(config.sample_delay_us, 55);
        assert_eq!(config.bands, 6);
        assert_eq!(config.band_coeffs.len(), 6);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let config = DetectorConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let back: DetectorConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(back.window_samples, config.window_samples);
        assert_eq!(back.channel_layout, config.channel_layout);
        assert_eq!(back.band_coeffs, config.band_coeffs);
    }

    #[test]
    fn test_rejects_shallow_history() {
        let config = DetectorConfig {
            history_depth: 1,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_rejects_coefficient_mismatch() {
        let config = DetectorConfig {
            band_coeffs: vec![2.5; 4],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unmapped_channel() {
        let mut config = DetectorConfig {
            channels: 3,
            ..Default::default()
        };
        config.channel_layout = BTreeMap::from([
            (0, Cardinal::South),
            (1, Cardinal::West),
            (4, Cardinal::North),
        ]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_duplicate_cardinal() {
        let mut config = DetectorConfig::default();
        config.channel_layout.insert(3, Cardinal::South);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_two_channel_array() {
        let config = DetectorConfig {
            channels: 2,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_inverted_noise_range() {
        let config = DetectorConfig {
            noise_low: (510.0, 150.0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_layout_table_ordering() {
        let table = DetectorConfig::default().layout_table();
        assert_eq!(
            table,
            vec![
                Cardinal::South,
                Cardinal::West,
                Cardinal::East,
                Cardinal::North
            ]
        );
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let result = DetectorConfig::load(Path::new("/nonexistent/sirend.json"));
        assert!(matches!(result, Err(EngineError::Config(_))));
    }
}
