//! Replay and Synthetic ADC Backends
//!
//! `WavReplayAdc` feeds a recorded capture through the pipeline exactly as
//! the hardware would have, rescaled to the converter's 12-bit range.
//! `ChirpAdc` generates deterministic siren-like sweeps for self-test and
//! property tests. Both implement `AdcChannel`, so the pipeline cannot tell
//! them from the real converter.

use std::path::Path;

use crate::error::PlatformError;
use crate::traits::AdcChannel;

/// WAV-backed replay of a multi-channel capture
///
/// File channels map one-to-one onto mic channels; a mono file is fanned out
/// to every channel. The source running dry surfaces as `ReplayExhausted`,
/// which the caller treats as end of input rather than a hardware fault.
pub struct WavReplayAdc {
    /// De-interleaved samples, already rescaled to 12 bits
    channels: Vec<Vec<u16>>,
    /// Independent read position per channel
    cursors: Vec<usize>,
}

impl WavReplayAdc {
    pub fn open(path: &Path, channels_needed: usize) -> Result<Self, PlatformError> {
        let mut reader = hound::WavReader::open(path)
            .map_err(|e| PlatformError::ReplayDecode(e.to_string()))?;
        let spec = reader.spec();
        let file_channels = spec.channels as usize;

        if file_channels != 1 && file_channels < channels_needed {
            return Err(PlatformError::ReplayChannelMismatch {
                need: channels_needed,
                got: file_channels,
            });
        }

        // Rescale whatever the file carries to unsigned 12-bit counts.
        let interleaved: Vec<u16> = match spec.sample_format {
            hound::SampleFormat::Int => {
                let shift = spec.bits_per_sample.saturating_sub(12) as u32;
                let offset = 1i64 << (spec.bits_per_sample - 1);
                reader
                    .samples::<i32>()
                    .map(|s| {
                        s.map(|v| (((v as i64 + offset) >> shift) as u16).min(4095))
                            .map_err(|e| PlatformError::ReplayDecode(e.to_string()))
                    })
                    .collect::<Result<_, _>>()?
            }
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .map(|s| {
                    s.map(|v| ((v.clamp(-1.0, 1.0) * 0.5 + 0.5) * 4095.0) as u16)
                        .map_err(|e| PlatformError::ReplayDecode(e.to_string()))
                })
                .collect::<Result<_, _>>()?,
        };

        let frames = interleaved.len() / file_channels;
        let channels = (0..channels_needed)
            .map(|ch| {
                let source = if file_channels == 1 { 0 } else { ch };
                (0..frames)
                    .map(|frame| interleaved[frame * file_channels + source])
                    .collect()
            })
            .collect();

        Ok(Self {
            channels,
            cursors: vec![0; channels_needed],
        })
    }

    /// Frames remaining on the shortest-read channel
    pub fn frames_left(&self) -> usize {
        self.channels
            .iter()
            .zip(&self.cursors)
            .map(|(data, &cursor)| data.len() - cursor)
            .min()
            .unwrap_or(0)
    }
}

impl AdcChannel for WavReplayAdc {
    fn read_sample(&mut self, channel: u8) -> Result<u16, PlatformError> {
        let ch = channel as usize;
        if ch >= self.channels.len() {
            return Err(PlatformError::NoSuchChannel(channel));
        }
        let cursor = self.cursors[ch];
        let sample = *self
            .channels[ch]
            .get(cursor)
            .ok_or(PlatformError::ReplayExhausted)?;
        self.cursors[ch] = cursor + 1;
        Ok(sample)
    }
}

/// Deterministic siren-like signal generator
///
/// Each channel carries `offset + gain(t)·amplitude·sin(φ)` plus a uniform
/// noise bed, quantized to the 12-bit range. The instantaneous frequency
/// sweeps the configured range once per period, which is what a wail does
/// over an analysis window. Fully reproducible: same construction, same
/// samples.
pub struct ChirpAdc {
    sample_rate: f64,
    sweep: (f64, f64),
    sweep_period: f64,
    offset: f64,
    noise_amplitude: f64,
    amplitudes: Vec<f64>,
    /// Linear amplitude growth per second, per channel (0 = steady)
    ramps: Vec<f64>,
    phases: Vec<f64>,
    cursors: Vec<u64>,
    noise_states: Vec<u64>,
}

impl ChirpAdc {
    pub fn new(channels: usize, sample_rate: f64) -> Self {
        Self {
            sample_rate,
            sweep: (700.0, 1550.0),
            sweep_period: 2.0,
            offset: 2048.0,
            noise_amplitude: 0.0,
            amplitudes: vec![0.0; channels],
            ramps: vec![0.0; channels],
            phases: vec![0.0; channels],
            cursors: vec![0; channels],
            noise_states: (0..channels as u64).map(|ch| 0x9e3779b9 + ch).collect(),
        }
    }

    /// Sweep range in Hz, traversed once per `period` seconds
    pub fn with_sweep(mut self, low_hz: f64, high_hz: f64, period: f64) -> Self {
        self.sweep = (low_hz, high_hz);
        self.sweep_period = period;
        self
    }

    /// Sweep amplitude in ADC counts for one channel
    pub fn with_amplitude(mut self, channel: usize, amplitude: f64) -> Self {
        self.amplitudes[channel] = amplitude;
        self
    }

    /// Linear amplitude growth per second for one channel
    pub fn with_ramp(mut self, channel: usize, per_second: f64) -> Self {
        self.ramps[channel] = per_second;
        self
    }

    /// Uniform noise amplitude in ADC counts, all channels
    pub fn with_noise(mut self, amplitude: f64) -> Self {
        self.noise_amplitude = amplitude;
        self
    }

    /// Mid-scale offset in ADC counts (0 for a hard-silent source)
    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    fn next_noise(&mut self, ch: usize) -> f64 {
        let state = &mut self.noise_states[ch];
        *state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (*state >> 33) as f64 / (1u64 << 31) as f64 - 1.0
    }
}

impl AdcChannel for ChirpAdc {
    fn read_sample(&mut self, channel: u8) -> Result<u16, PlatformError> {
        let ch = channel as usize;
        if ch >= self.amplitudes.len() {
            return Err(PlatformError::NoSuchChannel(channel));
        }

        let t = self.cursors[ch] as f64 / self.sample_rate;
        self.cursors[ch] += 1;

        let (low, high) = self.sweep;
        let frequency = low + (high - low) * ((t / self.sweep_period) % 1.0);
        self.phases[ch] += 2.0 * std::f64::consts::PI * frequency / self.sample_rate;

        let gain = 1.0 + self.ramps[ch] * t;
        let tone = self.amplitudes[ch] * gain * self.phases[ch].sin();
        let noise = self.noise_amplitude * self.next_noise(ch);

        Ok((self.offset + tone + noise).clamp(0.0, 4095.0) as u16)
    }
}
