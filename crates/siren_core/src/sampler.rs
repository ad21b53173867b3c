//! Sampling Loop
//!
//! Pulls one sample per channel per iteration at the configured rate and
//! fills a window per channel. The cadence comes from a calibrated
//! microsecond delay after each channel scan; the whole window's wall time
//! is measured and checked against the expected duration, because spectral
//! bin positions assume the nominal rate. Channels are scanned in a fixed
//! order, so the per-channel skew is bounded and known.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use siren_platform::{AdcChannel, MemoryLockGuard};

use crate::config::DetectorConfig;
use crate::error::{EngineError, EngineResult};

/// How often the hard wall-time cap is checked mid-window
const CAP_CHECK_INTERVAL: usize = 256;

/// Out-of-tolerance windows before the delay is recalibrated
const DRIFT_STRIKES: u32 = 3;

/// Largest single recalibration step, as a ratio
const RETUNE_CLAMP: f64 = 0.5;

pub struct Sampler<A: AdcChannel> {
    adc: A,
    channels: usize,
    window_len: usize,
    delay: Duration,
    expected: Duration,
    tolerance: f64,
    stretch: f64,
    drift_strikes: u32,
}

impl<A: AdcChannel> Sampler<A> {
    pub fn new(adc: A, config: &DetectorConfig) -> Self {
        Self {
            adc,
            channels: config.channels,
            window_len: config.window_samples,
            delay: Duration::from_micros(config.sample_delay_us),
            expected: config.window_duration(),
            tolerance: config.timing_tolerance,
            stretch: config.max_sample_stretch,
            drift_strikes: 0,
        }
    }

    /// Current inner-loop delay (changes when recalibration fires)
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Fill one window per channel, returning the elapsed wall time
    ///
    /// Pages are pinned for the duration. A transport failure or a wall time
    /// outside tolerance aborts the window with an error; the caller drops
    /// it and continues.
    pub fn sample(&mut self, out: &mut [Vec<f64>]) -> EngineResult<Duration> {
        debug_assert_eq!(out.len(), self.channels);

        let _page_lock = MemoryLockGuard::acquire();
        let hard_cap = self
            .stretch
            .is_finite()
            .then(|| self.expected.mul_f64(self.stretch));
        let start = Instant::now();

        for i in 0..self.window_len {
            for (ch, buffer) in out.iter_mut().enumerate() {
                buffer[i] = f64::from(self.adc.read_sample(ch as u8)?);
            }
            if !self.delay.is_zero() {
                pace(self.delay);
            }

            if i % CAP_CHECK_INTERVAL == 0 {
                if let Some(cap) = hard_cap {
                    let elapsed = start.elapsed();
                    if elapsed > cap {
                        return Err(self.drifted(elapsed));
                    }
                }
            }
        }

        let elapsed = start.elapsed();
        let drift =
            (elapsed.as_secs_f64() - self.expected.as_secs_f64()).abs() / self.expected.as_secs_f64();
        if drift > self.tolerance {
            return Err(self.drifted(elapsed));
        }

        self.drift_strikes = 0;
        debug!(?elapsed, "window sampled");
        Ok(elapsed)
    }

    /// Record one out-of-tolerance window and recalibrate after enough
    /// consecutive strikes.
    fn drifted(&mut self, actual: Duration) -> EngineError {
        self.drift_strikes += 1;
        warn!(
            ?actual,
            expected = ?self.expected,
            strikes = self.drift_strikes,
            "sampling drifted out of tolerance"
        );

        if self.drift_strikes >= DRIFT_STRIKES && !self.delay.is_zero() {
            let retuned = retune(self.delay, self.expected, actual);
            warn!(old = ?self.delay, new = ?retuned, "recalibrating sample delay");
            self.delay = retuned;
            self.drift_strikes = 0;
        }

        EngineError::Timing {
            expected: self.expected,
            actual,
        }
    }
}

/// Scale the inner delay by the observed drift, one clamped step at a time
fn retune(delay: Duration, expected: Duration, actual: Duration) -> Duration {
    let ratio = (expected.as_secs_f64() / actual.as_secs_f64())
        .clamp(1.0 - RETUNE_CLAMP, 1.0 + RETUNE_CLAMP);
    delay.mul_f64(ratio)
}

/// Busy-wait: the delay is tens of microseconds, well under a scheduler
/// timeslice.
fn pace(delay: Duration) {
    let end = Instant::now() + delay;
    while Instant::now() < end {
        std::hint::spin_loop();
    }
}
