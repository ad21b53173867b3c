//! Pipeline Orchestrator
//!
//! Drives one detection cycle per window: sample all channels, analyze and
//! threshold each, rescue weak detections across the window boundary, then
//! aggregate into a presence decision with location and direction. The loop
//! is the reliability boundary: transport and timing faults cost one window
//! each, never the process.
//!
//! # Architecture
//!
//! ```text
//! Sampler ──▶ per channel: Spectrum ─▶ Analyze ─▶ Detect ─▶ (Rescue) ─▶ History
//!                                                                        │
//!            Indicator ◀── cooldown/latch ◀── Direction ◀── Location ◀───┘
//! ```

use std::time::Instant;

use tracing::{debug, info, warn};

use siren_dsp::{analyze, detect, rescue, BandAnalysis, BandPlan, SpectrumAnalyzer};
use siren_platform::{AdcChannel, Cardinal, Direction, Indicator, PlatformError};

use crate::channel::ChannelState;
use crate::config::DetectorConfig;
use crate::direction;
use crate::error::{EngineError, EngineResult};
use crate::location;
use crate::sampler::Sampler;

/// What the detector concluded for one window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// Windows since the last positive detection (0 = detected now)
    pub cycles: u32,
    /// Latched cardinal of the last located detection
    pub location: Option<Cardinal>,
    /// Trend of the located source, cleared while no siren is present
    pub direction: Direction,
}

/// The whole detector: configuration, DSP scratch, per-channel state and
/// the two consumed interfaces. Built once at startup and passed explicitly
/// through the run loop; there is no ambient global state.
pub struct Pipeline<A: AdcChannel, I: Indicator> {
    plan: BandPlan,
    analyzer: SpectrumAnalyzer,
    sampler: Sampler<A>,
    indicator: I,
    channels: Vec<ChannelState>,
    /// Sampling target buffers, rotated into channel state on commit
    capture: Vec<Vec<f64>>,
    layout: Vec<Cardinal>,
    coeffs: Vec<f64>,
    direction_margin: f64,
    location_margin: f64,
    /// Windows since the last detection; starts past the blanking cutoff
    cycles: u32,
    latched_location: Option<Cardinal>,
    latched_direction: Direction,
}

impl<A: AdcChannel, I: Indicator> Pipeline<A, I> {
    pub fn new(config: DetectorConfig, adc: A, indicator: I) -> EngineResult<Self> {
        config.validate()?;

        let plan = BandPlan::new(&config.band_plan_spec())?;
        let analyzer = if config.use_hann_window {
            SpectrumAnalyzer::with_hann(config.window_samples)
        } else {
            SpectrumAnalyzer::new(config.window_samples)
        };

        let channels = (0..config.channels)
            .map(|_| ChannelState::new(config.window_samples, config.history_depth))
            .collect();
        let capture = vec![vec![0.0; config.window_samples]; config.channels];

        Ok(Self {
            plan,
            analyzer,
            sampler: Sampler::new(adc, &config),
            indicator,
            channels,
            capture,
            layout: config.layout_table(),
            coeffs: config.band_coeffs.clone(),
            direction_margin: config.direction_margin,
            location_margin: config.location_margin,
            cycles: config.max_cycles + 1,
            latched_location: None,
            latched_direction: Direction::Inconclusive,
        })
    }

    /// Run until the input ends (replay) or a fatal error occurs
    pub fn run(&mut self) -> EngineResult<()> {
        loop {
            match self.run_window() {
                Ok(_) => {}
                Err(EngineError::Platform(PlatformError::ReplayExhausted)) => {
                    info!("input exhausted, shutting down");
                    return Ok(());
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Process one window
    ///
    /// `Ok(None)` means the window was dropped (timing or transport fault)
    /// and nothing else changed. Errors are fatal, with the exception of
    /// `ReplayExhausted` which `run` treats as a graceful end.
    pub fn run_window(&mut self) -> EngineResult<Option<Decision>> {
        let elapsed = match self.sampler.sample(&mut self.capture) {
            Ok(elapsed) => elapsed,
            Err(EngineError::Timing { expected, actual }) => {
                warn!(?expected, ?actual, "window dropped: sampling out of tolerance");
                self.drop_window();
                return Ok(None);
            }
            Err(EngineError::Platform(PlatformError::ReplayExhausted)) => {
                return Err(PlatformError::ReplayExhausted.into());
            }
            Err(EngineError::Platform(e)) => {
                warn!(error = %e, "window dropped: transport fault");
                self.drop_window();
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let analysis_start = Instant::now();
        let mut present = false;

        for (ch, state) in self.channels.iter_mut().enumerate() {
            state.adopt(&mut self.capture[ch]);

            let spectrum = self.analyzer.process(state.current())?;
            let mut analysis = analyze(spectrum, &self.plan);
            let mut detection = detect(&analysis, &self.coeffs)?;

            if analysis.is_silent() {
                debug!(channel = ch, "silent frame");
            }

            // A weak count next to a committed previous window may be a
            // wail bottoming out on the join; re-evaluate half-shifted.
            if detection.is_weak() {
                if let Some(previous) = state.previous() {
                    if let Some((rescued_analysis, rescued_detection)) = rescue(
                        &mut self.analyzer,
                        &self.plan,
                        &self.coeffs,
                        previous,
                        state.current(),
                        &detection,
                    )? {
                        debug!(
                            channel = ch,
                            from = detection.count(),
                            to = rescued_detection.count(),
                            "boundary rescue"
                        );
                        analysis = rescued_analysis;
                        detection = rescued_detection;
                    }
                }
            }

            debug!(
                channel = ch,
                noise_floor = analysis.noise_floor(),
                bands = detection.count(),
                "window analyzed"
            );

            present |= detection.is_positive();
            state.history.push(analysis);
        }

        if present {
            let latest: Vec<&BandAnalysis> = self
                .channels
                .iter()
                .filter_map(|state| state.history.latest())
                .collect();
            let located = if latest.len() == self.channels.len() {
                location::estimate(&latest, &self.layout, self.location_margin)
            } else {
                None
            };

            // Direction needs a temporal baseline: only trust it when the
            // previous window also detected (cooldown still zero).
            let trend = match (&located, self.cycles) {
                (Some(loc), 0) => direction::estimate(
                    &self.channels[loc.channel].history,
                    &self.coeffs,
                    self.direction_margin,
                ),
                _ => Direction::Inconclusive,
            };

            self.latched_location = located.map(|loc| loc.cardinal);
            self.latched_direction = trend;
            self.cycles = 0;

            match self.latched_location {
                Some(cardinal) => info!(%cardinal, direction = %trend, "siren detected"),
                None => info!("siren detected, location withheld (echo)"),
            }
        } else {
            self.cycles = self.cycles.saturating_add(1);
            self.latched_direction = Direction::Inconclusive;
        }

        let decision = Decision {
            cycles: self.cycles,
            location: self.latched_location,
            direction: self.latched_direction,
        };
        self.indicator
            .update(decision.cycles, decision.location, decision.direction)?;

        debug!(
            sample = ?elapsed,
            analysis = ?analysis_start.elapsed(),
            cycles = decision.cycles,
            "window complete"
        );
        Ok(Some(decision))
    }

    /// Forget adjacency after a dropped window so rescue cannot stitch
    /// across the gap.
    fn drop_window(&mut self) {
        for state in &mut self.channels {
            state.mark_gap();
        }
    }
}
