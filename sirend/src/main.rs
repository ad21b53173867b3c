//! sirend - Emergency-Vehicle Siren Detector
//!
//! Command-line entry point: loads the configuration, wires an input
//! backend and an indicator into the detection pipeline, and runs it.
//!
//! The SPI byte transport for the real converter is supplied by the
//! deployment image; this binary ships the replay backend (recorded
//! captures) and a synthetic self-test source. Both exercise the identical
//! pipeline via the `AdcChannel` trait.
//!
//! Exit codes: 0 graceful shutdown, 1 configuration error, 2 unrecoverable
//! hardware/runtime failure.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use directories::ProjectDirs;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use siren_core::{DetectorConfig, EngineError, Pipeline};
use siren_platform::{promote_to_fifo, ChirpAdc, ConsoleIndicator, WavReplayAdc};

#[derive(Parser)]
#[command(name = "sirend", version, about = "Real-time acoustic siren detector")]
struct Cli {
    /// Configuration file (JSON); defaults to the platform config directory
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the calibrated inner-loop sampling delay
    #[arg(long)]
    sample_delay_us: Option<u64>,

    #[command(subcommand)]
    input: Input,
}

#[derive(Subcommand)]
enum Input {
    /// Replay a recorded multi-channel WAV capture through the detector
    Replay {
        /// Capture file; channels map onto microphone channels in order
        path: PathBuf,
    },
    /// Run the detector against a synthetic siren sweep
    Selftest {
        /// Channel carrying the sweep
        #[arg(long, default_value_t = 0)]
        channel: usize,

        /// Number of windows to process before exiting
        #[arg(long, default_value_t = 4)]
        windows: u32,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run(Cli::parse()) {
        Ok(()) => {
            info!("sirend stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e:#}");
            match e.downcast_ref::<EngineError>() {
                Some(EngineError::Config(_)) => ExitCode::from(1),
                _ => ExitCode::from(2),
            }
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = load_config(&cli)?;
    if let Some(delay) = cli.sample_delay_us {
        config.sample_delay_us = delay;
    }
    config.validate().map_err(anyhow::Error::new)?;

    if !promote_to_fifo() {
        warn!("running without real-time priority");
    }

    match cli.input {
        Input::Replay { path } => {
            // Replay is not wall-clocked; disable the jitter budget.
            config.sample_delay_us = 0;
            config.timing_tolerance = f64::INFINITY;
            config.max_sample_stretch = f64::INFINITY;

            let adc = WavReplayAdc::open(&path, config.channels)
                .map_err(|e| anyhow::Error::new(EngineError::HwInit(e.to_string())))?;
            info!(path = %path.display(), "replaying capture");

            let indicator = ConsoleIndicator::new(config.max_cycles);
            let mut pipeline =
                Pipeline::new(config, adc, indicator).map_err(anyhow::Error::new)?;
            pipeline.run().map_err(anyhow::Error::new)
        }
        Input::Selftest { channel, windows } => {
            config.sample_delay_us = 0;
            config.timing_tolerance = f64::INFINITY;
            config.max_sample_stretch = f64::INFINITY;

            if channel >= config.channels {
                return Err(anyhow::Error::new(EngineError::Config(format!(
                    "self-test channel {} outside the {}-channel array",
                    channel, config.channels
                ))));
            }

            let window_secs = config.window_duration().as_secs_f64();
            let adc = ChirpAdc::new(config.channels, config.sample_rate)
                .with_sweep(config.band_min_hz, config.band_max_hz, window_secs)
                .with_amplitude(channel, 1500.0)
                .with_noise(10.0);

            let indicator = ConsoleIndicator::new(config.max_cycles);
            let mut pipeline =
                Pipeline::new(config, adc, indicator).map_err(anyhow::Error::new)?;

            for _ in 0..windows {
                pipeline.run_window().map_err(anyhow::Error::new)?;
            }
            info!(windows, "self-test complete");
            Ok(())
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<DetectorConfig> {
    if let Some(path) = &cli.config {
        return DetectorConfig::load(path).map_err(anyhow::Error::new);
    }

    // Unspecified: use <config dir>/sirend/config.json when present,
    // otherwise the built-in reference defaults.
    if let Some(dirs) = ProjectDirs::from("org", "sirend", "sirend") {
        let path = dirs.config_dir().join("config.json");
        if path.exists() {
            return DetectorConfig::load(&path).map_err(anyhow::Error::new);
        }
    }

    info!("no configuration file, using reference defaults");
    Ok(DetectorConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_replay() {
        let cli = Cli::parse_from(["sirend", "replay", "capture.wav"]);
        assert!(matches!(cli.input, Input::Replay { .. }));
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_parse_selftest_overrides() {
        let cli = Cli::parse_from([
            "sirend",
            "--sample-delay-us",
            "55",
            "selftest",
            "--channel",
            "2",
            "--windows",
            "6",
        ]);
        assert_eq!(cli.sample_delay_us, Some(55));
        match cli.input {
            Input::Selftest { channel, windows } => {
                assert_eq!(channel, 2);
                assert_eq!(windows, 6);
            }
            _ => panic!("expected selftest"),
        }
    }
}
