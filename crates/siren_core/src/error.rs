//! Engine Error Types

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur in the detection engine
///
/// Only configuration and hardware-init errors are fatal; everything else is
/// absorbed by the window loop, which drops the affected window and keeps
/// running.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Hardware initialization failed: {0}")]
    HwInit(String),

    #[error("Sampling took {actual:?}, expected {expected:?}")]
    Timing { expected: Duration, actual: Duration },

    #[error("DSP error: {0}")]
    Dsp(#[from] siren_dsp::DspError),

    #[error("Platform error: {0}")]
    Platform(#[from] siren_platform::PlatformError),
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
