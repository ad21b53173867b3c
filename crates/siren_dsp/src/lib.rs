//! Siren DSP - Frequency-Domain Detection Module
//!
//! This crate provides the detection math for sirend, including:
//! - Plan-style real-to-complex spectrum engine (one-time allocation,
//!   repeated execution)
//! - Band plan resolving configured Hz ranges to bin indices, with doppler
//!   widening of the band of interest
//! - Band analyzer producing an adaptive noise floor and per-band ratios
//! - Multithreshold detector (majority of bands over per-band coefficients)
//! - Boundary rescue for detections that straddle a window join
//!
//! # Architecture
//!
//! Everything here is pure with respect to the outside world: windows in,
//! analyses and detections out. All allocation happens when the
//! `SpectrumAnalyzer` and `BandPlan` are built; the per-window path reuses
//! those buffers.

mod analysis;
mod band_plan;
mod detector;
mod error;
mod rescue;
mod spectrum;

pub use analysis::{analyze, BandAnalysis};
pub use band_plan::{BandPlan, BandPlanSpec};
pub use detector::{detect, Detection};
pub use error::DspError;
pub use rescue::{rescue, stitch_halves};
pub use spectrum::{write_spectrum, SpectrumAnalyzer};
