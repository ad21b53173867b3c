//! Siren Core - Detection Engine
//!
//! This crate provides the real-time detection engine for sirend:
//! - Deterministic sampling loop with a bounded jitter budget
//! - Per-channel window/history state
//! - Direction (approaching/receding) and location (cardinal) estimation
//! - The pipeline orchestrator driving one decision per window
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────── one real-time thread ──────────────────────────┐
//! │ Sampler ──▶ Spectrum ──▶ Band Analyzer ──▶ Detector ──▶ Boundary Rescue  │
//! │    │                                                          │          │
//! │    └── AdcChannel (SPI / replay / synthetic)     History Ring ◀┘         │
//! │                                                       │                  │
//! │          Indicator ◀── Orchestrator ◀── Direction + Location             │
//! └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The pipeline is synchronous and single-threaded by design; everything it
//! touches is passed in explicitly at startup.

mod channel;
mod config;
mod direction;
mod error;
mod history;
mod location;
mod pipeline;
mod sampler;

pub use config::DetectorConfig;
pub use error::{EngineError, EngineResult};
pub use history::HistoryRing;
pub use location::LocationEstimate;
pub use pipeline::{Decision, Pipeline};
pub use sampler::Sampler;

// Re-export the interface types callers need to wire a pipeline
pub use siren_platform::{AdcChannel, Cardinal, Direction, Indicator};
