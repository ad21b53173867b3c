//! Siren Platform - Hardware-Facing Layer
//!
//! This crate provides everything the detection pipeline consumes from the
//! outside world:
//! - Capability traits for the multiplexed ADC, its byte transport, and the
//!   directional indicator display
//! - MCP3208 command framing over any `SpiTransport`
//! - WAV replay and deterministic synthetic signal backends
//! - Display frame composition shared by every indicator implementation
//! - Real-time hoists (page locking, `SCHED_FIFO`) for the sampling loop
//!
//! # Architecture
//!
//! The pipeline in `siren_core` is generic over `AdcChannel` and
//! `Indicator`; nothing in it knows whether samples come from the SPI bus, a
//! recorded capture, or a generator. Platform-conditional code (the `libc`
//! hoists) is confined to `rt`.

mod display;
mod error;
mod mcp3208;
mod replay;
mod rt;
mod traits;

pub use display::{ConsoleIndicator, DisplayFrame, NullIndicator};
pub use error::PlatformError;
pub use mcp3208::Mcp3208;
pub use replay::{ChirpAdc, WavReplayAdc};
pub use rt::{promote_to_fifo, MemoryLockGuard};
pub use traits::{AdcChannel, Cardinal, Direction, Indicator, SpiTransport};
