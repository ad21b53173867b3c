//! Hardware Capability Traits
//!
//! Defines the small interfaces the detection pipeline consumes: an ADC that
//! yields one sample per channel, the byte transport underneath it, and the
//! directional indicator display. Real hardware, WAV replay and synthetic
//! generators all implement the same traits.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PlatformError;

/// Cardinal direction a microphone faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinal {
    North,
    South,
    East,
    West,
}

impl fmt::Display for Cardinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Cardinal::North => "north",
            Cardinal::South => "south",
            Cardinal::East => "east",
            Cardinal::West => "west",
        };
        f.write_str(label)
    }
}

/// Radial motion of a detected source relative to the array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Approaching,
    Receding,
    /// Trend too small or too little history to call either way
    Inconclusive,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Direction::Approaching => "approaching",
            Direction::Receding => "receding",
            Direction::Inconclusive => "inconclusive",
        };
        f.write_str(label)
    }
}

/// Byte-oriented full-duplex channel to the converter
///
/// The host asserts chip-select across the transfer; `rx` is filled with as
/// many bytes as were sent. Real implementations wrap an SPI device node or
/// a vendor library; tests wrap a canned byte table.
pub trait SpiTransport {
    fn transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<(), PlatformError>;
}

/// One multiplexed analog-to-digital converter
///
/// A single call returns one unsigned 12-bit sample from the addressed
/// channel. A transport failure is fatal for the current window only; the
/// orchestrator drops the window and keeps sampling.
pub trait AdcChannel {
    fn read_sample(&mut self, channel: u8) -> Result<u16, PlatformError>;
}

/// The directional indicator display
///
/// Called exactly once per analysis window by the orchestrator. `location`
/// and `direction` are the latched values from the most recent detection;
/// `cycles` counts windows since that detection, and implementations blank
/// everything once it passes their configured cutoff.
pub trait Indicator {
    fn update(
        &mut self,
        cycles: u32,
        location: Option<Cardinal>,
        direction: Direction,
    ) -> Result<(), PlatformError>;
}
