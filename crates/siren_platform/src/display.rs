//! Indicator Display Frames
//!
//! One logical frame per analysis window: either blank, or a center
//! indicator with an optional cardinal and trend. The frame is composed in
//! one place so every indicator implementation (GPIO matrix, console, test
//! recorder) agrees on the blanking rule. Physical pin patterns belong to
//! the hardware driver, not here.

use tracing::{debug, info};

use crate::error::PlatformError;
use crate::traits::{Cardinal, Direction, Indicator};

/// What the indicator should show for one window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayFrame {
    /// Everything off, including the center indicator
    Blank,
    /// Center indicator on; cardinal LED and trend when location is known
    Active {
        location: Option<Cardinal>,
        direction: Direction,
    },
}

impl DisplayFrame {
    /// The display is fully cleared exactly when the last detection is more
    /// than `max_cycles` windows old.
    pub fn compose(
        cycles: u32,
        max_cycles: u32,
        location: Option<Cardinal>,
        direction: Direction,
    ) -> Self {
        if cycles > max_cycles {
            DisplayFrame::Blank
        } else {
            DisplayFrame::Active {
                location,
                direction,
            }
        }
    }
}

/// Indicator that narrates frames through the log stream
///
/// Stands in for the LED matrix off-target; transitions log at `info`,
/// repeats at `debug` so a quiet street does not flood the journal.
pub struct ConsoleIndicator {
    max_cycles: u32,
    last: Option<DisplayFrame>,
}

impl ConsoleIndicator {
    pub fn new(max_cycles: u32) -> Self {
        Self {
            max_cycles,
            last: None,
        }
    }
}

impl Indicator for ConsoleIndicator {
    fn update(
        &mut self,
        cycles: u32,
        location: Option<Cardinal>,
        direction: Direction,
    ) -> Result<(), PlatformError> {
        let frame = DisplayFrame::compose(cycles, self.max_cycles, location, direction);
        let changed = self.last != Some(frame);
        self.last = Some(frame);

        match frame {
            DisplayFrame::Blank if changed => info!("indicator cleared"),
            DisplayFrame::Blank => debug!("indicator blank"),
            DisplayFrame::Active {
                location,
                direction,
            } => {
                let loc = location.map(|c| c.to_string()).unwrap_or_else(|| "?".into());
                if changed {
                    info!(%loc, %direction, cycles, "indicator");
                } else {
                    debug!(%loc, %direction, cycles, "indicator");
                }
            }
        }
        Ok(())
    }
}

/// Indicator that discards every frame (benchmarks, headless runs)
pub struct NullIndicator;

impl Indicator for NullIndicator {
    fn update(&mut self, _: u32, _: Option<Cardinal>, _: Direction) -> Result<(), PlatformError> {
        Ok(())
    }
}
