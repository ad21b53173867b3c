//! Per-Channel State
//!
//! One record per microphone channel holding everything channel-local: the
//! committed window, the window before it (for boundary rescue), and the
//! analysis history. Buffers rotate by swapping, so the steady state
//! allocates nothing.

use std::mem;

use crate::history::HistoryRing;

pub struct ChannelState {
    /// Most recently committed window
    current: Vec<f64>,
    /// The window before it; only meaningful while `has_previous`
    previous: Vec<f64>,
    has_current: bool,
    has_previous: bool,
    /// Recent analyses, oldest first
    pub history: HistoryRing,
}

impl ChannelState {
    pub fn new(window_len: usize, history_depth: usize) -> Self {
        Self {
            current: vec![0.0; window_len],
            previous: vec![0.0; window_len],
            has_current: false,
            has_previous: false,
            history: HistoryRing::new(history_depth),
        }
    }

    /// Commit a freshly sampled window, rotating the old one into the
    /// previous slot. `fresh` receives the retired previous buffer for the
    /// sampler to refill next window.
    pub fn adopt(&mut self, fresh: &mut Vec<f64>) {
        mem::swap(&mut self.previous, &mut self.current);
        mem::swap(&mut self.current, fresh);
        self.has_previous = self.has_current;
        self.has_current = true;
    }

    /// A window was dropped: the next committed window will not be adjacent
    /// to the last one, so boundary rescue must not stitch across the gap.
    pub fn mark_gap(&mut self) {
        self.has_current = false;
        self.has_previous = false;
    }

    pub fn current(&self) -> &[f64] {
        &self.current
    }

    /// The adjacent previous window, if one exists
    pub fn previous(&self) -> Option<&[f64]> {
        self.has_previous.then_some(self.previous.as_slice())
    }
}
