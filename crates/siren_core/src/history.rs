//! Per-Channel Analysis History
//!
//! Bounded queue of the most recent window analyses for one channel,
//! oldest-first. Single producer (the orchestrator), read by the direction
//! and location estimators; the whole pipeline is one thread, so this is a
//! plain collection rather than a concurrent ring.

use std::collections::VecDeque;

use siren_dsp::BandAnalysis;

/// Bounded, oldest-first queue of analyses
#[derive(Debug, Clone)]
pub struct HistoryRing {
    entries: VecDeque<BandAnalysis>,
    capacity: usize,
}

impl HistoryRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append the newest analysis, evicting the oldest when full
    pub fn push(&mut self, analysis: BandAnalysis) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(analysis);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &BandAnalysis> {
        self.entries.iter()
    }

    /// Most recent entry
    pub fn latest(&self) -> Option<&BandAnalysis> {
        self.entries.back()
    }
}
