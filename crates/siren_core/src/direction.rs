//! Direction Estimator
//!
//! Classifies the channel of interest as approaching or receding by the
//! trend of its window energies across the history ring. Summing the
//! consecutive-window ratios amplifies a monotone trend while window-to-
//! window jitter cancels; a single-pair comparison is too noisy to act on.

use tracing::debug;

use siren_platform::Direction;

use crate::history::HistoryRing;

/// Trend of the summed consecutive energy ratios over `history`
///
/// Window energy is the mean band ratio restricted to bands over their
/// coefficient. A pair whose older energy is zero contributes nothing, and
/// fewer than two analyses yields `Inconclusive`.
pub fn estimate(history: &HistoryRing, coeffs: &[f64], margin: f64) -> Direction {
    if history.len() < 2 {
        return Direction::Inconclusive;
    }

    let energies: Vec<f64> = history.iter().map(|a| a.gated_mean(coeffs)).collect();
    let trend: f64 = energies
        .windows(2)
        .map(|pair| if pair[0] == 0.0 { 0.0 } else { pair[1] / pair[0] })
        .sum();

    debug!(trend, ?energies, "direction trend");

    if trend > 1.0 + margin {
        Direction::Approaching
    } else if trend < 1.0 - margin {
        Direction::Receding
    } else {
        Direction::Inconclusive
    }
}
