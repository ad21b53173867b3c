//! Location Estimator
//!
//! Picks the channel with the loudest recent in-band energy and maps it to
//! the cardinal that microphone faces. A source bouncing off a wall can
//! read nearly as loud on the opposite microphone; when the two are within
//! the echo margin the estimate is withheld rather than guessed.

use tracing::debug;

use siren_dsp::BandAnalysis;
use siren_platform::Cardinal;

/// A located source: the winning channel and its cardinal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationEstimate {
    pub channel: usize,
    pub cardinal: Cardinal,
}

/// Locate the source from the latest analysis of every channel
///
/// `latest` holds one analysis per channel in channel order; `layout` maps
/// channel index to facing. Returns `None` when the loudest channel does
/// not beat its opposite by the echo margin.
pub fn estimate(
    latest: &[&BandAnalysis],
    layout: &[Cardinal],
    echo_margin: f64,
) -> Option<LocationEstimate> {
    let means: Vec<f64> = latest.iter().map(|a| a.band_mean()).collect();

    let loudest = means
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(ch, _)| ch)?;

    // The physically opposite microphone in the array
    let opposite = (loudest + means.len() / 2) % means.len();
    if loudest != opposite && means[loudest] < (1.0 + echo_margin) * means[opposite] {
        debug!(
            loudest,
            opposite,
            level = means[loudest],
            opposite_level = means[opposite],
            "near-equal opposite channels, suspected wall echo"
        );
        return None;
    }

    Some(LocationEstimate {
        channel: loudest,
        cardinal: layout[loudest],
    })
}
