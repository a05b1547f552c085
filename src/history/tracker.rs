// src/history/tracker.rs
//! Keeps historical rows anchored to their true frequency across retunes.

use std::fmt;

use super::HistoryBuffer;

/// Tuning parameters delivered with every producer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tuning {
    /// Center frequency in Hz
    pub frequency: i64,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Host zoom factor
    pub zoom: i32,
    /// Host pan offset in source bins
    pub pan: i32,
}

/// Tuning the history currently corresponds to.
pub type FrequencyState = Tuning;

/// Why the history was cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetReason {
    /// First tick after construction
    Initial,
    SampleRate,
    Zoom,
    /// New center lies outside the previously visible band
    OutOfBand,
}

impl fmt::Display for ResetReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ResetReason::Initial => "initial tick",
            ResetReason::SampleRate => "sample rate changed",
            ResetReason::Zoom => "zoom changed",
            ResetReason::OutOfBand => "frequency jumped out of band",
        };
        f.write_str(text)
    }
}

/// What a tick did to the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerAction {
    Unchanged,
    /// Rows were shifted by this many bins (positive = right)
    Rotated(i64),
    Reset(ResetReason),
}

/// Detects tuning changes and re-aligns or clears the history.
#[derive(Debug, Default, Clone)]
pub struct FrequencyTracker {
    last: Option<FrequencyState>,
}

impl FrequencyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last adopted tuning, `None` before the first tick.
    pub fn state(&self) -> Option<FrequencyState> {
        self.last
    }

    /// Compare `tuning` with the last known state and fix up `history`.
    ///
    /// The new tuning is adopted whatever the outcome.
    pub fn apply(&mut self, tuning: Tuning, history: &mut HistoryBuffer) -> TrackerAction {
        let action = match self.last {
            None => TrackerAction::Reset(ResetReason::Initial),
            Some(last) if last.sample_rate != tuning.sample_rate => {
                TrackerAction::Reset(ResetReason::SampleRate)
            }
            Some(last) if last.zoom != tuning.zoom => TrackerAction::Reset(ResetReason::Zoom),
            Some(last) => realign(last, tuning, history.bins()),
        };

        match action {
            TrackerAction::Reset(_) => history.reset(),
            TrackerAction::Rotated(bins) => history.rotate(bins),
            TrackerAction::Unchanged => {}
        }

        self.last = Some(tuning);
        action
    }
}

fn realign(last: Tuning, tuning: Tuning, bins: usize) -> TrackerAction {
    // old - new: tuning down moves existing signals to the right
    let freq_delta = last.frequency.saturating_sub(tuning.frequency);
    let pan_shift = i64::from(last.pan) - i64::from(tuning.pan);

    if freq_delta == 0 && pan_shift == 0 {
        return TrackerAction::Unchanged;
    }
    if freq_delta.unsigned_abs() > u64::from(tuning.sample_rate / 2) {
        return TrackerAction::Reset(ResetReason::OutOfBand);
    }
    if bins == 0 || tuning.sample_rate == 0 {
        return TrackerAction::Unchanged;
    }

    let hz_per_bin = f64::from(tuning.sample_rate) / bins as f64;
    let rotate = (freq_delta as f64 / hz_per_bin).round() as i64 + pan_shift;
    if rotate == 0 {
        TrackerAction::Unchanged
    } else {
        TrackerAction::Rotated(rotate)
    }
}
