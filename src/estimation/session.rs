//! Session state owned by the pipeline for the length of one video run.

use crate::estimation::detection::TrackId;
use crate::estimation::history::TrackHistory;
use crate::estimation::speed::Speed;
use crate::estimation::violation::ViolationDetector;

/// Totals reported when a session ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionSummary {
    pub frames_processed: u64,
    /// Track buffers created, counting a track again if it was evicted and
    /// came back.
    pub tracks_observed: u64,
    pub violations: usize,
}

/// Mutable per-run state: coordinate histories, violation flags and the
/// frame counter.
///
/// Only the thread driving the pipeline touches it. Anything that splits
/// `record` and `check` across threads must guard the whole session behind
/// one lock.
#[derive(Debug, Clone)]
pub struct Session {
    history: TrackHistory,
    violations: ViolationDetector,
    frames_processed: u64,
    tracks_observed: u64,
}

impl Session {
    /// `history_capacity` is the per-track window length in samples.
    pub fn new(history_capacity: usize) -> Self {
        Self {
            history: TrackHistory::new(history_capacity),
            violations: ViolationDetector::new(),
            frames_processed: 0,
            tracks_observed: 0,
        }
    }

    /// Start the next frame and return its zero-based number.
    pub fn begin_frame(&mut self) -> u64 {
        let frame = self.frames_processed;
        self.frames_processed += 1;
        self.history.begin_frame(frame);
        frame
    }

    pub fn record(&mut self, track_id: TrackId, value: f64) {
        if !self.history.contains(track_id) {
            self.tracks_observed += 1;
        }
        self.history.record(track_id, value);
    }

    pub fn check_violation(&mut self, track_id: TrackId, speed: Speed, limit_kmh: f64) -> bool {
        self.violations.check(track_id, speed, limit_kmh)
    }

    pub fn history(&self) -> &TrackHistory {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut TrackHistory {
        &mut self.history
    }

    pub fn violations(&self) -> &ViolationDetector {
        &self.violations
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            frames_processed: self.frames_processed,
            tracks_observed: self.tracks_observed,
            violations: self.violations.len(),
        }
    }

    /// Forget everything and start again at frame zero.
    pub fn reset(&mut self) {
        self.history.clear();
        self.violations.clear();
        self.frames_processed = 0;
        self.tracks_observed = 0;
    }
}
