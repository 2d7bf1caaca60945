use std::collections::HashSet;

use crate::estimation::detection::TrackId;
use crate::estimation::speed::Speed;

/// One-shot speeding flag per track id.
///
/// A track is reported the first time its speed exceeds the limit and never
/// again for the rest of the session, whatever its later speeds are.
#[derive(Debug, Clone, Default)]
pub struct ViolationDetector {
    flagged: HashSet<TrackId>,
}

impl ViolationDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` exactly once per track: on the first call where
    /// `speed` is strictly above `limit_kmh`.
    pub fn check(&mut self, track_id: TrackId, speed: Speed, limit_kmh: f64) -> bool {
        if speed.kmh() <= limit_kmh {
            return false;
        }
        self.flagged.insert(track_id)
    }

    pub fn is_flagged(&self, track_id: TrackId) -> bool {
        self.flagged.contains(&track_id)
    }

    /// Number of tracks flagged so far.
    pub fn len(&self) -> usize {
        self.flagged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flagged.is_empty()
    }

    pub fn clear(&mut self) {
        self.flagged.clear();
    }
}
