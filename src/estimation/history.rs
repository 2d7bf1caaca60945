//! Per-track coordinate history with ring-buffer semantics.

use std::collections::{BTreeSet, HashMap, VecDeque};

use crate::estimation::detection::TrackId;

#[derive(Debug, Clone)]
struct Entry {
    values: VecDeque<f64>,
    last_seen: u64,
}

/// Bounded buffers of rectified travel-axis coordinates, one per track.
///
/// Each buffer holds at most `capacity` samples (one second at the source
/// frame rate); the oldest sample is dropped once it is full. Buffers are
/// never removed by `record`; without [`evict_idle`](Self::evict_idle) the
/// number of buffers grows with the number of distinct track ids seen.
#[derive(Debug, Clone)]
pub struct TrackHistory {
    capacity: usize,
    frame: u64,
    tracks: HashMap<TrackId, Entry>,
    /// `(last_seen, track_id)`, oldest first.
    recency: BTreeSet<(u64, TrackId)>,
}

impl TrackHistory {
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            frame: 0,
            tracks: HashMap::new(),
            recency: BTreeSet::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Set the frame number stamped on subsequent `record` calls.
    pub fn begin_frame(&mut self, frame: u64) {
        self.frame = frame;
    }

    /// Append `value` to the track's buffer, evicting the oldest sample when
    /// the buffer is full.
    pub fn record(&mut self, track_id: TrackId, value: f64) {
        let frame = self.frame;
        let capacity = self.capacity;

        let entry = self.tracks.entry(track_id).or_insert_with(|| Entry {
            values: VecDeque::with_capacity(capacity),
            last_seen: frame,
        });

        self.recency.remove(&(entry.last_seen, track_id));
        entry.last_seen = frame;
        self.recency.insert((frame, track_id));

        if entry.values.len() == capacity {
            entry.values.pop_front();
        }
        entry.values.push_back(value);
    }

    /// Samples for `track_id`, oldest first; empty for unseen tracks.
    pub fn get(&self, track_id: TrackId) -> Vec<f64> {
        self.window(track_id)
            .map(|v| v.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Borrowed view of a track's buffer.
    pub fn window(&self, track_id: TrackId) -> Option<&VecDeque<f64>> {
        self.tracks.get(&track_id).map(|e| &e.values)
    }

    pub fn contains(&self, track_id: TrackId) -> bool {
        self.tracks.contains_key(&track_id)
    }

    /// Number of tracks with a buffer.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Drop every track not recorded within the last `max_idle_frames`
    /// frames. Returns the number of buffers removed.
    pub fn evict_idle(&mut self, max_idle_frames: u64) -> usize {
        let mut removed = 0;
        while let Some(&(last_seen, track_id)) = self.recency.first() {
            if self.frame.saturating_sub(last_seen) <= max_idle_frames {
                break;
            }
            self.recency.pop_first();
            self.tracks.remove(&track_id);
            removed += 1;
        }
        removed
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
        self.recency.clear();
        self.frame = 0;
    }
}
