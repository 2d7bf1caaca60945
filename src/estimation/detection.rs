//! Tracked detections handed over by the external detector/tracker.

use serde::{Deserialize, Serialize};

use crate::estimation::rect::Rect;

/// Identifier assigned by the external tracker.
///
/// Stable while the tracker keeps the object; may be reused after track loss.
pub type TrackId = u64;

/// Which point of a bounding box stands for the object's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    /// Midpoint of the bottom edge (ground contact).
    #[default]
    BottomCenter,
    Center,
    TopCenter,
}

/// Detection input for the speed pipeline, already associated to a track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedDetection {
    /// Bounding box in image pixels
    pub bbox: Rect,
    /// Detection confidence score
    pub score: f32,
    /// Track identifier from the external tracker
    pub track_id: TrackId,
}

impl TrackedDetection {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32, score: f32, track_id: TrackId) -> Self {
        Self {
            bbox: Rect::from_tlbr(x1, y1, x2, y2),
            score,
            track_id,
        }
    }

    pub fn from_rect(bbox: Rect, score: f32, track_id: TrackId) -> Self {
        Self {
            bbox,
            score,
            track_id,
        }
    }

    /// Image-plane reference point of this detection.
    pub fn anchor_point(&self, anchor: Anchor) -> [f64; 2] {
        let (x, y) = match anchor {
            Anchor::BottomCenter => self.bbox.bottom_center(),
            Anchor::Center => self.bbox.center(),
            Anchor::TopCenter => self.bbox.top_center(),
        };
        [f64::from(x), f64::from(y)]
    }
}
