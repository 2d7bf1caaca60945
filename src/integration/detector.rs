//! Trait for external detection + tracking backends.

use image::RgbImage;

use crate::estimation::{TrackId, TrackedDetection};

/// Trait for backends that detect objects in a frame and assign track ids.
///
/// Implement this trait to feed any detector/tracker combination into the
/// speed pipeline. Identifiers must stay stable across frames for as long as
/// the backend keeps tracking an object.
///
/// # Example
///
/// ```ignore
/// use speedcam_rs::{DetectionSource, TrackedDetection};
///
/// struct MyTracker {
///     // Your detector and tracker here
/// }
///
/// impl DetectionSource for MyTracker {
///     type Error = std::io::Error;
///
///     fn detect(&mut self, frame: &image::RgbImage) -> Result<Vec<TrackedDetection>, Self::Error> {
///         // Run inference, associate tracks, return detections
///         Ok(vec![])
///     }
/// }
/// ```
pub trait DetectionSource {
    /// Error type for detection failures.
    type Error;

    /// Detect and track objects in one decoded frame.
    ///
    /// May return fewer detections than the raw detector produced; every
    /// returned detection carries a track id.
    fn detect(&mut self, frame: &RgbImage) -> Result<Vec<TrackedDetection>, Self::Error>;
}

/// Helper trait for converting backend-specific outputs to `TrackedDetection`.
///
/// Implement this for your tracker's output format to enable easy conversion.
pub trait IntoDetections {
    /// Convert the output into a vector of tracked detections.
    fn into_detections(self) -> Vec<TrackedDetection>;
}

impl IntoDetections for Vec<TrackedDetection> {
    fn into_detections(self) -> Vec<TrackedDetection> {
        self
    }
}

/// `(tlbr, score, track_id)` triples, the usual shape of tracker output.
impl IntoDetections for Vec<([f32; 4], f32, TrackId)> {
    fn into_detections(self) -> Vec<TrackedDetection> {
        self.into_iter()
            .map(|([x1, y1, x2, y2], score, track_id)| {
                TrackedDetection::new(x1, y1, x2, y2, score, track_id)
            })
            .collect()
    }
}
