//! Vehicle speed estimation for fixed traffic cameras.
//!
//! Tracked detections (produced by an external detector and tracker) are
//! filtered by a road zone, projected onto the ground plane through a
//! homography, and accumulated per track. Speed is the displacement along the
//! travel axis over a one-second sliding window.

pub mod config;
pub mod error;
pub mod estimation;
pub mod integration;

pub use config::SpeedConfig;
pub use error::{Error, Result};
pub use estimation::{
    Anchor, PixelRegion, PolygonZone, Rect, Session, SessionSummary, Speed, SpeedEstimator,
    TrackHistory, TrackId, TrackedDetection, ViewTransformer, ViolationDetector,
};
pub use integration::{
    CaptureRequest, DetectionBuilder, DetectionSource, EvidenceSink, FrameReport, IntoDetections,
    SpeedPipeline, ViolationWriter,
};
