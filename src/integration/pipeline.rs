//! SpeedPipeline for combining detection/tracking with speed estimation.

use image::RgbImage;
use ndarray::Array2;
use tracing::{debug, info, warn};

use crate::config::SpeedConfig;
use crate::error::Result;
use crate::estimation::{
    PolygonZone, Session, SessionSummary, Speed, SpeedEstimator, TrackedDetection,
    ViewTransformer,
};

use super::{CaptureRequest, DetectionSource, EvidenceSink, IntoDetections, ViolationWriter};

/// Output of one processed frame, ready for a renderer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// Zero-based frame number within the session.
    pub frame_number: u64,
    /// Detections that passed the confidence and zone filters.
    pub detections: Vec<TrackedDetection>,
    /// One label per entry in `detections`; empty while speed is unknown.
    pub labels: Vec<String>,
    /// Evidence captures requested in this frame.
    pub captures: Vec<CaptureRequest>,
}

/// Per-frame orchestrator: filter, rectify, accumulate, estimate, flag.
///
/// Bundles an external `DetectionSource` with the estimation core and an
/// `EvidenceSink`. Frames must be fed in order; each call runs to completion
/// before the next.
pub struct SpeedPipeline<D: DetectionSource, S: EvidenceSink = ViolationWriter> {
    detector: D,
    sink: S,
    transformer: ViewTransformer,
    zone: PolygonZone,
    estimator: SpeedEstimator,
    session: Session,
    config: SpeedConfig,
}

impl<D: DetectionSource> SpeedPipeline<D, ViolationWriter> {
    /// Create a pipeline that writes evidence into `config.violations_dir`.
    pub fn with_writer(detector: D, config: SpeedConfig) -> Result<Self> {
        let sink = ViolationWriter::new(config.violations_dir.clone());
        Self::new(detector, sink, config)
    }
}

impl<D: DetectionSource, S: EvidenceSink> SpeedPipeline<D, S> {
    /// Create a new pipeline. Invalid configuration or a degenerate
    /// calibration region is reported here, before any frame is processed.
    pub fn new(detector: D, sink: S, config: SpeedConfig) -> Result<Self> {
        config.validate()?;

        let transformer = ViewTransformer::new(&config.source, &config.target_region())?;
        let zone = PolygonZone::new(config.zone_polygon())?;
        let estimator = SpeedEstimator::with_conversion(config.fps, config.unit_to_kmh);
        let session = Session::new(config.fps as usize);

        info!(
            fps = config.fps,
            speed_limit_kmh = config.speed_limit_kmh,
            violations_dir = %config.violations_dir.display(),
            "speed pipeline ready"
        );

        Ok(Self {
            detector,
            sink,
            transformer,
            zone,
            estimator,
            session,
            config,
        })
    }

    /// Run the detector on `frame`, then process its detections.
    pub fn process_frame(
        &mut self,
        frame: &RgbImage,
    ) -> std::result::Result<FrameReport, D::Error> {
        let detections = self.detector.detect(frame)?;
        Ok(self.update(frame, detections))
    }

    /// Process one frame's tracked detections.
    ///
    /// Evidence write failures are logged and do not interrupt processing.
    pub fn update(&mut self, frame: &RgbImage, detections: impl IntoDetections) -> FrameReport {
        let frame_number = self.session.begin_frame();
        let detections = detections.into_detections();
        let received = detections.len();

        let threshold = self.config.confidence_threshold;
        let anchor = self.config.anchor;
        let detections: Vec<TrackedDetection> = detections
            .into_iter()
            .filter(|d| d.score > threshold && self.zone.contains(d.anchor_point(anchor)))
            .collect();

        debug!(
            frame = frame_number,
            received,
            kept = detections.len(),
            "filtered detections"
        );

        let mut anchors = Array2::zeros((detections.len(), 2));
        for (i, det) in detections.iter().enumerate() {
            let [x, y] = det.anchor_point(anchor);
            anchors[[i, 0]] = x;
            anchors[[i, 1]] = y;
        }
        let rectified = self.transformer.transform_points(anchors.view());

        for (det, point) in detections.iter().zip(rectified.rows()) {
            let mut y = point[1];
            if !y.is_finite() {
                continue;
            }
            if self.config.truncate_coordinates {
                y = y.trunc();
            }
            self.session.record(det.track_id, y);
        }

        if let Some(max_idle) = self.config.max_idle_frames {
            let evicted = self.session.history_mut().evict_idle(max_idle);
            if evicted > 0 {
                debug!(frame = frame_number, evicted, "dropped idle track histories");
            }
        }

        let mut labels = Vec::with_capacity(detections.len());
        let mut captures = Vec::new();
        for det in &detections {
            let speed = self
                .session
                .history()
                .window(det.track_id)
                .and_then(|window| self.estimator.estimate(window));

            let Some(speed) = speed else {
                labels.push(String::new());
                continue;
            };
            labels.push(speed.label());

            if self
                .session
                .check_violation(det.track_id, speed, self.config.speed_limit_kmh)
            {
                if let Some(request) = self.capture(frame, frame_number, det, speed) {
                    captures.push(request);
                }
            }
        }

        FrameReport {
            frame_number,
            detections,
            labels,
            captures,
        }
    }

    fn capture(
        &mut self,
        frame: &RgbImage,
        frame_number: u64,
        det: &TrackedDetection,
        speed: Speed,
    ) -> Option<CaptureRequest> {
        let (width, height) = frame.dimensions();
        let Some(region) = det
            .bbox
            .padded_region(self.config.crop_padding, width, height)
        else {
            warn!(
                track_id = det.track_id,
                frame = frame_number,
                "violation box lies outside the frame, skipping evidence"
            );
            return None;
        };

        let request = CaptureRequest {
            track_id: det.track_id,
            frame_number,
            region,
            speed,
        };

        match self.sink.capture(frame, &request) {
            Ok(()) => info!(
                track_id = det.track_id,
                frame = frame_number,
                speed_kmh = speed.kmh(),
                "speed violation captured"
            ),
            Err(err) => warn!(
                track_id = det.track_id,
                frame = frame_number,
                error = %err,
                "failed to store violation evidence"
            ),
        }

        Some(request)
    }

    /// Get a reference to the underlying detector.
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Get a mutable reference to the underlying detector.
    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    /// Get a reference to the evidence sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &SpeedConfig {
        &self.config
    }

    pub fn transformer(&self) -> &ViewTransformer {
        &self.transformer
    }

    /// Clear all per-track state and restart frame numbering.
    pub fn reset(&mut self) {
        self.session.reset();
    }

    /// End the session and return its totals.
    pub fn finish(self) -> SessionSummary {
        let summary = self.session.summary();
        info!(
            frames = summary.frames_processed,
            tracks = summary.tracks_observed,
            violations = summary.violations,
            "speed session finished"
        );
        summary
    }
}
