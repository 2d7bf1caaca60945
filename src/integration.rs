//! Integration module connecting external detection/tracking backends and
//! evidence storage to the speed estimation core.
//!
//! This module provides the traits at those seams and the per-frame
//! orchestrator that drives the core.

mod builder;
mod detector;
mod evidence;
mod pipeline;

pub use builder::DetectionBuilder;
pub use detector::{DetectionSource, IntoDetections};
pub use evidence::{CaptureRequest, EvidenceSink, ViolationWriter};
pub use pipeline::{FrameReport, SpeedPipeline};
