//! Pipeline configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::estimation::{Anchor, METRES_PER_SECOND_TO_KMH};

/// Configuration for the speed pipeline.
///
/// Missing fields in a config file take their [`Default`] values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedConfig {
    /// Four image points outlining a straight road segment, in the same
    /// winding order as the target rectangle.
    pub source: Vec<[f64; 2]>,
    /// Physical width of the road segment.
    pub target_width: f64,
    /// Physical length of the road segment along the direction of travel.
    pub target_height: f64,
    /// Explicit target quadrilateral; overrides `target_width`/`target_height`.
    pub target: Option<Vec<[f64; 2]>>,
    /// Region of interest; defaults to `source`.
    pub zone: Option<Vec<[f64; 2]>>,
    /// Source frame rate. Also the history length per track.
    pub fps: u32,
    pub speed_limit_kmh: f64,
    /// Detections with confidence at or below this are dropped.
    pub confidence_threshold: f32,
    pub anchor: Anchor,
    /// Factor turning target-plane units per second into km/h.
    ///
    /// 3.6 assumes the target dimensions are in metres. Changing the unit of
    /// `target_width`/`target_height` requires changing this too.
    pub unit_to_kmh: f64,
    /// Pixels added on each side of a violating vehicle's box when cropping
    /// evidence.
    pub crop_padding: u32,
    pub violations_dir: PathBuf,
    /// Forget a track's history after this many frames without an update.
    /// `None` keeps every history for the whole session.
    pub max_idle_frames: Option<u64>,
    /// Truncate rectified coordinates to whole units before recording them.
    pub truncate_coordinates: bool,
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            source: vec![
                [738.0, 534.0],
                [1040.0, 534.0],
                [1428.0, 1079.0],
                [448.0, 1079.0],
            ],
            target_width: 3.5,
            target_height: 140.0,
            target: None,
            zone: None,
            fps: 30,
            speed_limit_kmh: 95.0,
            confidence_threshold: 0.3,
            anchor: Anchor::BottomCenter,
            unit_to_kmh: METRES_PER_SECOND_TO_KMH,
            crop_padding: 50,
            violations_dir: PathBuf::from("violations"),
            max_idle_frames: Some(60),
            truncate_coordinates: true,
        }
    }
}

impl SpeedConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: SpeedConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Target quadrilateral matching `source` corner for corner.
    ///
    /// Without an explicit `target`, the rectangle spans
    /// `[0, width - 1] x [0, height - 1]`.
    pub fn target_region(&self) -> Vec<[f64; 2]> {
        if let Some(target) = &self.target {
            return target.clone();
        }
        let w = self.target_width - 1.0;
        let h = self.target_height - 1.0;
        vec![[0.0, 0.0], [w, 0.0], [w, h], [0.0, h]]
    }

    pub fn zone_polygon(&self) -> &[[f64; 2]] {
        self.zone.as_deref().unwrap_or(&self.source)
    }

    /// Check values the pipeline cannot run with. Region geometry is checked
    /// when the transformer and zone are built.
    pub fn validate(&self) -> Result<()> {
        if self.fps == 0 {
            return Err(Error::InvalidConfig("fps must be positive".into()));
        }
        if !self.speed_limit_kmh.is_finite() || self.speed_limit_kmh <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "speed limit must be positive, got {}",
                self.speed_limit_kmh
            )));
        }
        if !self.unit_to_kmh.is_finite() || self.unit_to_kmh <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "unit conversion factor must be positive, got {}",
                self.unit_to_kmh
            )));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(Error::InvalidConfig(format!(
                "confidence threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        if self.target.is_none() && (self.target_width <= 1.0 || self.target_height <= 1.0) {
            return Err(Error::InvalidConfig(
                "target width and height must exceed 1".into(),
            ));
        }
        Ok(())
    }
}
