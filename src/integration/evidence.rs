//! Evidence capture for speeding vehicles.

use std::path::{Path, PathBuf};

use image::RgbImage;
use image::imageops;

use crate::error::Result;
use crate::estimation::{PixelRegion, Speed, TrackId};

/// A request to persist a crop of the current frame as violation evidence.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRequest {
    pub track_id: TrackId,
    /// Zero-based index of the frame in the session.
    pub frame_number: u64,
    /// Padded box of the violating vehicle, clipped to the frame.
    pub region: PixelRegion,
    pub speed: Speed,
}

/// Destination for violation evidence.
pub trait EvidenceSink {
    /// Persist the requested crop of `frame`.
    fn capture(&mut self, frame: &RgbImage, request: &CaptureRequest) -> Result<()>;
}

/// Writes evidence crops as JPEG files into a directory, creating it on the
/// first capture.
///
/// Files are named `vehicle_{track_id}_frame_{frame_number}.jpg`.
#[derive(Debug, Clone)]
pub struct ViolationWriter {
    dir: PathBuf,
}

impl ViolationWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, request: &CaptureRequest) -> PathBuf {
        self.dir.join(format!(
            "vehicle_{}_frame_{}.jpg",
            request.track_id, request.frame_number
        ))
    }
}

impl EvidenceSink for ViolationWriter {
    fn capture(&mut self, frame: &RgbImage, request: &CaptureRequest) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;

        let PixelRegion {
            x,
            y,
            width,
            height,
        } = request.region;
        let crop = imageops::crop_imm(frame, x, y, width, height).to_image();
        crop.save(self.path_for(request))?;
        Ok(())
    }
}
