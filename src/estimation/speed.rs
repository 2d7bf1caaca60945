//! Sliding-window speed estimation.

use std::fmt;

/// Conversion from target-plane units per second to km/h when the target
/// rectangle is measured in metres.
pub const METRES_PER_SECOND_TO_KMH: f64 = 3.6;

/// Estimated speed in km/h. Always non-negative.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Speed(f64);

impl Speed {
    pub fn from_kmh(kmh: f64) -> Self {
        Self(kmh.abs())
    }

    pub fn kmh(self) -> f64 {
        self.0
    }

    /// Display label, truncated to whole km/h.
    pub fn label(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} km/h", self.0 as i64)
    }
}

/// Computes speed from a track's coordinate window.
///
/// `unit_to_kmh` couples the estimator to the size of the target rectangle:
/// the window displacement is in target-plane units, so the factor must turn
/// units per second into km/h. The default 3.6 is only correct when the
/// target rectangle is dimensioned in metres; re-check it whenever the
/// target dimensions or their unit change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedEstimator {
    fps: u32,
    unit_to_kmh: f64,
}

impl SpeedEstimator {
    pub fn new(fps: u32) -> Self {
        Self::with_conversion(fps, METRES_PER_SECOND_TO_KMH)
    }

    pub fn with_conversion(fps: u32, unit_to_kmh: f64) -> Self {
        Self {
            fps: fps.max(1),
            unit_to_kmh,
        }
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn unit_to_kmh(&self) -> f64 {
        self.unit_to_kmh
    }

    /// Half a second of samples must be collected before an estimate is made.
    pub fn is_ready(&self, samples: usize) -> bool {
        samples as f64 >= f64::from(self.fps) / 2.0
    }

    /// Estimate speed from a window ordered oldest to newest.
    ///
    /// Returns `None` while fewer than `fps / 2` samples are available. The
    /// displacement is taken across the whole window rather than between
    /// consecutive frames, and elapsed time assumes one sample per frame.
    pub fn estimate<'a, I>(&self, history: I) -> Option<Speed>
    where
        I: IntoIterator<Item = &'a f64>,
        I::IntoIter: DoubleEndedIterator + ExactSizeIterator,
    {
        let mut iter = history.into_iter();
        let len = iter.len();
        if len == 0 || !self.is_ready(len) {
            return None;
        }

        let oldest = *iter.next()?;
        let newest = iter.next_back().copied().unwrap_or(oldest);

        let distance = (newest - oldest).abs();
        let elapsed = len as f64 / f64::from(self.fps);

        Some(Speed::from_kmh(distance / elapsed * self.unit_to_kmh))
    }
}
