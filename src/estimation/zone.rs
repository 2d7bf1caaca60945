//! Region-of-interest polygon for discarding detections off the monitored
//! road segment.

use crate::error::{Error, Result};
use crate::estimation::detection::{Anchor, TrackedDetection};

const EDGE_EPS: f64 = 1e-9;

/// Closed polygon in image coordinates.
///
/// Points on an edge or vertex count as inside.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonZone {
    vertices: Vec<[f64; 2]>,
}

impl PolygonZone {
    pub fn new(vertices: &[[f64; 2]]) -> Result<Self> {
        if vertices.len() < 3 {
            return Err(Error::TooFewVertices {
                needed: 3,
                got: vertices.len(),
            });
        }
        Ok(Self {
            vertices: vertices.to_vec(),
        })
    }

    pub fn vertices(&self) -> &[[f64; 2]] {
        &self.vertices
    }

    /// Crossing-number test with an explicit on-edge check.
    pub fn contains(&self, point: [f64; 2]) -> bool {
        let [px, py] = point;
        let n = self.vertices.len();
        let mut inside = false;

        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];

            if on_segment(a, b, point) {
                return true;
            }

            if (a[1] > py) != (b[1] > py) {
                let x_cross = a[0] + (py - a[1]) * (b[0] - a[0]) / (b[1] - a[1]);
                if px < x_cross {
                    inside = !inside;
                }
            }
        }

        inside
    }

    /// Per-detection membership mask, testing each detection's anchor.
    pub fn trigger(&self, detections: &[TrackedDetection], anchor: Anchor) -> Vec<bool> {
        detections
            .iter()
            .map(|d| self.contains(d.anchor_point(anchor)))
            .collect()
    }
}

fn on_segment(a: [f64; 2], b: [f64; 2], p: [f64; 2]) -> bool {
    let cross = (b[0] - a[0]) * (p[1] - a[1]) - (b[1] - a[1]) * (p[0] - a[0]);
    if cross.abs() > EDGE_EPS {
        return false;
    }
    p[0] >= a[0].min(b[0]) - EDGE_EPS
        && p[0] <= a[0].max(b[0]) + EDGE_EPS
        && p[1] >= a[1].min(b[1]) - EDGE_EPS
        && p[1] <= a[1].max(b[1]) + EDGE_EPS
}
