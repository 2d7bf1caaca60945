//! Perspective rectification of image points onto the road plane.
//!
//! The homography is solved exactly from four point correspondences, the same
//! way a calibration tool maps a trapezoid painted on the road to a rectangle
//! of known physical size.

use nalgebra::{Matrix3, SMatrix, SVector, Vector3};
use ndarray::{Array2, ArrayView2};

use crate::error::{Error, Result};

/// Quadrilaterals with a doubled triangle area below this are treated as
/// collinear.
const COLLINEAR_EPS: f64 = 1e-9;

/// Maps image-plane points to ground-plane points through a fixed homography.
///
/// Read-only after construction, so it can be shared freely.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewTransformer {
    m: Matrix3<f64>,
}

impl ViewTransformer {
    /// Build the homography mapping `source[i]` to `target[i]`.
    ///
    /// Both regions must contain exactly four points in the same winding
    /// order, no three of them collinear.
    pub fn new(source: &[[f64; 2]], target: &[[f64; 2]]) -> Result<Self> {
        let source = quad(source)?;
        let target = quad(target)?;
        check_non_degenerate(&source, "source")?;
        check_non_degenerate(&target, "target")?;

        let mut a = SMatrix::<f64, 8, 8>::zeros();
        let mut b = SVector::<f64, 8>::zeros();
        for i in 0..4 {
            let [x, y] = source[i];
            let [u, v] = target[i];

            // u * (g*x + h*y + 1) = a*x + b*y + c
            a[(2 * i, 0)] = x;
            a[(2 * i, 1)] = y;
            a[(2 * i, 2)] = 1.0;
            a[(2 * i, 6)] = -x * u;
            a[(2 * i, 7)] = -y * u;
            b[2 * i] = u;

            // v * (g*x + h*y + 1) = d*x + e*y + f
            a[(2 * i + 1, 3)] = x;
            a[(2 * i + 1, 4)] = y;
            a[(2 * i + 1, 5)] = 1.0;
            a[(2 * i + 1, 6)] = -x * v;
            a[(2 * i + 1, 7)] = -y * v;
            b[2 * i + 1] = v;
        }

        let h = a
            .lu()
            .solve(&b)
            .ok_or_else(|| Error::DegenerateRegion("singular correspondence system".into()))?;

        let m = Matrix3::new(h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0);
        Ok(Self { m })
    }

    /// The 3x3 homography matrix.
    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.m
    }

    /// Transformer for the opposite direction (ground plane to image).
    pub fn inverse(&self) -> Result<Self> {
        let inv = self
            .m
            .try_inverse()
            .ok_or_else(|| Error::DegenerateRegion("homography is not invertible".into()))?;
        let scale = inv[(2, 2)];
        let m = if scale.abs() > f64::EPSILON {
            inv / scale
        } else {
            inv
        };
        Ok(Self { m })
    }

    /// Project a single point. Points on the horizon line map to NaN.
    pub fn transform_point(&self, point: [f64; 2]) -> [f64; 2] {
        let p = self.m * Vector3::new(point[0], point[1], 1.0);
        if p[2].abs() < 1e-15 {
            return [f64::NAN, f64::NAN];
        }
        [p[0] / p[2], p[1] / p[2]]
    }

    /// Project an `N x 2` batch of points, preserving order and count.
    ///
    /// An empty batch yields an empty `0 x 2` array.
    ///
    /// # Panics
    /// If `points` has fewer than two columns.
    pub fn transform_points(&self, points: ArrayView2<'_, f64>) -> Array2<f64> {
        let n = points.nrows();
        let mut out = Array2::zeros((n, 2));
        for (i, row) in points.rows().into_iter().enumerate() {
            let [u, v] = self.transform_point([row[0], row[1]]);
            out[[i, 0]] = u;
            out[[i, 1]] = v;
        }
        out
    }
}

fn quad(points: &[[f64; 2]]) -> Result<[[f64; 2]; 4]> {
    points.try_into().map_err(|_| Error::InvalidRegion {
        expected: 4,
        got: points.len(),
    })
}

fn check_non_degenerate(q: &[[f64; 2]; 4], name: &str) -> Result<()> {
    if q.iter().flatten().any(|c| !c.is_finite()) {
        return Err(Error::DegenerateRegion(format!(
            "{name} region has non-finite coordinates"
        )));
    }

    const TRIPLES: [[usize; 3]; 4] = [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]];
    for [i, j, k] in TRIPLES {
        let (a, b, c) = (q[i], q[j], q[k]);
        let cross = (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0]);
        if cross.abs() < COLLINEAR_EPS {
            return Err(Error::DegenerateRegion(format!(
                "{name} points {i}, {j}, {k} are collinear"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn road_transformer() -> ViewTransformer {
        let source = [[738.0, 534.0], [1040.0, 534.0], [1428.0, 1079.0], [448.0, 1079.0]];
        let target = [[0.0, 0.0], [2.5, 0.0], [2.5, 139.0], [0.0, 139.0]];
        ViewTransformer::new(&source, &target).unwrap()
    }

    #[test]
    fn test_corners_map_to_target() {
        let vt = road_transformer();
        let p = vt.transform_point([1428.0, 1079.0]);
        assert_relative_eq!(p[0], 2.5, epsilon = 1e-6);
        assert_relative_eq!(p[1], 139.0, epsilon = 1e-6);

        let p = vt.transform_point([738.0, 534.0]);
        assert_relative_eq!(p[0], 0.0, epsilon = 1e-6);
        assert_relative_eq!(p[1], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_axis_aligned_scaling() {
        let source = [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]];
        let target = [[0.0, 0.0], [3.0, 0.0], [3.0, 100.0], [0.0, 100.0]];
        let vt = ViewTransformer::new(&source, &target).unwrap();

        let out = vt.transform_points(array![[5.0, 5.0], [0.0, 2.0]].view());
        assert_relative_eq!(out[[0, 0]], 1.5, epsilon = 1e-9);
        assert_relative_eq!(out[[0, 1]], 50.0, epsilon = 1e-9);
        assert_relative_eq!(out[[1, 0]], 0.0, epsilon = 1e-9);
        assert_relative_eq!(out[[1, 1]], 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_empty_batch() {
        let vt = road_transformer();
        let empty = Array2::<f64>::zeros((0, 2));
        let out = vt.transform_points(empty.view());
        assert_eq!(out.dim(), (0, 2));
    }

    #[test]
    fn test_inverse_round_trip() {
        let vt = road_transformer();
        let inv = vt.inverse().unwrap();

        let ground = array![[0.5, 10.0], [1.25, 70.0], [2.0, 120.0]];
        let image = inv.transform_points(ground.view());
        let back = vt.transform_points(image.view());

        for (a, b) in ground.iter().zip(back.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_wrong_point_count() {
        let source = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]];
        let target = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let err = ViewTransformer::new(&source, &target).unwrap_err();
        assert!(matches!(err, Error::InvalidRegion { expected: 4, got: 3 }));
    }

    #[test]
    fn test_collinear_source_rejected() {
        let source = [[0.0, 0.0], [5.0, 0.0], [10.0, 0.0], [0.0, 10.0]];
        let target = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let err = ViewTransformer::new(&source, &target).unwrap_err();
        assert!(matches!(err, Error::DegenerateRegion(_)));
    }
}
