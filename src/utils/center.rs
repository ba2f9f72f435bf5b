use crate::math::{Point, Real};

/// Computes the geometric center (centroid) of a set of points.
///
/// All points are weighted equally. Returns `None` if `pts` is empty.
///
/// ```
/// # #[cfg(feature = "f32")] {
/// use obbtree3d::math::Point;
/// use obbtree3d::utils::center;
///
/// let pts = [
///     Point::new(0.0, 0.0, 0.0),
///     Point::new(4.0, 0.0, 0.0),
///     Point::new(0.0, 4.0, 0.0),
/// ];
/// let c = center(&pts).unwrap();
/// assert!((c.x - 4.0 / 3.0).abs() < 1.0e-6);
/// assert!((c.y - 4.0 / 3.0).abs() < 1.0e-6);
/// # }
/// ```
#[inline]
pub fn center(pts: &[Point<Real>]) -> Option<Point<Real>> {
    let (first, rest) = pts.split_first()?;
    let denom = 1.0 / pts.len() as Real;
    let mut res = *first * denom;

    for pt in rest {
        res += pt.coords * denom;
    }

    Some(res)
}
