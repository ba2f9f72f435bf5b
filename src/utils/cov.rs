use crate::math::{Matrix, Point, Real};

/// Computes the covariance matrix of a set of points.
///
/// Returns the zero matrix if `pts` is empty.
pub fn cov(pts: &[Point<Real>]) -> Matrix<Real> {
    center_cov(pts).map(|(_, cov)| cov).unwrap_or_else(Matrix::zeros)
}

/// Computes the center and the covariance matrix of a set of points.
///
/// The covariance is taken about the centroid, every point having the same weight.
/// Returns `None` if `pts` is empty.
pub fn center_cov(pts: &[Point<Real>]) -> Option<(Point<Real>, Matrix<Real>)> {
    let center = crate::utils::center(pts)?;
    let mut cov = Matrix::zeros();
    let normalizer = 1.0 / pts.len() as Real;

    for p in pts {
        let cp = *p - center;
        // NOTE: this is more numerically stable than accumulating raw second moments.
        cov += cp * (cp * normalizer).transpose();
    }

    Some((center, cov))
}
