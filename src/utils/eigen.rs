use crate::math::{Matrix, Real, Vector, DEFAULT_EPSILON};
use ordered_float::OrderedFloat;

/// Maximum number of QR iterations before giving up on the eigen-decomposition.
const MAX_ITERATIONS: usize = 64;

/// The eigen-decomposition of a symmetric 3x3 matrix.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SymmetricEigen3 {
    /// The eigenvectors, stored as the columns of a rotation matrix.
    ///
    /// The columns are orthonormal, form a right-handed basis, and are sorted by decreasing
    /// eigenvalue.
    pub eigenvectors: Matrix<Real>,
    /// The eigenvalues, sorted in decreasing order.
    pub eigenvalues: Vector<Real>,
    /// Set to `false` if the decomposition did not converge. In that case `eigenvectors` is
    /// the identity matrix and `eigenvalues` is the diagonal of the input matrix.
    pub converged: bool,
}

impl SymmetricEigen3 {
    fn identity_fallback(m: &Matrix<Real>) -> Self {
        Self {
            eigenvectors: Matrix::identity(),
            eigenvalues: m.diagonal(),
            converged: false,
        }
    }
}

/// Computes the eigenvectors and eigenvalues of the symmetric matrix `m`.
///
/// Only the lower-triangular part of `m` is read. This never fails: if the iterative solver does
/// not converge, or if `m` contains non-finite values, the identity basis is returned with
/// [`SymmetricEigen3::converged`] set to `false`.
///
/// ```
/// # #[cfg(feature = "f32")] {
/// use obbtree3d::math::Matrix;
/// use obbtree3d::utils::symmetric_eigen3;
///
/// let m = Matrix::new(
///     1.0, 0.0, 0.0,
///     0.0, 3.0, 0.0,
///     0.0, 0.0, 2.0,
/// );
/// let eig = symmetric_eigen3(&m);
/// assert!(eig.converged);
/// assert!((eig.eigenvalues.x - 3.0).abs() < 1.0e-5);
/// assert!((eig.eigenvectors.column(0).y.abs() - 1.0).abs() < 1.0e-5);
/// # }
/// ```
pub fn symmetric_eigen3(m: &Matrix<Real>) -> SymmetricEigen3 {
    if !m.iter().all(|e| e.is_finite()) {
        log::debug!("Non-finite matrix given to the symmetric eigen solver, using the identity basis.");
        return SymmetricEigen3::identity_fallback(m);
    }

    let Some(eig) = m.try_symmetric_eigen(DEFAULT_EPSILON, MAX_ITERATIONS) else {
        log::debug!("The symmetric eigen solver did not converge, using the identity basis.");
        return SymmetricEigen3::identity_fallback(m);
    };

    // Largest spread first. The sort is stable so ties keep the solver's order.
    let mut order = [0, 1, 2];
    order.sort_by_key(|i| OrderedFloat(-eig.eigenvalues[*i]));

    let sorted = Matrix::from_columns(&[
        eig.eigenvectors.column(order[0]).into_owned(),
        eig.eigenvectors.column(order[1]).into_owned(),
        eig.eigenvectors.column(order[2]).into_owned(),
    ]);
    let eigenvalues = Vector::new(
        eig.eigenvalues[order[0]],
        eig.eigenvalues[order[1]],
        eig.eigenvalues[order[2]],
    );

    match orthonormalize_basis(&sorted) {
        Some(eigenvectors) => SymmetricEigen3 {
            eigenvectors,
            eigenvalues,
            converged: true,
        },
        None => {
            log::debug!("Degenerate eigenvectors returned by the symmetric eigen solver, using the identity basis.");
            SymmetricEigen3::identity_fallback(m)
        }
    }
}

/// Re-orthonormalizes the columns of `basis` with Gram-Schmidt.
///
/// The first column keeps its direction, the second one is made orthogonal to the first, and the
/// third one is recomputed as their cross product so the result is always right-handed.
pub(crate) fn orthonormalize_basis(basis: &Matrix<Real>) -> Option<Matrix<Real>> {
    let c0 = basis.column(0).try_normalize(DEFAULT_EPSILON)?;
    let v1 = basis.column(1).into_owned();
    let c1 = (v1 - c0 * c0.dot(&v1)).try_normalize(DEFAULT_EPSILON)?;
    let c2 = c0.cross(&c1);
    Some(Matrix::from_columns(&[c0, c1, c2]))
}
