//! Oriented bounding box.

use crate::math::{Isometry, Matrix, Point, Real, Vector, DEFAULT_EPSILON, DIM};
use crate::utils::{self, SymmetricEigen3};

/// Relative margin added to the half-extents of fitted boxes.
///
/// The margin is proportional to the magnitude of the point coordinates along the box axes, so
/// that rounding errors on the basis and the center never leave a point outside of its box.
pub const OBB_FIT_TOLERANCE: Real = 16.0 * DEFAULT_EPSILON;

/// An oriented bounding box.
///
/// The box axes are the columns of `orientation`. They are expressed directly in the frame the
/// box lives in (for example the object-space of a mesh), never relative to another box.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Obb {
    /// The orthonormal basis of this box, one axis per column.
    pub orientation: Matrix<Real>,
    /// The center of this box.
    pub center: Point<Real>,
    /// The half-lengths of this box along each of its axes.
    pub half_extents: Vector<Real>,
}

impl Obb {
    /// Creates a new oriented box.
    #[inline]
    pub fn new(orientation: Matrix<Real>, center: Point<Real>, half_extents: Vector<Real>) -> Self {
        Self {
            orientation,
            center,
            half_extents,
        }
    }

    /// An axis-aligned box with the given center and half-extents.
    #[inline]
    pub fn from_half_extents(center: Point<Real>, half_extents: Vector<Real>) -> Self {
        Self::new(Matrix::identity(), center, half_extents)
    }

    /// Computes the smallest box with axes `basis` that encloses all the given points.
    ///
    /// The half-extents are enlarged by [`OBB_FIT_TOLERANCE`] times the largest projected
    /// coordinate. Returns a degenerate box centered at the origin if `pts` is empty.
    pub fn from_points_with_basis(basis: &Matrix<Real>, pts: &[Point<Real>]) -> Self {
        if pts.is_empty() {
            return Self::new(*basis, Point::origin(), Vector::zeros());
        }

        let mut mins = Vector::repeat(Real::MAX);
        let mut maxs = Vector::repeat(-Real::MAX);

        for pt in pts {
            for i in 0..DIM {
                let dot = basis.column(i).dot(&pt.coords);
                mins[i] = mins[i].min(dot);
                maxs[i] = maxs[i].max(dot);
            }
        }

        let margin = OBB_FIT_TOLERANCE * mins.amax().max(maxs.amax());

        Self::new(
            *basis,
            Point::from(basis * ((maxs + mins) / 2.0)),
            (maxs - mins) / 2.0 + Vector::repeat(margin),
        )
    }

    /// Computes an oriented bounding box of a point cloud, aligned with its principal axes.
    ///
    /// The axes are sorted by decreasing spread of the points. The returned box is not
    /// guaranteed to be the smallest enclosing box, but it is a good fit for most inputs. The
    /// eigen-decomposition used to find the axes is returned too.
    pub fn from_points(pts: &[Point<Real>]) -> (Self, SymmetricEigen3) {
        let cov = utils::cov(pts);
        let eig = utils::symmetric_eigen3(&cov);
        (Self::from_points_with_basis(&eig.eigenvectors, pts), eig)
    }

    /// The full lengths of this box along each of its axes.
    #[inline]
    pub fn extents(&self) -> Vector<Real> {
        self.half_extents * 2.0
    }

    /// The volume of this box.
    #[inline]
    pub fn volume(&self) -> Real {
        let extents = self.extents();
        extents.x * extents.y * extents.z
    }

    /// Transforms this box by a uniform scale, followed by the rigid transform `pos`.
    #[inline]
    pub fn scaled_transformed(&self, pos: &Isometry<Real>, scale: Real) -> Self {
        let rot = pos.rotation.to_rotation_matrix();
        Self::new(
            rot.matrix() * self.orientation,
            pos * (self.center * scale),
            self.half_extents * scale,
        )
    }

    /// Tests if `pt` is inside of this box, enlarged by `margin` along every axis.
    pub fn contains_point_with_margin(&self, pt: &Point<Real>, margin: Real) -> bool {
        let local = self.orientation.tr_mul(&(pt - self.center));
        (0..DIM).all(|i| local[i].abs() <= self.half_extents[i] + margin)
    }

    /// The eight corners of this box.
    pub fn vertices(&self) -> [Point<Real>; 8] {
        let mut res = [self.center; 8];

        for (i, pt) in res.iter_mut().enumerate() {
            for k in 0..DIM {
                let sign = if (i >> k) & 1 == 0 { -1.0 } else { 1.0 };
                *pt += self.orientation.column(k) * (self.half_extents[k] * sign);
            }
        }

        res
    }
}
