use super::BoxOverlapTest;
use crate::bounding_volume::Obb;
use crate::math::{Matrix, Real, Vector, DEFAULT_EPSILON};
use na::SimdRealField;

/// Candidate axes with a squared length smaller than this are ignored.
///
/// Such axes come from nearly-parallel edges, for which the face axes already are sufficient.
pub const SAT_AXIS_EPSILON: Real = 1.0e-6;

/// Relative slack added to the projected radii before declaring a separation.
///
/// Boxes that touch, or lie flush against each other, must not be separated by rounding errors
/// on their relative position.
pub const SAT_RELATIVE_TOLERANCE: Real = 64.0 * DEFAULT_EPSILON;

/// The number of candidate separating axes between two oriented boxes.
pub const OBB_OBB_NUM_AXES: usize = 15;

/// Expresses `obb2` in the local frame of `obb1`.
///
/// Returns the rotation whose columns are the axes of `obb2` expressed in `obb1`’s frame, and the
/// translation from the center of `obb1` to the center of `obb2`, in `obb1`’s frame.
#[inline]
pub fn obb_obb_relative_frame(obb1: &Obb, obb2: &Obb) -> (Matrix<Real>, Vector<Real>) {
    let r = obb1.orientation.tr_mul(&obb2.orientation);
    let t = obb1.orientation.tr_mul(&(obb2.center - obb1.center));
    (r, t)
}

/// The magnitude of the box centers, bounding the rounding error of their relative position.
#[inline]
pub fn obb_obb_center_magnitude(obb1: &Obb, obb2: &Obb) -> Real {
    obb1.center.coords.amax() + obb2.center.coords.amax()
}

/// The 15 candidate separating axes between two boxes, in the local frame of the first box.
///
/// `r` is the relative rotation returned by [`obb_obb_relative_frame`]. The axes are, in order:
/// the three axes of the first box, the three axes of the second box, and the nine cross products
/// `e_i × r_j` of an axis of the first box with an axis of the second box. They are not
/// normalized.
pub fn obb_obb_candidate_axes(r: &Matrix<Real>) -> [Vector<Real>; OBB_OBB_NUM_AXES] {
    let mut axes = [Vector::zeros(); OBB_OBB_NUM_AXES];

    for i in 0..3 {
        axes[i] = Vector::ith(i, 1.0);
        axes[3 + i] = r.column(i).into_owned();
    }

    for i in 0..3 {
        for j in 0..3 {
            axes[6 + i * 3 + j] = Vector::ith(i, 1.0).cross(&r.column(j));
        }
    }

    axes
}

/// Projects two boxes on an axis, in the local frame of the first box.
///
/// Returns the squared length of the axis, the distance between the projected box centers, and
/// the sum of the projected box radii enlarged by `tolerance` times the magnitude of the terms
/// involved. `center_magnitude` is given by [`obb_obb_center_magnitude`]. The boxes are separated along this axis if the distance is strictly greater than
/// this enlarged radius.
///
/// This is generic so that the scalar and SIMD overlap tests perform exactly the same sequence of
/// floating-point operations.
#[inline(always)]
pub(super) fn project_on_axis<N: SimdRealField + Copy>(
    axis: &Vector<N>,
    half_extents1: &Vector<N>,
    half_extents2: &Vector<N>,
    r: &Matrix<N>,
    t: &Vector<N>,
    center_magnitude: N,
    tolerance: N,
) -> (N, N, N) {
    let (x, y, z) = (axis.x, axis.y, axis.z);
    let norm_squared = x * x + y * y + z * z;

    let radius1 = half_extents1.x * x.simd_abs()
        + half_extents1.y * y.simd_abs()
        + half_extents1.z * z.simd_abs();

    let mut radius2 = N::zero();
    for j in 0..3 {
        let proj = x * r[(0, j)] + y * r[(1, j)] + z * r[(2, j)];
        radius2 += half_extents2[j] * proj.simd_abs();
    }

    let (dx, dy, dz) = (x * t.x, y * t.y, z * t.z);
    let dist = (dx + dy + dz).simd_abs();
    let radius = radius1 + radius2;
    let axis_l1 = x.simd_abs() + y.simd_abs() + z.simd_abs();
    let slack = tolerance
        * (radius + dx.simd_abs() + dy.simd_abs() + dz.simd_abs() + axis_l1 * center_magnitude);

    (norm_squared, dist, radius + slack)
}

/// Tests if `axis` separates two boxes, in the local frame of the first box.
///
/// Degenerate axes, with a squared length smaller than [`SAT_AXIS_EPSILON`], never separate.
#[inline]
pub fn obb_obb_separated_on_axis(
    axis: &Vector<Real>,
    half_extents1: &Vector<Real>,
    half_extents2: &Vector<Real>,
    r: &Matrix<Real>,
    t: &Vector<Real>,
    center_magnitude: Real,
) -> bool {
    let (norm_squared, dist, radius) = project_on_axis(
        axis,
        half_extents1,
        half_extents2,
        r,
        t,
        center_magnitude,
        SAT_RELATIVE_TOLERANCE,
    );
    norm_squared > SAT_AXIS_EPSILON && dist > radius
}

/// Reference box-box overlap test, checking one candidate axis at a time.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ScalarObbOverlap;

impl BoxOverlapTest for ScalarObbOverlap {
    fn intersects(&self, obb1: &Obb, obb2: &Obb) -> bool {
        let (r, t) = obb_obb_relative_frame(obb1, obb2);
        let center_magnitude = obb_obb_center_magnitude(obb1, obb2);

        !obb_obb_candidate_axes(&r).iter().any(|axis| {
            obb_obb_separated_on_axis(
                axis,
                &obb1.half_extents,
                &obb2.half_extents,
                &r,
                &t,
                center_magnitude,
            )
        })
    }
}
