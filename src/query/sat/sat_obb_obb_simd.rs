use super::sat_obb_obb::{
    obb_obb_candidate_axes, obb_obb_center_magnitude, obb_obb_relative_frame, project_on_axis, OBB_OBB_NUM_AXES,
    SAT_AXIS_EPSILON, SAT_RELATIVE_TOLERANCE,
};
use super::BoxOverlapTest;
use crate::bounding_volume::Obb;
use crate::math::{Real, SimdReal, Vector, SIMD_WIDTH};
use num::Zero;
use simba::simd::{SimdBool as _, SimdPartialOrd, SimdValue};

const NUM_AXIS_PACKS: usize = OBB_OBB_NUM_AXES.div_ceil(SIMD_WIDTH);

/// Vectorized box-box overlap test, checking [`SIMD_WIDTH`] candidate axes at once.
///
/// The 15 candidate axes are packed in 4 groups of 4 lanes, the last lane being a zero axis that
/// is always ignored. Each lane performs exactly the same operations as [`ScalarObbOverlap`], so
/// both tests always return the same result.
///
/// [`ScalarObbOverlap`]: super::ScalarObbOverlap
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SimdObbOverlap;

impl BoxOverlapTest for SimdObbOverlap {
    fn intersects(&self, obb1: &Obb, obb2: &Obb) -> bool {
        let (r, t) = obb_obb_relative_frame(obb1, obb2);
        let axes = obb_obb_candidate_axes(&r);

        let half_extents1 = obb1.half_extents.map(SimdReal::splat);
        let half_extents2 = obb2.half_extents.map(SimdReal::splat);
        let r = r.map(SimdReal::splat);
        let t = t.map(SimdReal::splat);
        let epsilon = SimdReal::splat(SAT_AXIS_EPSILON);
        let tolerance = SimdReal::splat(SAT_RELATIVE_TOLERANCE);
        let center_magnitude = SimdReal::splat(obb_obb_center_magnitude(obb1, obb2));

        for pack in 0..NUM_AXIS_PACKS {
            let axis = simd_axes(&axes, pack * SIMD_WIDTH);
            let (norm_squared, dist, radius) = project_on_axis(
                &axis,
                &half_extents1,
                &half_extents2,
                &r,
                &t,
                center_magnitude,
                tolerance,
            );
            let separated = norm_squared.simd_gt(epsilon) & dist.simd_gt(radius);

            if separated.any() {
                return false;
            }
        }

        true
    }
}

/// Packs the axes `first..first + SIMD_WIDTH` into SIMD lanes, padding with zero axes.
#[inline(always)]
fn simd_axes(axes: &[Vector<Real>; OBB_OBB_NUM_AXES], first: usize) -> Vector<SimdReal> {
    let mut x = [Real::zero(); SIMD_WIDTH];
    let mut y = [Real::zero(); SIMD_WIDTH];
    let mut z = [Real::zero(); SIMD_WIDTH];

    for (lane, axis) in axes.iter().skip(first).take(SIMD_WIDTH).enumerate() {
        x[lane] = axis.x;
        y[lane] = axis.y;
        z[lane] = axis.z;
    }

    Vector::new(SimdReal::from(x), SimdReal::from(y), SimdReal::from(z))
}
