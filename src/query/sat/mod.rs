//! Application of the Separating Axis Theorem (SAT) to oriented bounding boxes.
//!
//! Two convex shapes do not intersect if and only if there exists an axis onto which their
//! projections do not overlap. For two boxes, it is sufficient to check 15 candidate axes: the
//! three face normals of each box, and the nine cross products of an edge direction of the first
//! box with an edge direction of the second box.
//!
//! This module provides two implementations of this test, [`ScalarObbOverlap`] and
//! [`SimdObbOverlap`], that always agree with each other. [`SatImplementation`] selects one of
//! them at runtime. Both are conservative: boxes that touch, or are separated by less than the
//! rounding error of their relative position, are reported as overlapping.

pub use self::sat_obb_obb::{
    obb_obb_candidate_axes, obb_obb_center_magnitude, obb_obb_relative_frame,
    obb_obb_separated_on_axis, ScalarObbOverlap, OBB_OBB_NUM_AXES, SAT_AXIS_EPSILON,
    SAT_RELATIVE_TOLERANCE,
};
pub use self::sat_obb_obb_simd::SimdObbOverlap;

use crate::bounding_volume::Obb;

mod sat_obb_obb;
mod sat_obb_obb_simd;

/// A boolean overlap test between two oriented boxes expressed in the same frame.
pub trait BoxOverlapTest {
    /// Returns `true` if `obb1` and `obb2` intersect. Touching boxes intersect.
    fn intersects(&self, obb1: &Obb, obb2: &Obb) -> bool;
}

/// The implementation of the box-box separating axis test used by a traversal.
///
/// Both implementations return the same results, so this only affects performance.
#[derive(Default, Clone, Debug, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum SatImplementation {
    /// Use [`ScalarObbOverlap`].
    Scalar,
    /// Use [`SimdObbOverlap`].
    #[default]
    Simd,
}

impl BoxOverlapTest for SatImplementation {
    #[inline]
    fn intersects(&self, obb1: &Obb, obb2: &Obb) -> bool {
        match self {
            Self::Scalar => ScalarObbOverlap.intersects(obb1, obb2),
            Self::Simd => SimdObbOverlap.intersects(obb1, obb2),
        }
    }
}
