use crate::math::Real;
use ordered_float::OrderedFloat;

/// Computes the median of a set of values.
///
/// The values are sorted in-place. For an even number of values, the mean of the two middle
/// values is returned. Returns `None` if `vals` is empty.
#[inline]
pub fn median(vals: &mut [Real]) -> Option<Real> {
    if vals.is_empty() {
        return None;
    }

    vals.sort_unstable_by_key(|v| OrderedFloat(*v));

    let n = vals.len();

    if n % 2 == 0 {
        Some((vals[n / 2 - 1] + vals[n / 2]) / 2.0)
    } else {
        Some(vals[n / 2])
    }
}
