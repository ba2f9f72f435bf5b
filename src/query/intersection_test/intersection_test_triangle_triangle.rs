use crate::math::{Real, Vector, DEFAULT_EPSILON};
use crate::shape::Triangle;

/// Tests if two triangles intersect, using the separating axis theorem.
///
/// The candidate axes are the two triangle normals, the nine cross products of an edge of the
/// first triangle with an edge of the second triangle, and the six in-plane normals of the
/// triangle edges, which are required to separate coplanar triangles. Triangles that merely
/// touch are considered intersecting.
///
/// ```
/// # #[cfg(feature = "f32")] {
/// use obbtree3d::math::Point;
/// use obbtree3d::query::intersection_test_triangle_triangle;
/// use obbtree3d::shape::Triangle;
///
/// let tri1 = Triangle::new(
///     Point::new(0.0, 0.0, 0.0),
///     Point::new(2.0, 0.0, 0.0),
///     Point::new(0.0, 2.0, 0.0),
/// );
/// let tri2 = Triangle::new(
///     Point::new(0.5, 0.5, -1.0),
///     Point::new(0.5, 0.5, 1.0),
///     Point::new(5.0, 5.0, 0.0),
/// );
///
/// assert!(intersection_test_triangle_triangle(&tri1, &tri2));
/// # }
/// ```
pub fn intersection_test_triangle_triangle(tri1: &Triangle, tri2: &Triangle) -> bool {
    let edges1 = tri1.edges_scaled_directions();
    let edges2 = tri2.edges_scaled_directions();
    let n1 = tri1.scaled_normal();
    let n2 = tri2.scaled_normal();

    if separated_on_axis(tri1, tri2, &n1) || separated_on_axis(tri1, tri2, &n2) {
        return false;
    }

    for e1 in &edges1 {
        for e2 in &edges2 {
            if separated_on_cross_product(tri1, tri2, e1, e2) {
                return false;
            }
        }
    }

    // In-plane edge normals.
    for e1 in &edges1 {
        if separated_on_cross_product(tri1, tri2, &n1, e1) {
            return false;
        }
    }

    for e2 in &edges2 {
        if separated_on_cross_product(tri1, tri2, &n2, e2) {
            return false;
        }
    }

    true
}

/// Tests if `a × b` is a separating axis, ignoring it if `a` and `b` are nearly parallel.
#[inline]
fn separated_on_cross_product(
    tri1: &Triangle,
    tri2: &Triangle,
    a: &Vector<Real>,
    b: &Vector<Real>,
) -> bool {
    let axis = a.cross(b);
    let threshold = DEFAULT_EPSILON * a.norm_squared() * b.norm_squared();

    axis.norm_squared() > threshold && separated_on_axis(tri1, tri2, &axis)
}

#[inline]
fn separated_on_axis(tri1: &Triangle, tri2: &Triangle, axis: &Vector<Real>) -> bool {
    if axis.iter().all(|e| *e == 0.0) {
        return false;
    }

    let (min1, max1) = tri1.extents_on_dir(axis);
    let (min2, max2) = tri2.extents_on_dir(axis);
    max1 < min2 || max2 < min1
}
