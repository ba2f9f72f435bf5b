//! Boolean intersection tests between the primitives of a mesh.

pub use self::intersection_test_triangle_triangle::intersection_test_triangle_triangle;

mod intersection_test_triangle_triangle;
