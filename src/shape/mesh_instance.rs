use crate::math::{Isometry, Point, Real};
use crate::shape::Triangle;

/// A posed and uniformly-scaled occurrence of a mesh in the world.
///
/// A single [`ObbTree`](crate::partitioning::ObbTree) can be shared by any number of instances of
/// the same mesh shape. The instance provides everything the tree itself doesn’t store: the
/// vertex buffer its face indices refer to, and the per-frame world pose.
#[derive(Copy, Clone, Debug)]
pub struct MeshInstance<'a> {
    /// A user-defined identifier of this mesh instance, reported in collisions.
    pub mesh_id: u32,
    /// The world-space rigid transform of this instance.
    pub pos: Isometry<Real>,
    /// The uniform scale factor applied before `pos`. Must be positive.
    pub scale: Real,
    /// The object-space vertex buffer of the mesh.
    pub vertices: &'a [Point<Real>],
}

impl<'a> MeshInstance<'a> {
    /// Creates an instance of the mesh with vertices `vertices`, with a unit scale.
    pub fn new(mesh_id: u32, pos: Isometry<Real>, vertices: &'a [Point<Real>]) -> Self {
        Self {
            mesh_id,
            pos,
            scale: 1.0,
            vertices,
        }
    }

    /// Sets the uniform scale factor of this instance.
    pub fn with_scale(mut self, scale: Real) -> Self {
        self.scale = scale;
        self
    }

    /// Is the scale factor of this instance strictly positive and finite?
    #[inline]
    pub fn has_valid_scale(&self) -> bool {
        self.scale > 0.0 && self.scale.is_finite()
    }

    /// The world-space triangle formed by the three given vertex indices.
    #[inline]
    pub fn world_triangle(&self, idx: [u32; 3]) -> Triangle {
        Triangle::new(
            self.vertices[idx[0] as usize],
            self.vertices[idx[1] as usize],
            self.vertices[idx[2] as usize],
        )
        .scaled_transformed(&self.pos, self.scale)
    }
}
