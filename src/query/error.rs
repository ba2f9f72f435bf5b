/// Error indicating that a tree-pair query was given invalid inputs.
#[derive(thiserror::Error, Debug, Copy, Clone, Eq, PartialEq)]
pub enum QueryError {
    /// The traversal work list must be empty when the query starts.
    #[error("the traversal work list must be empty, but it contains {0} items.")]
    NonEmptyWorkList(usize),
    /// The scale factor of a mesh instance isn’t finite and strictly positive.
    #[error("the mesh instance {mesh_id} has a non-positive or non-finite scale factor.")]
    InvalidScale {
        /// The identifier of the invalid mesh instance.
        mesh_id: u32,
    },
    /// The vertex buffer of a mesh instance doesn’t match its OBB tree.
    #[error("the mesh instance {mesh_id} has {found} vertices but its OBB tree was built for {expected} vertices.")]
    VertexCountMismatch {
        /// The identifier of the invalid mesh instance.
        mesh_id: u32,
        /// The number of vertices the tree was built for.
        expected: u32,
        /// The number of vertices of the instance.
        found: usize,
    },
}
