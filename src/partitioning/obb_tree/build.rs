use super::split::{split_faces, SplitWorkspace};
use super::{ObbNode, ObbNodeStore, ObbTree, SplitHeuristic};
use crate::bounding_volume::Obb;
use crate::math::{Point, Real};
use crate::utils::{
    HashSetIndexExtractor, MarkingIndexExtractor, UniqueIndexExtractor, UniqueIndexStrategy,
};

/// Ranges with this many triangles or less are never split.
pub const LEAF_FACE_THRESHOLD: usize = 1;

/// The maximum number of triangles of a mesh.
///
/// The `2n - 1` node indices of a tree must fit in the signed links of its persisted records.
pub const MAX_NUM_FACES: usize = (i32::MAX as usize).div_ceil(2);

/// Indicates an invalid input given to the OBB tree construction.
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum ObbTreeBuildError {
    /// An OBB tree must contain at least one triangle.
    #[error("an OBB tree must contain at least one triangle.")]
    EmptyIndices,
    /// A triangle references a vertex that doesn’t exist.
    #[error("the triangle {face} references the vertex {vertex} but the mesh only has {num_vertices} vertices.")]
    VertexIndexOutOfBounds {
        /// The index of the invalid triangle.
        face: u32,
        /// The out-of-bounds vertex index.
        vertex: u32,
        /// The number of vertices of the mesh.
        num_vertices: usize,
    },
    /// The mesh has more than [`MAX_NUM_FACES`] triangles, or more vertices than an `u32` can index.
    #[error("the mesh is too large: {num_faces} triangles and {num_vertices} vertices.")]
    TooLarge {
        /// The number of triangles of the mesh.
        num_faces: usize,
        /// The number of vertices of the mesh.
        num_vertices: usize,
    },
}

/// Parameters of the OBB tree construction.
#[derive(Default, Clone, Debug, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ObbTreeBuildParams {
    /// The rule used to find the splitting point along each candidate axis.
    pub split_heuristic: SplitHeuristic,
    /// The vertex deduplication strategy. It affects memory usage and speed, not the result.
    pub unique_index_strategy: UniqueIndexStrategy,
}

/// Workspace data for the construction of OBB trees.
///
/// This is all temporary data that is never referenced by the built tree. The main reason to
/// reuse the same instance of this over several builds is to lower the cost of internal
/// allocations.
#[derive(Clone, Debug, Default)]
pub struct ObbTreeWorkspace {
    marking: MarkingIndexExtractor,
    hashset: HashSetIndexExtractor,
    unique_indices: Vec<u32>,
    points: Vec<Point<Real>>,
    split: SplitWorkspace,
    stack: Vec<BuildTask>,
}

impl ObbTreeWorkspace {
    /// Collects into `self.points` the distinct vertices referenced by `face_pool`.
    fn gather_unique_vertices(
        &mut self,
        strategy: UniqueIndexStrategy,
        vertices: &[Point<Real>],
        face_pool: &[u32],
    ) {
        match strategy {
            UniqueIndexStrategy::Marking => {
                self.marking.extract(face_pool, &mut self.unique_indices)
            }
            UniqueIndexStrategy::HashSet => {
                self.hashset.extract(face_pool, &mut self.unique_indices)
            }
        }

        self.points.clear();
        self.points.extend(
            self.unique_indices
                .iter()
                .map(|vid| vertices[*vid as usize]),
        );
    }
}

/// A range of triangles waiting to become the node `node`.
#[derive(Copy, Clone, Debug)]
struct BuildTask {
    node: u32,
    parent: u32,
    first_face: usize,
    num_faces: usize,
    depth: u32,
}

impl ObbTree {
    /// Builds the OBB tree of a triangle mesh with the default parameters.
    ///
    /// ```
    /// # #[cfg(feature = "f32")] {
    /// use obbtree3d::math::Point;
    /// use obbtree3d::partitioning::ObbTree;
    ///
    /// let vertices = [
    ///     Point::new(0.0, 0.0, 0.0),
    ///     Point::new(1.0, 0.0, 0.0),
    ///     Point::new(0.0, 1.0, 0.0),
    ///     Point::new(0.0, 0.0, 1.0),
    /// ];
    /// let indices = [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]];
    /// let tree = ObbTree::new(&vertices, &indices).unwrap();
    ///
    /// assert_eq!(tree.num_nodes(), 2 * indices.len() - 1);
    /// assert_eq!(tree.leaves().count(), indices.len());
    /// # }
    /// ```
    pub fn new(vertices: &[Point<Real>], indices: &[[u32; 3]]) -> Result<Self, ObbTreeBuildError> {
        Self::with_params(
            vertices,
            indices,
            &ObbTreeBuildParams::default(),
            &mut ObbTreeWorkspace::default(),
        )
    }

    /// Builds the OBB tree of a triangle mesh.
    ///
    /// Construction never fails on degenerate geometry (flat, needle-shaped, or duplicated
    /// triangles): such inputs just produce a less balanced tree. Errors are only returned for
    /// inputs that don’t describe a valid mesh.
    pub fn with_params(
        vertices: &[Point<Real>],
        indices: &[[u32; 3]],
        params: &ObbTreeBuildParams,
        workspace: &mut ObbTreeWorkspace,
    ) -> Result<Self, ObbTreeBuildError> {
        validate_mesh(vertices, indices)?;

        let num_faces = indices.len();
        let mut store = ObbNodeStore::with_faces(indices);

        if params.unique_index_strategy == UniqueIndexStrategy::Marking {
            workspace.marking.reset(vertices.len());
        }

        workspace.stack.clear();
        workspace.stack.push(BuildTask {
            node: store.push_placeholder(),
            parent: ObbNode::INVALID,
            first_face: 0,
            num_faces,
            depth: 0,
        });

        while let Some(task) = workspace.stack.pop() {
            build_node(&mut store, vertices, params, workspace, task);
        }

        debug_assert_eq!(store.len(), 2 * num_faces - 1);

        Ok(Self {
            store,
            num_vertices: vertices.len() as u32,
        })
    }
}

fn validate_mesh(vertices: &[Point<Real>], indices: &[[u32; 3]]) -> Result<(), ObbTreeBuildError> {
    if indices.is_empty() {
        return Err(ObbTreeBuildError::EmptyIndices);
    }

    check_mesh_size(indices.len(), vertices.len())?;

    for (face, idx) in indices.iter().enumerate() {
        if let Some(vertex) = idx.iter().find(|vid| **vid as usize >= vertices.len()) {
            return Err(ObbTreeBuildError::VertexIndexOutOfBounds {
                face: face as u32,
                vertex: *vertex,
                num_vertices: vertices.len(),
            });
        }
    }

    Ok(())
}

fn check_mesh_size(num_faces: usize, num_vertices: usize) -> Result<(), ObbTreeBuildError> {
    if num_faces > MAX_NUM_FACES || num_vertices > u32::MAX as usize {
        Err(ObbTreeBuildError::TooLarge {
            num_faces,
            num_vertices,
        })
    } else {
        Ok(())
    }
}

fn build_node(
    store: &mut ObbNodeStore,
    vertices: &[Point<Real>],
    params: &ObbTreeBuildParams,
    workspace: &mut ObbTreeWorkspace,
    task: BuildTask,
) {
    let faces = task.first_face..task.first_face + task.num_faces;
    let (face_pool, face_ids) = store.faces_mut(faces);

    workspace.gather_unique_vertices(params.unique_index_strategy, vertices, face_pool);
    let (obb, eig) = Obb::from_points(&workspace.points);

    let num_first = if task.num_faces > LEAF_FACE_THRESHOLD {
        split_faces(
            params.split_heuristic,
            &eig.eigenvectors,
            vertices,
            face_pool,
            face_ids,
            &mut workspace.split,
        )
    } else {
        None
    };

    let node = match num_first {
        Some(num_first) => {
            let children = store.push_placeholder_pair();
            let depth = task.depth + 1;

            // The first child is popped, and thus built, first.
            workspace.stack.push(BuildTask {
                node: children[1],
                parent: task.node,
                first_face: task.first_face + num_first,
                num_faces: task.num_faces - num_first,
                depth,
            });
            workspace.stack.push(BuildTask {
                node: children[0],
                parent: task.node,
                first_face: task.first_face,
                num_faces: num_first,
                depth,
            });

            ObbNode::internal(obb, task.parent, children, task.depth)
        }
        None => ObbNode::leaf(
            obb,
            task.parent,
            (task.first_face * 3) as u32,
            task.num_faces as u32,
            task.depth,
        ),
    };

    store.set(task.node, node);
}
