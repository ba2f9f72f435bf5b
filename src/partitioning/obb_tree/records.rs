use super::validation::is_rotation_basis;
use super::{ObbNode, ObbNodeFlags, ObbNodeStore, ObbTree};
use crate::bounding_volume::Obb;
use crate::math::{Matrix, Point, Real, Vector};

/// The persisted form of a node of an [`ObbTree`].
///
/// Absent parent or children are encoded as `-1`. The orientation matrix is stored column by
/// column.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "bytemuck-serialize",
    derive(bytemuck::Pod, bytemuck::Zeroable)
)]
pub struct ObbNodeRecord {
    /// Index of the parent node, or -1 for the root.
    pub parent: i32,
    /// Index of the first child, or -1 for a leaf.
    pub child1: i32,
    /// Index of the second child, or -1 for a leaf.
    pub child2: i32,
    /// The bits of the node’s [`ObbNodeFlags`].
    pub flags: u32,
    /// Offset of the leaf’s first vertex index in the face pool.
    pub face_range_start: u32,
    /// Number of triangles of the leaf.
    pub face_count: u32,
    /// Depth of the node.
    pub depth: u32,
    /// Unused, always zero.
    pub padding: u32,
    /// The box axes, one per column.
    pub orientation: [[Real; 3]; 3],
    /// The box center.
    pub center: [Real; 3],
    /// The box half-extents.
    pub half_extents: [Real; 3],
}

static_assertions::assert_eq_size!(ObbNodeRecord, [u8; 32 + 15 * core::mem::size_of::<Real>()]);

impl ObbNodeRecord {
    fn encode_index(i: u32) -> i32 {
        if i == ObbNode::INVALID {
            -1
        } else {
            // Trees have at most `2 * MAX_NUM_FACES - 1` nodes.
            debug_assert!(i <= i32::MAX as u32);
            i as i32
        }
    }

    fn decode_index(i: i32) -> u32 {
        if i < 0 {
            ObbNode::INVALID
        } else {
            i as u32
        }
    }
}

impl From<&ObbNode> for ObbNodeRecord {
    fn from(node: &ObbNode) -> Self {
        let o = &node.obb.orientation;
        Self {
            parent: Self::encode_index(node.parent),
            child1: Self::encode_index(node.children[0]),
            child2: Self::encode_index(node.children[1]),
            flags: node.flags.bits(),
            face_range_start: node.face_range_start,
            face_count: node.face_count,
            depth: node.depth,
            padding: 0,
            orientation: [
                [o.m11, o.m21, o.m31],
                [o.m12, o.m22, o.m32],
                [o.m13, o.m23, o.m33],
            ],
            center: node.obb.center.coords.into(),
            half_extents: node.obb.half_extents.into(),
        }
    }
}

impl From<&ObbNodeRecord> for ObbNode {
    fn from(record: &ObbNodeRecord) -> Self {
        let [c0, c1, c2] = record.orientation;
        let orientation = Matrix::from_columns(&[Vector::from(c0), Vector::from(c1), Vector::from(c2)]);
        Self {
            obb: Obb::new(
                orientation,
                Point::from(record.center),
                Vector::from(record.half_extents),
            ),
            parent: ObbNodeRecord::decode_index(record.parent),
            children: [
                ObbNodeRecord::decode_index(record.child1),
                ObbNodeRecord::decode_index(record.child2),
            ],
            flags: ObbNodeFlags::from_bits_retain(record.flags),
            face_range_start: record.face_range_start,
            face_count: record.face_count,
            depth: record.depth,
        }
    }
}

/// The flat, persisted form of an [`ObbTree`].
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ObbTreeRecords {
    /// All the nodes, the root first.
    pub nodes: Vec<ObbNodeRecord>,
    /// The shared pool of vertex indices, three per triangle.
    pub face_pool: Vec<u32>,
    /// The original face index of each triangle of the pool.
    pub face_ids: Vec<u32>,
}

/// Error indicating that a set of records doesn’t describe a valid [`ObbTree`].
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum ObbTreeRecordsError {
    /// The records contain no triangle.
    #[error("the records contain no triangle.")]
    Empty,
    /// The array lengths are inconsistent with the number of triangles.
    #[error("expected {expected} {what} for {num_faces} triangles, found {found}.")]
    LengthMismatch {
        /// The inconsistent array.
        what: &'static str,
        /// The number of triangles, given by the length of the face id table.
        num_faces: usize,
        /// The expected array length.
        expected: usize,
        /// The actual array length.
        found: usize,
    },
    /// A vertex index of the face pool is out of bounds.
    #[error("the face pool references the vertex {vertex} but the mesh only has {num_vertices} vertices.")]
    VertexIndexOutOfBounds {
        /// The out-of-bounds vertex index.
        vertex: u32,
        /// The number of vertices of the mesh.
        num_vertices: u32,
    },
    /// The face id table isn’t a permutation of the triangle indices.
    #[error("the face id {0} is out of bounds or duplicated.")]
    InvalidFaceId(u32),
    /// The node links don’t form a full binary tree with leaves partitioning the face pool.
    #[error("invalid tree topology at node {node}: {reason}")]
    InvalidTopology {
        /// The node where the problem was detected.
        node: u32,
        /// A description of the problem.
        reason: &'static str,
    },
    /// A node contains non-finite or negative box dimensions, or a box basis that isn’t a
    /// rotation.
    #[error("the box of node {0} is invalid.")]
    InvalidBox(u32),
}

impl ObbTree {
    /// Converts this tree to its flat persisted form.
    pub fn to_records(&self) -> ObbTreeRecords {
        ObbTreeRecords {
            nodes: self.nodes().iter().map(ObbNodeRecord::from).collect(),
            face_pool: self.face_pool().to_vec(),
            face_ids: self.face_ids().to_vec(),
        }
    }

    /// Converts this tree to its flat persisted form, consuming it.
    pub fn into_records(self) -> ObbTreeRecords {
        let (nodes, face_pool, face_ids) = self.store.into_parts();
        ObbTreeRecords {
            nodes: nodes.iter().map(ObbNodeRecord::from).collect(),
            face_pool,
            face_ids,
        }
    }

    /// Rebuilds a tree from its persisted form.
    ///
    /// `num_vertices` is the number of vertices of the mesh the tree was built for. The records
    /// are fully validated: the tree topology, the face pool, and every box (finite values,
    /// non-negative half-extents, orthonormal right-handed basis). A tree returned by this
    /// function can be safely used for queries.
    pub fn from_records(
        records: ObbTreeRecords,
        num_vertices: u32,
    ) -> Result<Self, ObbTreeRecordsError> {
        let ObbTreeRecords {
            nodes,
            face_pool,
            face_ids,
        } = records;

        let num_faces = face_ids.len();
        if num_faces == 0 {
            return Err(ObbTreeRecordsError::Empty);
        }

        check_len("face pool entries", num_faces, 3 * num_faces, face_pool.len())?;
        check_len("nodes", num_faces, 2 * num_faces - 1, nodes.len())?;

        if let Some(vertex) = face_pool.iter().find(|vid| **vid >= num_vertices) {
            return Err(ObbTreeRecordsError::VertexIndexOutOfBounds {
                vertex: *vertex,
                num_vertices,
            });
        }

        let mut seen = vec![false; num_faces];
        for fid in &face_ids {
            match seen.get_mut(*fid as usize) {
                Some(s) if !*s => *s = true,
                _ => return Err(ObbTreeRecordsError::InvalidFaceId(*fid)),
            }
        }

        let nodes: Vec<ObbNode> = nodes.iter().map(ObbNode::from).collect();
        for (i, node) in nodes.iter().enumerate() {
            let obb = &node.obb;
            let finite = obb.orientation.iter().all(|e| e.is_finite())
                && obb.center.iter().all(|e| e.is_finite())
                && obb.half_extents.iter().all(|e| e.is_finite() && *e >= 0.0);
            if !finite || !is_rotation_basis(&obb.orientation) {
                return Err(ObbTreeRecordsError::InvalidBox(i as u32));
            }
        }

        let tree = Self {
            store: ObbNodeStore::from_parts(nodes, face_pool, face_ids),
            num_vertices,
        };
        tree.check_topology()?;
        Ok(tree)
    }
}

fn check_len(
    what: &'static str,
    num_faces: usize,
    expected: usize,
    found: usize,
) -> Result<(), ObbTreeRecordsError> {
    if expected == found {
        Ok(())
    } else {
        Err(ObbTreeRecordsError::LengthMismatch {
            what,
            num_faces,
            expected,
            found,
        })
    }
}
