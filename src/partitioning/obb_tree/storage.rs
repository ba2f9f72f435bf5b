use super::ObbNode;
use crate::bounding_volume::Obb;
use crate::math::{Point, Vector};
use core::ops::Range;

/// The persistent storage of an [`ObbTree`](super::ObbTree).
///
/// This is an index-addressed array of nodes, together with the shared pool of triangle vertex
/// indices the leaves point into. Nodes reference each other by index only, so the storage can be
/// moved, cloned, or serialized without any fixup.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ObbNodeStore {
    nodes: Vec<ObbNode>,
    face_pool: Vec<u32>,
    face_ids: Vec<u32>,
}

impl ObbNodeStore {
    /// Initializes the storage for the given triangles, with an empty node array.
    ///
    /// The face pool is filled with the flattened triangle indices, in their original order.
    pub(super) fn with_faces(indices: &[[u32; 3]]) -> Self {
        let num_faces = indices.len();
        Self {
            nodes: Vec::with_capacity((2 * num_faces).saturating_sub(1)),
            face_pool: indices.iter().flatten().copied().collect(),
            face_ids: (0..num_faces as u32).collect(),
        }
    }

    pub(super) fn from_parts(nodes: Vec<ObbNode>, face_pool: Vec<u32>, face_ids: Vec<u32>) -> Self {
        Self {
            nodes,
            face_pool,
            face_ids,
        }
    }

    /// The number of nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Does this storage contain no node?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All the nodes, in index order.
    #[inline]
    pub fn nodes(&self) -> &[ObbNode] {
        &self.nodes
    }

    /// The node with index `i`.
    ///
    /// Panics if `i` is out of bounds.
    #[inline]
    pub fn node(&self, i: u32) -> &ObbNode {
        &self.nodes[i as usize]
    }

    /// The node with index `i`, if it exists.
    #[inline]
    pub fn get(&self, i: u32) -> Option<&ObbNode> {
        self.nodes.get(i as usize)
    }

    /// The shared pool of vertex indices (three per triangle).
    #[inline]
    pub fn face_pool(&self) -> &[u32] {
        &self.face_pool
    }

    /// The original index of each triangle of the face pool.
    #[inline]
    pub fn face_ids(&self) -> &[u32] {
        &self.face_ids
    }

    /// Appends a placeholder node and returns its index.
    pub(super) fn push_placeholder(&mut self) -> u32 {
        let id = self.nodes.len() as u32;
        self.nodes.push(ObbNode::leaf(
            Obb::from_half_extents(Point::origin(), Vector::zeros()),
            ObbNode::INVALID,
            0,
            0,
            0,
        ));
        id
    }

    /// Appends two consecutive placeholder nodes and returns their indices.
    pub(super) fn push_placeholder_pair(&mut self) -> [u32; 2] {
        [self.push_placeholder(), self.push_placeholder()]
    }

    /// Replaces the node at index `i`.
    pub(super) fn set(&mut self, i: u32, node: ObbNode) {
        self.nodes[i as usize] = node;
    }

    /// Mutable access to the triangles of the given face range, as slices of the face pool and of
    /// the original face indices.
    pub(super) fn faces_mut(&mut self, faces: Range<usize>) -> (&mut [u32], &mut [u32]) {
        (
            &mut self.face_pool[faces.start * 3..faces.end * 3],
            &mut self.face_ids[faces],
        )
    }

    pub(super) fn into_parts(self) -> (Vec<ObbNode>, Vec<u32>, Vec<u32>) {
        (self.nodes, self.face_pool, self.face_ids)
    }
}
