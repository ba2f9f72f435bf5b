use super::ObbNodeStore;
use crate::bounding_volume::Obb;
use bitflags::bitflags;
use core::ops::Range;

bitflags! {
    #[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    /// The status of an OBB tree node.
    pub struct ObbNodeFlags: u32 {
        /// If this bit is set, the node is a leaf.
        const LEAF = 0b0001;
    }
}

/// A node (internal or leaf) of an [`ObbTree`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ObbNode {
    /// The bounding box of all the triangles below this node, in the mesh object-space.
    pub obb: Obb,
    pub(super) parent: u32,
    pub(super) children: [u32; 2],
    pub(super) flags: ObbNodeFlags,
    pub(super) face_range_start: u32,
    pub(super) face_count: u32,
    pub(super) depth: u32,
}

impl ObbNode {
    /// The index used to mark a missing parent or child.
    pub const INVALID: u32 = u32::MAX;

    #[inline]
    pub(super) fn internal(obb: Obb, parent: u32, children: [u32; 2], depth: u32) -> Self {
        Self {
            obb,
            parent,
            children,
            flags: ObbNodeFlags::empty(),
            face_range_start: 0,
            face_count: 0,
            depth,
        }
    }

    #[inline]
    pub(super) fn leaf(obb: Obb, parent: u32, face_range_start: u32, face_count: u32, depth: u32) -> Self {
        Self {
            obb,
            parent,
            children: [Self::INVALID; 2],
            flags: ObbNodeFlags::LEAF,
            face_range_start,
            face_count,
            depth,
        }
    }

    /// Is this node a leaf?
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.flags.contains(ObbNodeFlags::LEAF)
    }

    /// The status flags of this node.
    #[inline]
    pub fn flags(&self) -> ObbNodeFlags {
        self.flags
    }

    /// The index of the parent of this node, or `None` for the root.
    #[inline]
    pub fn parent(&self) -> Option<u32> {
        (self.parent != Self::INVALID).then_some(self.parent)
    }

    /// The indices of the two children of this node, or `None` for a leaf.
    #[inline]
    pub fn children(&self) -> Option<[u32; 2]> {
        (!self.is_leaf()).then_some(self.children)
    }

    /// The distance between this node and the root (the root has a depth of 0).
    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// The number of triangles referenced by this leaf (0 for internal nodes).
    #[inline]
    pub fn face_count(&self) -> u32 {
        self.face_count
    }

    /// The offset of the first vertex index of this leaf in the shared face pool.
    ///
    /// This is meaningless for internal nodes.
    #[inline]
    pub fn face_range_start(&self) -> u32 {
        self.face_range_start
    }

    /// The range of the shared face pool containing the vertex indices of this leaf’s
    /// triangles (three indices per triangle).
    #[inline]
    pub fn face_pool_range(&self) -> Range<usize> {
        let start = self.face_range_start as usize;
        start..start + self.face_count as usize * 3
    }

    /// The volume of this node’s box, in the mesh object-space.
    #[inline]
    pub fn volume(&self) -> crate::math::Real {
        self.obb.volume()
    }
}

/// A binary tree of oriented bounding boxes enclosing the triangles of a mesh.
///
/// The tree is built once per mesh shape with [`ObbTree::new`] or [`ObbTree::with_params`] and
/// is immutable afterwards. It only stores vertex indices: the vertex buffer itself is provided
/// at query-time by a [`MeshInstance`](crate::shape::MeshInstance).
///
/// For `n` input triangles, the tree always has exactly `2n - 1` nodes, the root being at
/// index 0 and every leaf containing exactly one triangle.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ObbTree {
    pub(super) store: ObbNodeStore,
    pub(super) num_vertices: u32,
}

// Trees are shared read-only between concurrent queries.
static_assertions::assert_impl_all!(ObbTree: Send, Sync);

impl ObbTree {
    /// Index of the root node.
    pub const ROOT: u32 = 0;

    /// The node and face storage of this tree.
    #[inline]
    pub fn store(&self) -> &ObbNodeStore {
        &self.store
    }

    /// All the nodes of this tree, the root first.
    #[inline]
    pub fn nodes(&self) -> &[ObbNode] {
        self.store.nodes()
    }

    /// The node at index `i`.
    ///
    /// Panics if `i` is out of bounds.
    #[inline]
    pub fn node(&self, i: u32) -> &ObbNode {
        self.store.node(i)
    }

    /// The root node of this tree.
    #[inline]
    pub fn root(&self) -> &ObbNode {
        self.store.node(Self::ROOT)
    }

    /// The number of nodes of this tree.
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.store.len()
    }

    /// The number of triangles enclosed by this tree.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.store.face_ids().len()
    }

    /// The number of vertices of the mesh this tree was built for.
    #[inline]
    pub fn num_vertices(&self) -> u32 {
        self.num_vertices
    }

    /// The shared pool of vertex indices, three per triangle, grouped by leaf.
    #[inline]
    pub fn face_pool(&self) -> &[u32] {
        self.store.face_pool()
    }

    /// The index, in the original index buffer, of each triangle of the face pool.
    #[inline]
    pub fn face_ids(&self) -> &[u32] {
        self.store.face_ids()
    }

    /// Iterates through the triangles of the leaf `node`.
    ///
    /// Each item is the original face index together with its three vertex indices. Yields
    /// nothing for internal nodes.
    pub fn leaf_faces(&self, node: &ObbNode) -> impl ExactSizeIterator<Item = (u32, [u32; 3])> + '_ {
        let first_face = node.face_range_start as usize / 3;
        let range = node.face_pool_range();
        self.store.face_pool()[range]
            .chunks_exact(3)
            .zip(&self.store.face_ids()[first_face..])
            .map(|(idx, fid)| (*fid, [idx[0], idx[1], idx[2]]))
    }

    /// Iterates through the indices of all the leaves of this tree.
    pub fn leaves(&self) -> impl Iterator<Item = u32> + '_ {
        self.nodes()
            .iter()
            .enumerate()
            .filter(|(_, node)| node.is_leaf())
            .map(|(i, _)| i as u32)
    }

    /// The maximum depth of this tree.
    pub fn max_depth(&self) -> u32 {
        self.nodes().iter().map(|n| n.depth).max().unwrap_or(0)
    }
}
