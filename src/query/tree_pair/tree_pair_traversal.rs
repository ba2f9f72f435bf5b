use super::TraversalDebugSink;
use crate::math::Real;
use crate::partitioning::{ObbNode, ObbTree};
use crate::query::intersection_test_triangle_triangle;
use crate::query::sat::{BoxOverlapTest, SatImplementation};
use crate::query::QueryError;
use crate::shape::{MeshInstance, Triangle};
use smallvec::SmallVec;

/// A pending pair of nodes, one from each tree, that still needs to be tested.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct WorkItem {
    /// The node index in the first tree.
    pub node1: u32,
    /// The node index in the second tree.
    pub node2: u32,
}

impl WorkItem {
    /// The pair formed by the roots of both trees.
    pub const ROOTS: Self = Self::new(ObbTree::ROOT, ObbTree::ROOT);

    /// Creates a new work item.
    #[inline]
    pub const fn new(node1: u32, node2: u32) -> Self {
        Self { node1, node2 }
    }
}

/// A pair of intersecting triangles found by a tree-pair traversal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct LeafPairCollision {
    /// The index of the leaf of the first tree.
    pub leaf1: u32,
    /// The index of the leaf of the second tree.
    pub leaf2: u32,
    /// The original index of the triangle of the first mesh.
    pub face1: u32,
    /// The original index of the triangle of the second mesh.
    pub face2: u32,
    /// The identifier of the first mesh instance.
    pub mesh1: u32,
    /// The identifier of the second mesh instance.
    pub mesh2: u32,
}

/// Identifies one of the two trees involved in a traversal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// The first tree.
    A,
    /// The second tree.
    B,
}

/// The outcome of a single traversal step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TraversalStep {
    /// Both nodes were leaves and their triangles were tested against each other.
    LeafPair {
        /// The number of intersecting triangle pairs found.
        collisions: usize,
    },
    /// The boxes of both nodes don’t overlap.
    Pruned,
    /// The boxes overlap and the node of the given side was replaced by its two children.
    Subdivided(Side),
}

/// Options of a tree-pair traversal.
#[derive(Default, Clone, Debug, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct TraversalOptions {
    /// The box-box overlap test implementation.
    pub sat: SatImplementation,
}

/// Simultaneous depth-first descent of the OBB trees of two mesh instances.
///
/// The traversal state is a caller-owned LIFO work list of node pairs. It can either be run to
/// completion with [`Self::test_tree_pair`], or advanced one pair at a time with [`Self::step`].
pub struct ObbTreePairTraversal<'a> {
    tree1: &'a ObbTree,
    instance1: MeshInstance<'a>,
    tree2: &'a ObbTree,
    instance2: MeshInstance<'a>,
    options: TraversalOptions,
    volume_scale1: Real,
    volume_scale2: Real,
}

impl<'a> ObbTreePairTraversal<'a> {
    /// Prepares the traversal of two posed instances of OBB trees.
    ///
    /// Fails if an instance has an invalid scale factor, or a vertex buffer that doesn’t match
    /// its tree.
    pub fn new(
        tree1: &'a ObbTree,
        instance1: MeshInstance<'a>,
        tree2: &'a ObbTree,
        instance2: MeshInstance<'a>,
        options: TraversalOptions,
    ) -> Result<Self, QueryError> {
        check_instance(tree1, &instance1)?;
        check_instance(tree2, &instance2)?;

        let cube = |s: Real| s * s * s;
        Ok(Self {
            tree1,
            instance1,
            tree2,
            instance2,
            options,
            volume_scale1: cube(instance1.scale),
            volume_scale2: cube(instance2.scale),
        })
    }

    /// Pushes the pair of roots into `work_list`, to start a step-by-step traversal.
    pub fn seed(&self, work_list: &mut Vec<WorkItem>) {
        work_list.push(WorkItem::ROOTS);
    }

    /// Runs the traversal to completion, pushing all the intersecting triangle pairs into `out`.
    ///
    /// The work list must be empty initially, and is empty again when this returns. Its content is
    /// only relevant between two calls to [`Self::step`]: it is taken as an argument so its
    /// allocation can be reused.
    pub fn test_tree_pair(
        &self,
        work_list: &mut Vec<WorkItem>,
        out: &mut Vec<LeafPairCollision>,
    ) -> Result<(), QueryError> {
        if !work_list.is_empty() {
            return Err(QueryError::NonEmptyWorkList(work_list.len()));
        }

        self.seed(work_list);
        while self.step(work_list, out, &mut ()).is_some() {}

        Ok(())
    }

    /// Processes exactly one pair of nodes from the top of `work_list`.
    ///
    /// Returns `None` if the work list is empty, i.e., if the traversal is complete. The tests
    /// performed during this step are reported to `sink`.
    ///
    /// Panics if the work list contains node indices that are out of bounds for the trees.
    pub fn step(
        &self,
        work_list: &mut Vec<WorkItem>,
        out: &mut Vec<LeafPairCollision>,
        sink: &mut impl TraversalDebugSink,
    ) -> Option<TraversalStep> {
        let item = work_list.pop()?;
        let node1 = self.tree1.node(item.node1);
        let node2 = self.tree2.node(item.node2);

        let Some((side, [child1, child2])) = self.subdivision(node1, node2) else {
            let collisions = self.test_leaf_pair(item, node1, node2, out, sink);
            log::trace!("Leaf pair {:?}: {} collisions.", item, collisions);
            return Some(TraversalStep::LeafPair { collisions });
        };

        let obb1 = node1
            .obb
            .scaled_transformed(&self.instance1.pos, self.instance1.scale);
        let obb2 = node2
            .obb
            .scaled_transformed(&self.instance2.pos, self.instance2.scale);
        let overlap = self.options.sat.intersects(&obb1, &obb2);
        sink.visit_boxes(item, &obb1, &obb2, overlap);

        if !overlap {
            log::trace!("Node pair {:?}: pruned.", item);
            return Some(TraversalStep::Pruned);
        }

        match side {
            Side::A => {
                work_list.push(WorkItem::new(child1, item.node2));
                work_list.push(WorkItem::new(child2, item.node2));
            }
            Side::B => {
                work_list.push(WorkItem::new(item.node1, child1));
                work_list.push(WorkItem::new(item.node1, child2));
            }
        }

        log::trace!("Node pair {:?}: subdividing side {:?}.", item, side);
        Some(TraversalStep::Subdivided(side))
    }

    /// Selects the node to subdivide if the boxes of `node1` and `node2` overlap.
    ///
    /// If only one node is internal, it is selected. If both are, the one with the strictly
    /// larger world-space volume is selected, ties selecting the second one. Returns `None` if
    /// both nodes are leaves.
    fn subdivision(&self, node1: &ObbNode, node2: &ObbNode) -> Option<(Side, [u32; 2])> {
        match (node1.children(), node2.children()) {
            (Some(children1), Some(children2)) => {
                let volume1 = node1.volume() * self.volume_scale1;
                let volume2 = node2.volume() * self.volume_scale2;

                if volume1 > volume2 {
                    Some((Side::A, children1))
                } else {
                    Some((Side::B, children2))
                }
            }
            (Some(children1), None) => Some((Side::A, children1)),
            (None, Some(children2)) => Some((Side::B, children2)),
            (None, None) => None,
        }
    }

    fn test_leaf_pair(
        &self,
        item: WorkItem,
        leaf1: &ObbNode,
        leaf2: &ObbNode,
        out: &mut Vec<LeafPairCollision>,
        sink: &mut impl TraversalDebugSink,
    ) -> usize {
        let triangles2: SmallVec<[(u32, Triangle); 4]> = self
            .tree2
            .leaf_faces(leaf2)
            .map(|(fid, idx)| (fid, self.instance2.world_triangle(idx)))
            .collect();
        let mut num_collisions = 0;

        for (face1, idx1) in self.tree1.leaf_faces(leaf1) {
            let tri1 = self.instance1.world_triangle(idx1);

            for (face2, tri2) in &triangles2 {
                let intersect = intersection_test_triangle_triangle(&tri1, tri2);
                sink.visit_triangles(item, &tri1, tri2, intersect);

                if intersect {
                    out.push(LeafPairCollision {
                        leaf1: item.node1,
                        leaf2: item.node2,
                        face1,
                        face2: *face2,
                        mesh1: self.instance1.mesh_id,
                        mesh2: self.instance2.mesh_id,
                    });
                    num_collisions += 1;
                }
            }
        }

        num_collisions
    }
}

fn check_instance(tree: &ObbTree, instance: &MeshInstance) -> Result<(), QueryError> {
    if !instance.has_valid_scale() {
        return Err(QueryError::InvalidScale {
            mesh_id: instance.mesh_id,
        });
    }

    if instance.vertices.len() != tree.num_vertices() as usize {
        return Err(QueryError::VertexCountMismatch {
            mesh_id: instance.mesh_id,
            expected: tree.num_vertices(),
            found: instance.vertices.len(),
        });
    }

    Ok(())
}

/// Finds all the intersecting triangle pairs between two posed instances of OBB trees.
///
/// This is a shortcut for [`ObbTreePairTraversal::new`] followed by
/// [`ObbTreePairTraversal::test_tree_pair`]. The intersecting pairs are appended to `out`.
///
/// ```
/// # #[cfg(feature = "f32")] {
/// use obbtree3d::math::{Isometry, Point};
/// use obbtree3d::partitioning::ObbTree;
/// use obbtree3d::query::{self, TraversalOptions};
/// use obbtree3d::shape::MeshInstance;
///
/// let vertices = [
///     Point::new(0.0, 0.0, 0.0),
///     Point::new(1.0, 0.0, 0.0),
///     Point::new(0.0, 1.0, 0.0),
///     Point::new(0.0, 0.0, 1.0),
/// ];
/// let indices = [[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]];
/// let tree = ObbTree::new(&vertices, &indices).unwrap();
///
/// let instance1 = MeshInstance::new(0, Isometry::identity(), &vertices);
/// let instance2 = MeshInstance::new(1, Isometry::translation(0.2, 0.2, 0.2), &vertices);
/// let mut work_list = vec![];
/// let mut collisions = vec![];
///
/// query::test_tree_pair(
///     &tree,
///     instance1,
///     &tree,
///     instance2,
///     TraversalOptions::default(),
///     &mut work_list,
///     &mut collisions,
/// )
/// .unwrap();
///
/// assert!(!collisions.is_empty());
/// assert!(work_list.is_empty());
/// # }
/// ```
pub fn test_tree_pair<'a>(
    tree1: &'a ObbTree,
    instance1: MeshInstance<'a>,
    tree2: &'a ObbTree,
    instance2: MeshInstance<'a>,
    options: TraversalOptions,
    work_list: &mut Vec<WorkItem>,
    out: &mut Vec<LeafPairCollision>,
) -> Result<(), QueryError> {
    ObbTreePairTraversal::new(tree1, instance1, tree2, instance2, options)?
        .test_tree_pair(work_list, out)
}
