use super::{ObbNode, ObbNodeFlags, ObbTree, ObbTreeRecordsError};
use crate::math::{Matrix, Point, Real};

fn topology_error(node: usize, reason: &'static str) -> ObbTreeRecordsError {
    ObbTreeRecordsError::InvalidTopology {
        node: node as u32,
        reason,
    }
}

impl ObbTree {
    /// Checks that the nodes form a full binary tree rooted at index 0, with consistent parent
    /// links and depths, and with leaves partitioning the face pool.
    pub(super) fn check_topology(&self) -> Result<(), ObbTreeRecordsError> {
        let nodes = self.nodes();
        let num_faces = self.num_faces();
        let mut has_parent = vec![false; nodes.len()];
        let mut face_covered = vec![false; num_faces];

        if nodes.first().map(|root| root.parent) != Some(ObbNode::INVALID) {
            return Err(topology_error(0, "the root must not have a parent"));
        }

        for (i, node) in nodes.iter().enumerate() {
            if ObbNodeFlags::from_bits(node.flags.bits()).is_none() {
                return Err(topology_error(i, "unknown flags"));
            }

            if node.is_leaf() {
                if node.children != [ObbNode::INVALID; 2] {
                    return Err(topology_error(i, "a leaf must not have children"));
                }
                if node.face_count == 0 || node.face_range_start % 3 != 0 {
                    return Err(topology_error(i, "invalid leaf face range"));
                }

                let first_face = node.face_range_start as usize / 3;
                let covered = face_covered
                    .get_mut(first_face..first_face + node.face_count as usize)
                    .ok_or_else(|| topology_error(i, "leaf face range out of bounds"))?;

                for face in covered {
                    if *face {
                        return Err(topology_error(i, "overlapping leaf face ranges"));
                    }
                    *face = true;
                }
            } else {
                if node.face_count != 0 {
                    return Err(topology_error(i, "an internal node must not have faces"));
                }
                if node.children[0] == node.children[1] {
                    return Err(topology_error(i, "duplicate children"));
                }

                for child in node.children {
                    let c = child as usize;
                    let Some(child_node) = nodes.get(c) else {
                        return Err(topology_error(i, "child index out of bounds"));
                    };
                    if child_node.parent as usize != i {
                        return Err(topology_error(c, "inconsistent parent link"));
                    }
                    if Some(child_node.depth) != node.depth.checked_add(1) {
                        return Err(topology_error(c, "inconsistent depth"));
                    }
                    if core::mem::replace(&mut has_parent[c], true) {
                        return Err(topology_error(c, "node referenced twice"));
                    }
                }
            }
        }

        if let Some(i) = has_parent.iter().skip(1).position(|p| !*p) {
            return Err(topology_error(i + 1, "unreachable node"));
        }

        if nodes[0].depth != 0 || has_parent[0] {
            return Err(topology_error(0, "invalid root"));
        }

        if face_covered.iter().any(|f| !*f) {
            return Err(topology_error(0, "a triangle isn’t referenced by any leaf"));
        }

        Ok(())
    }

    /// Panics if this tree isn’t well-formed for the given vertex buffer.
    ///
    /// On top of the topology checks performed by [`ObbTree::from_records`], this checks that
    /// every node has an orthonormal right-handed basis and that its box encloses all the
    /// triangles below it. This is mostly useful for testing.
    pub fn assert_well_formed(&self, vertices: &[Point<Real>]) {
        if let Err(err) = self.check_topology() {
            panic!("Malformed OBB tree: {}", err);
        }

        assert_eq!(self.num_nodes(), 2 * self.num_faces() - 1);
        assert_eq!(self.num_vertices() as usize, vertices.len());

        for (i, node) in self.nodes().iter().enumerate() {
            assert!(
                is_rotation_basis(&node.obb.orientation),
                "Node {} doesn’t have an orthonormal right-handed basis: {:?}",
                i,
                node.obb.orientation
            );
        }

        for leaf_id in self.leaves() {
            let leaf = self.node(leaf_id);

            for (_, idx) in self.leaf_faces(leaf) {
                let mut curr = Some(leaf_id);

                while let Some(node_id) = curr {
                    let node = self.node(node_id);
                    let obb = &node.obb;
                    let margin = 1.0e-4 * (1.0 + obb.half_extents.max() + obb.center.coords.norm());

                    for vid in idx {
                        assert!(
                            obb.contains_point_with_margin(&vertices[vid as usize], margin),
                            "The box of node {} doesn’t contain the vertex {}.",
                            node_id,
                            vid
                        );
                    }

                    curr = node.parent();
                }
            }
        }
    }
}

/// Tests if the columns of `basis` are orthonormal and right-handed, up to rounding errors.
pub(super) fn is_rotation_basis(basis: &Matrix<Real>) -> bool {
    relative_eq!(basis.tr_mul(basis), Matrix::identity(), epsilon = 1.0e-4)
        && basis.determinant() > 0.0
}
