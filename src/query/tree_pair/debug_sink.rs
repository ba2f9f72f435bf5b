use super::WorkItem;
use crate::bounding_volume::Obb;
use crate::shape::Triangle;

/// Receives the intermediate results of a tree-pair traversal, one test at a time.
///
/// This is meant for visualizing or instrumenting the traversal, e.g., to draw the boxes being
/// tested by [`ObbTreePairTraversal::step`](super::ObbTreePairTraversal::step). All the
/// geometry is given in world-space. The methods do nothing by default, and `()` can be used as
/// a sink that ignores everything.
pub trait TraversalDebugSink {
    /// Called after the world-space boxes of the nodes of `item` have been tested.
    fn visit_boxes(&mut self, item: WorkItem, obb1: &Obb, obb2: &Obb, overlap: bool) {
        let _ = (item, obb1, obb2, overlap);
    }

    /// Called after a pair of world-space leaf triangles of `item` has been tested.
    fn visit_triangles(&mut self, item: WorkItem, tri1: &Triangle, tri2: &Triangle, intersect: bool) {
        let _ = (item, tri1, tri2, intersect);
    }
}

impl TraversalDebugSink for () {}
