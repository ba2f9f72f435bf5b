//! Narrow-phase traversal of a pair of OBB trees.

pub use self::debug_sink::TraversalDebugSink;
pub use self::tree_pair_traversal::{
    test_tree_pair, LeafPairCollision, ObbTreePairTraversal, Side, TraversalOptions,
    TraversalStep, WorkItem,
};

mod debug_sink;
mod tree_pair_traversal;
