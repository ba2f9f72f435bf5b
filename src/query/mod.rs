//! Non-persistent geometric queries.
//!
//! The main entry point of this module is [`query::test_tree_pair()`](test_tree_pair), which
//! finds all the intersecting triangle pairs between two posed instances of
//! [`ObbTree`](crate::partitioning::ObbTree)s. The same traversal can be run step by step with
//! an [`ObbTreePairTraversal`], e.g., to visualize it through a [`TraversalDebugSink`].
//!
//! The primitive tests it relies on are exposed too:
//!
//! * [`sat`] for the box-box separating axis tests.
//! * [`intersection_test_triangle_triangle()`] for the leaf triangle tests.

pub use self::error::QueryError;
pub use self::intersection_test::intersection_test_triangle_triangle;
pub use self::tree_pair::{
    test_tree_pair, LeafPairCollision, ObbTreePairTraversal, Side, TraversalDebugSink,
    TraversalOptions, TraversalStep, WorkItem,
};

mod error;
mod intersection_test;
pub mod sat;
mod tree_pair;
