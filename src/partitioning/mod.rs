//! Spatial partitioning tools.

pub use self::obb_tree::{
    ObbNode, ObbNodeFlags, ObbNodeRecord, ObbNodeStore, ObbTree, ObbTreeBuildError,
    ObbTreeBuildParams, ObbTreeRecords, ObbTreeRecordsError, ObbTreeWorkspace, SplitHeuristic,
    LEAF_FACE_THRESHOLD, MAX_NUM_FACES,
};

mod obb_tree;
