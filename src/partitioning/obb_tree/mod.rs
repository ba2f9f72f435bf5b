pub use self::build::{
    ObbTreeBuildError, ObbTreeBuildParams, ObbTreeWorkspace, LEAF_FACE_THRESHOLD, MAX_NUM_FACES,
};
pub use self::obb_tree::{ObbNode, ObbNodeFlags, ObbTree};
pub use self::records::{ObbNodeRecord, ObbTreeRecords, ObbTreeRecordsError};
pub use self::split::SplitHeuristic;
pub use self::storage::ObbNodeStore;

mod build;
mod obb_tree;
mod records;
mod split;
mod storage;
mod validation;
