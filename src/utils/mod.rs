//! Various unsorted geometrical and logical operators.

pub use self::center::center;
pub use self::cov::{center_cov, cov};
pub use self::eigen::{symmetric_eigen3, SymmetricEigen3};
pub use self::median::median;
pub use self::unique_indices::{
    HashSetIndexExtractor, MarkingIndexExtractor, UniqueIndexExtractor, UniqueIndexStrategy,
};

mod center;
mod cov;
mod eigen;
mod median;
mod unique_indices;
