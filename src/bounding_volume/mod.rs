//! Bounding volumes.

#[doc(inline)]
pub use crate::bounding_volume::obb::{Obb, OBB_FIT_TOLERANCE};

#[doc(hidden)]
pub mod obb;
