//! Shapes involved in mesh/mesh collision detection.

pub use self::mesh_instance::MeshInstance;
pub use self::triangle::Triangle;

mod mesh_instance;
mod triangle;
