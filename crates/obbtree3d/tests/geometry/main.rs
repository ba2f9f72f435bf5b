#[macro_use]
extern crate approx;

mod obb_tree_build;
mod sat_equivalence;
mod tree_pair_traversal;
