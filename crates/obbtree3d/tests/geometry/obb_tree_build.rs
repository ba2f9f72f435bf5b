use crate::common::{cuboid_mesh, flat_grid, triangle_soup};
use obbtree3d::math::{Point, Real, Vector};
use obbtree3d::partitioning::{
    ObbTree, ObbTreeBuildParams, ObbTreeWorkspace, SplitHeuristic, LEAF_FACE_THRESHOLD,
};
use obbtree3d::utils::UniqueIndexStrategy;
use rand::SeedableRng;
use rand_isaac::IsaacRng;

const HEURISTICS: [SplitHeuristic; 3] = [
    SplitHeuristic::Median,
    SplitHeuristic::Mean,
    SplitHeuristic::Balanced,
];

fn build(
    vertices: &[Point<Real>],
    indices: &[[u32; 3]],
    split_heuristic: SplitHeuristic,
    unique_index_strategy: UniqueIndexStrategy,
) -> ObbTree {
    let params = ObbTreeBuildParams {
        split_heuristic,
        unique_index_strategy,
    };
    ObbTree::with_params(vertices, indices, &params, &mut ObbTreeWorkspace::default()).unwrap()
}

fn assert_leaf_ranges_partition_pool(tree: &ObbTree) {
    let mut covered = vec![false; tree.num_faces()];

    for leaf in tree.leaves() {
        let node = tree.node(leaf);
        assert!(node.face_count() as usize <= LEAF_FACE_THRESHOLD);
        assert_eq!(node.face_range_start() % 3, 0);

        let first = node.face_range_start() as usize / 3;
        for face in first..first + node.face_count() as usize {
            assert!(!covered[face], "Face {} is referenced twice.", face);
            covered[face] = true;
        }
    }

    assert!(covered.iter().all(|c| *c));
}

#[test]
fn node_count_invariant_on_random_meshes() {
    let mut rng = IsaacRng::seed_from_u64(0);
    let mut workspace = ObbTreeWorkspace::default();

    for count in [1, 2, 3, 4, 5, 7, 16, 31, 100, 257] {
        let (vertices, indices) = triangle_soup(&mut rng, count, 5.0);

        for split_heuristic in HEURISTICS {
            let params = ObbTreeBuildParams {
                split_heuristic,
                ..Default::default()
            };
            // The same workspace is reused for every build.
            let tree =
                ObbTree::with_params(&vertices, &indices, &params, &mut workspace).unwrap();

            assert_eq!(tree.num_nodes(), 2 * count as usize - 1);
            assert_eq!(tree.face_pool().len(), 3 * count as usize);
            assert_eq!(tree.leaves().count(), count as usize);
            assert_eq!(tree.root().parent(), None);
            assert_leaf_ranges_partition_pool(&tree);
            tree.assert_well_formed(&vertices);
        }
    }
}

#[test]
fn face_pool_is_a_permutation_of_the_input() {
    let mut rng = IsaacRng::seed_from_u64(1);
    let (vertices, indices) = triangle_soup(&mut rng, 64, 3.0);
    let tree = ObbTree::new(&vertices, &indices).unwrap();

    let mut face_ids = tree.face_ids().to_vec();
    face_ids.sort_unstable();
    assert_eq!(face_ids, (0..64).collect::<Vec<u32>>());

    for leaf in tree.leaves() {
        for (fid, idx) in tree.leaf_faces(tree.node(leaf)) {
            assert_eq!(indices[fid as usize], idx);
        }
    }
}

#[test]
fn node_bases_are_orthonormal() {
    let mut rng = IsaacRng::seed_from_u64(2);
    let (vertices, indices) = triangle_soup(&mut rng, 200, 10.0);
    let tree = ObbTree::new(&vertices, &indices).unwrap();

    for node in tree.nodes() {
        let basis = node.obb.orientation;

        for i in 0..3 {
            assert_relative_eq!(basis.column(i).norm(), 1.0, epsilon = 1.0e-4);
            for j in i + 1..3 {
                assert_relative_eq!(basis.column(i).dot(&basis.column(j)), 0.0, epsilon = 1.0e-4);
            }
        }

        assert_relative_eq!(basis.determinant(), 1.0, epsilon = 1.0e-4);
    }
}

#[test]
fn construction_is_deterministic() {
    let mut rng = IsaacRng::seed_from_u64(3);
    let (vertices, indices) = triangle_soup(&mut rng, 150, 4.0);

    for split_heuristic in HEURISTICS {
        let reference = build(&vertices, &indices, split_heuristic, UniqueIndexStrategy::Marking);

        for strategy in [UniqueIndexStrategy::Marking, UniqueIndexStrategy::HashSet] {
            let tree = build(&vertices, &indices, split_heuristic, strategy);
            assert_eq!(tree, reference);
            assert_eq!(tree.to_records(), reference.to_records());
        }
    }
}

#[test]
fn coplanar_and_duplicate_geometry() {
    let (grid_vertices, grid_indices) = flat_grid(9);

    // The same triangle repeated many times.
    let dup_vertices = vec![
        Point::new(0.0, 0.0, 0.0),
        Point::new(1.0, 0.0, 0.0),
        Point::new(0.0, 1.0, 0.0),
    ];
    let dup_indices = vec![[0, 1, 2]; 33];

    // Zero-area triangles along a line.
    let line_vertices: Vec<_> = (0..30).map(|i| Point::new(i as Real, 0.0, 0.0)).collect();
    let line_indices: Vec<_> = (0..28).map(|i| [i, i + 1, i + 2]).collect();

    // Everything on a single point.
    let point_vertices = vec![Point::new(1.0, 2.0, 3.0); 3];
    let point_indices = vec![[0, 1, 2], [2, 1, 0], [1, 1, 1]];

    for (vertices, indices) in [
        (&grid_vertices, &grid_indices),
        (&dup_vertices, &dup_indices),
        (&line_vertices, &line_indices),
        (&point_vertices, &point_indices),
    ] {
        for split_heuristic in HEURISTICS {
            for strategy in [UniqueIndexStrategy::Marking, UniqueIndexStrategy::HashSet] {
                let tree = build(vertices, indices, split_heuristic, strategy);
                assert_eq!(tree.num_nodes(), 2 * indices.len() - 1);
                assert_leaf_ranges_partition_pool(&tree);
                tree.assert_well_formed(vertices);
            }
        }
    }
}

#[test]
fn boxes_fit_the_enclosed_geometry() {
    let (vertices, indices) = cuboid_mesh(Vector::new(3.0, 1.0, 0.5));
    let tree = ObbTree::new(&vertices, &indices).unwrap();
    let root = tree.root();

    // The root box of a box mesh is the box itself.
    assert_relative_eq!(root.volume(), 6.0 * 2.0 * 1.0, epsilon = 1.0e-3);
    assert_relative_eq!(root.obb.center, Point::origin(), epsilon = 1.0e-5);
    assert_relative_eq!(root.obb.orientation.column(0).x.abs(), 1.0, epsilon = 1.0e-5);

    for (i, node) in tree.nodes().iter().enumerate() {
        if let Some([c1, c2]) = node.children() {
            assert_eq!(tree.node(c1).parent(), Some(i as u32));
            assert_eq!(tree.node(c2).parent(), Some(i as u32));
            assert!(tree.node(c1).depth() == node.depth() + 1);
        }
    }

    assert!(tree.max_depth() >= 3);
}

#[test]
fn flat_leaves_are_enclosed_by_their_boxes() {
    let (mut vertices, indices) = flat_grid(6);
    // Lift the grid away from the origin so the fitted centers aren't exactly representable.
    for pt in &mut vertices {
        *pt += Vector::new(10.3, -7.1, 1.0);
    }
    let tree = ObbTree::new(&vertices, &indices).unwrap();

    for leaf in tree.leaves() {
        let leaf = tree.node(leaf);

        for (_, idx) in tree.leaf_faces(leaf) {
            // The leaf and all its ancestors.
            let mut node = Some(leaf);
            while let Some(curr) = node {
                for vid in idx {
                    assert!(curr.obb.contains_point_with_margin(&vertices[vid as usize], 0.0));
                }
                node = curr.parent().map(|i| tree.node(i));
            }
        }
    }
}
