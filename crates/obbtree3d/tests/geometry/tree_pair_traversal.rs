use crate::common::{brute_force_collisions, cuboid_mesh, flat_grid, random_pose, triangle_soup};
use obbtree3d::math::{Isometry, Point, Real, Vector};
use obbtree3d::partitioning::ObbTree;
use obbtree3d::query::sat::SatImplementation;
use obbtree3d::query::{
    self, LeafPairCollision, ObbTreePairTraversal, Side, TraversalOptions, TraversalStep,
};
use obbtree3d::shape::MeshInstance;
use rand::{Rng, SeedableRng};
use rand_isaac::IsaacRng;

fn run(
    tree1: &ObbTree,
    instance1: MeshInstance,
    tree2: &ObbTree,
    instance2: MeshInstance,
    sat: SatImplementation,
) -> Vec<LeafPairCollision> {
    let mut work_list = vec![];
    let mut out = vec![];
    query::test_tree_pair(
        tree1,
        instance1,
        tree2,
        instance2,
        TraversalOptions { sat },
        &mut work_list,
        &mut out,
    )
    .unwrap();
    assert!(work_list.is_empty());
    out
}

fn face_pairs(collisions: &[LeafPairCollision]) -> Vec<(u32, u32)> {
    let mut pairs: Vec<_> = collisions.iter().map(|c| (c.face1, c.face2)).collect();
    pairs.sort_unstable();
    pairs
}

#[test]
fn overlapping_cuboids_collide() {
    let (vertices, indices) = cuboid_mesh(Vector::new(1.0, 1.0, 1.0));
    let tree = ObbTree::new(&vertices, &indices).unwrap();

    let instance1 = MeshInstance::new(0, Isometry::identity(), &vertices);
    let instance2 = MeshInstance::new(
        1,
        Isometry::new(Vector::new(1.5, 0.5, 0.25), Vector::new(0.1, 0.2, 0.3)),
        &vertices,
    );

    let expected = brute_force_collisions(&indices, &instance1, &indices, &instance2);
    assert!(!expected.is_empty());

    for sat in [SatImplementation::Scalar, SatImplementation::Simd] {
        let collisions = run(&tree, instance1, &tree, instance2, sat);
        assert_eq!(face_pairs(&collisions), expected);

        for c in &collisions {
            assert_eq!((c.mesh1, c.mesh2), (0, 1));
            assert!(tree.node(c.leaf1).is_leaf());
            assert!(tree.node(c.leaf2).is_leaf());
            assert!(tree
                .leaf_faces(tree.node(c.leaf1))
                .any(|(fid, _)| fid == c.face1));
            assert!(tree
                .leaf_faces(tree.node(c.leaf2))
                .any(|(fid, _)| fid == c.face2));
        }
    }
}

#[test]
fn flush_cuboids_collide() {
    let half_extents = Vector::new(1.0, 0.7, 0.3);
    let (vertices, indices) = cuboid_mesh(half_extents);
    let tree = ObbTree::new(&vertices, &indices).unwrap();

    let offsets = [
        Vector::new(2.0 * half_extents.x, 0.0, 0.0),
        Vector::new(2.0 * half_extents.x, 0.3, -0.1),
        Vector::new(0.5, 2.0 * half_extents.y, 0.0),
        Vector::new(0.2, 0.1, 2.0 * half_extents.z),
    ];

    for offset in offsets {
        let instance1 = MeshInstance::new(0, Isometry::identity(), &vertices);
        let instance2 = MeshInstance::new(1, Isometry::new(offset, Vector::zeros()), &vertices);

        let expected = brute_force_collisions(&indices, &instance1, &indices, &instance2);
        assert!(!expected.is_empty(), "No contact for the offset {:?}", offset);

        for sat in [SatImplementation::Scalar, SatImplementation::Simd] {
            let collisions = run(&tree, instance1, &tree, instance2, sat);
            assert_eq!(face_pairs(&collisions), expected, "Offset {:?}", offset);
        }
    }
}

#[test]
fn coplanar_layers_collide() {
    let (mut vertices, mut indices) = flat_grid(4);
    let num_vertices = vertices.len() as u32;

    // A second layer right above the first one.
    let upper: Vec<_> = vertices.iter().map(|pt| pt + Vector::z()).collect();
    let upper_indices: Vec<_> = indices
        .iter()
        .map(|idx| idx.map(|vid| vid + num_vertices))
        .collect();
    vertices.extend(upper);
    indices.extend(upper_indices);
    let tree = ObbTree::new(&vertices, &indices).unwrap();

    let poses = [
        Isometry::translation(0.3, 0.7, 0.0),
        Isometry::translation(0.1, 0.2, 1.0),
        Isometry::new(Vector::new(1.1, 0.9, 0.0), Vector::z() * 0.3),
    ];

    for pos in poses {
        let instance1 = MeshInstance::new(0, Isometry::identity(), &vertices);
        let instance2 = MeshInstance::new(1, pos, &vertices);

        let expected = brute_force_collisions(&indices, &instance1, &indices, &instance2);
        assert!(!expected.is_empty());

        for sat in [SatImplementation::Scalar, SatImplementation::Simd] {
            let collisions = run(&tree, instance1, &tree, instance2, sat);
            assert_eq!(face_pairs(&collisions), expected, "Pose {:?}", pos);
        }
    }
}

#[test]
fn nested_cuboids_dont_collide() {
    // A small box strictly inside of a large box: no triangles intersect.
    let (big_vertices, big_indices) = cuboid_mesh(Vector::repeat(2.0));
    let (small_vertices, small_indices) = cuboid_mesh(Vector::repeat(0.5));
    let big = ObbTree::new(&big_vertices, &big_indices).unwrap();
    let small = ObbTree::new(&small_vertices, &small_indices).unwrap();

    let instance1 = MeshInstance::new(0, Isometry::identity(), &big_vertices);
    let instance2 = MeshInstance::new(1, Isometry::rotation(Vector::y() * 0.5), &small_vertices);

    assert!(run(&big, instance1, &small, instance2, SatImplementation::Simd).is_empty());
}

#[test]
fn traversal_matches_brute_force() {
    let mut rng = IsaacRng::seed_from_u64(7);
    let mut num_collisions = 0;

    for _ in 0..25 {
        let (vertices1, indices1) = triangle_soup(&mut rng, 40, 3.0);
        let (vertices2, indices2) = triangle_soup(&mut rng, 40, 3.0);
        let tree1 = ObbTree::new(&vertices1, &indices1).unwrap();
        let tree2 = ObbTree::new(&vertices2, &indices2).unwrap();

        let instance1 = MeshInstance::new(10, random_pose(&mut rng, 2.0), &vertices1)
            .with_scale(rng.gen_range(0.5..2.0));
        let instance2 = MeshInstance::new(20, random_pose(&mut rng, 2.0), &vertices2)
            .with_scale(rng.gen_range(0.5..2.0));

        let expected = brute_force_collisions(&indices1, &instance1, &indices2, &instance2);
        let scalar = run(&tree1, instance1, &tree2, instance2, SatImplementation::Scalar);
        let simd = run(&tree1, instance1, &tree2, instance2, SatImplementation::Simd);

        // Same traversal order, so the same output sequence.
        assert_eq!(scalar, simd);
        assert_eq!(face_pairs(&simd), expected);
        num_collisions += expected.len();
    }

    assert!(num_collisions > 0);
}

#[test]
fn traversal_is_deterministic() {
    let mut rng = IsaacRng::seed_from_u64(8);
    let (vertices, indices) = triangle_soup(&mut rng, 100, 3.0);
    let tree = ObbTree::new(&vertices, &indices).unwrap();
    let rebuilt = ObbTree::new(&vertices, &indices).unwrap();

    let instance1 = MeshInstance::new(0, Isometry::identity(), &vertices);
    let pos2 = Isometry::new(Vector::new(0.1, 0.2, 0.05), Vector::new(0.05, 0.0, 0.1));
    let instance2 = MeshInstance::new(1, pos2, &vertices);

    let first = run(&tree, instance1, &tree, instance2, SatImplementation::Simd);
    let second = run(&rebuilt, instance1, &rebuilt, instance2, SatImplementation::Simd);
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn separated_instances_are_pruned_at_the_root() {
    let (vertices, indices) = cuboid_mesh(Vector::repeat(1.0));
    let tree = ObbTree::new(&vertices, &indices).unwrap();
    let instance1 = MeshInstance::new(0, Isometry::identity(), &vertices);
    let instance2 = MeshInstance::new(1, Isometry::translation(5.0, 0.0, 0.0), &vertices);
    let traversal =
        ObbTreePairTraversal::new(&tree, instance1, &tree, instance2, Default::default()).unwrap();

    let mut work_list = vec![];
    let mut out = vec![];
    traversal.seed(&mut work_list);

    assert_eq!(
        traversal.step(&mut work_list, &mut out, &mut ()),
        Some(TraversalStep::Pruned)
    );
    assert_eq!(traversal.step(&mut work_list, &mut out, &mut ()), None);
    assert!(out.is_empty());
}

/// A mesh made of two parallel triangles, with a tree of exactly three nodes.
fn two_triangles(size: Real) -> (Vec<Point<Real>>, ObbTree) {
    let vertices = vec![
        Point::new(0.0, 0.0, 0.0),
        Point::new(size, 0.0, 0.0),
        Point::new(0.0, size, 0.0),
        Point::new(0.0, 0.0, size),
        Point::new(size, 0.0, size),
        Point::new(0.0, size, size),
    ];
    let tree = ObbTree::new(&vertices, &[[0, 1, 2], [3, 4, 5]]).unwrap();
    assert_eq!(tree.num_nodes(), 3);
    (vertices, tree)
}

#[test]
fn subdivision_choice_accounts_for_instance_scale() {
    let (small_vertices, small) = two_triangles(1.0);
    let (large_vertices, large) = two_triangles(2.0);

    let first_step = |scale1: Real, scale2: Real| {
        let instance1 =
            MeshInstance::new(0, Isometry::identity(), &small_vertices).with_scale(scale1);
        let instance2 =
            MeshInstance::new(1, Isometry::identity(), &large_vertices).with_scale(scale2);
        let traversal =
            ObbTreePairTraversal::new(&small, instance1, &large, instance2, Default::default())
                .unwrap();
        let mut work_list = vec![];
        traversal.seed(&mut work_list);
        let step = traversal.step(&mut work_list, &mut vec![], &mut ());
        (step, work_list)
    };

    // Unscaled, the second mesh is 8 times larger.
    let (step, work_list) = first_step(1.0, 1.0);
    assert_eq!(step, Some(TraversalStep::Subdivided(Side::B)));
    let [c1, c2] = large.root().children().unwrap();
    assert_eq!(work_list.len(), 2);
    assert_eq!((work_list[0].node1, work_list[0].node2), (0, c1));
    assert_eq!((work_list[1].node1, work_list[1].node2), (0, c2));

    // Scaling the first instance by 3 makes it 27 times larger.
    let (step, work_list) = first_step(3.0, 1.0);
    assert_eq!(step, Some(TraversalStep::Subdivided(Side::A)));
    let [c1, c2] = small.root().children().unwrap();
    assert_eq!((work_list[0].node1, work_list[0].node2), (c1, 0));
    assert_eq!((work_list[1].node1, work_list[1].node2), (c2, 0));

    // Exactly equal world volumes subdivide the second tree.
    let (step, _) = first_step(2.0, 1.0);
    assert_eq!(step, Some(TraversalStep::Subdivided(Side::B)));
}
