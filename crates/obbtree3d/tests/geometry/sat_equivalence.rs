use crate::common::random_pose;
use obbtree3d::bounding_volume::Obb;
use obbtree3d::math::{Isometry, Point, Real, Vector};
use obbtree3d::na::Vector3;
use obbtree3d::query::sat::{BoxOverlapTest, SatImplementation, ScalarObbOverlap, SimdObbOverlap};
use rand::{Rng, SeedableRng};
use rand_isaac::IsaacRng;

fn random_obb<R: Rng>(rng: &mut R, pos: &Isometry<Real>) -> Obb {
    let mut half_extents = rng.gen::<Vector3<Real>>() * 2.0;
    // Flat boxes are common for OBBs fitted on nearly-planar triangle sets.
    if rng.gen_range(0..8) == 0 {
        half_extents[rng.gen_range(0..3)] = 0.0;
    }

    Obb::from_half_extents(Point::origin(), half_extents).scaled_transformed(pos, 1.0)
}

#[test]
fn scalar_and_simd_sat_agree() {
    let mut rng = IsaacRng::seed_from_u64(42);
    let mut num_overlaps = 0;
    let num_tests = 20_000;

    for i in 0..num_tests {
        let pos1 = random_pose(&mut rng, 4.0);
        let pos2 = match i % 4 {
            // Same orientation: all the edge cross products are degenerate.
            0 => Isometry::from_parts(random_pose(&mut rng, 4.0).translation, pos1.rotation),
            // Axis-aligned.
            1 => Isometry::translation(rng.gen(), rng.gen(), rng.gen()),
            _ => random_pose(&mut rng, 4.0),
        };

        let obb1 = random_obb(&mut rng, &pos1);
        let obb2 = random_obb(&mut rng, &pos2);

        let scalar = ScalarObbOverlap.intersects(&obb1, &obb2);
        let simd = SimdObbOverlap.intersects(&obb1, &obb2);
        assert_eq!(scalar, simd, "SAT disagreement between {:?} and {:?}", obb1, obb2);

        assert_eq!(SatImplementation::Scalar.intersects(&obb1, &obb2), scalar);
        assert_eq!(SatImplementation::Simd.intersects(&obb1, &obb2), simd);

        if scalar {
            num_overlaps += 1;
        }
    }

    // Make sure both outcomes are well represented.
    assert!(num_overlaps > num_tests / 10);
    assert!(num_overlaps < num_tests * 9 / 10);
}

#[test]
fn sat_is_sound_for_contained_points() {
    let mut rng = IsaacRng::seed_from_u64(43);

    for _ in 0..5_000 {
        let pos1 = random_pose(&mut rng, 4.0);
        let half_extents1 = rng.gen::<Vector3<Real>>() * 2.0 + Vector::repeat(0.1);
        let obb1 = Obb::from_half_extents(Point::origin(), half_extents1).scaled_transformed(&pos1, 1.0);

        // Put one corner of the second box strictly inside of the first one.
        let local = obb1.half_extents.component_mul(
            &((rng.gen::<Vector3<Real>>() - Vector::repeat(0.5)) * 1.9),
        );
        let inner = obb1.center + obb1.orientation * local;
        let pos2 = random_pose(&mut rng, 1.0);
        let obb2 = random_obb(&mut rng, &pos2);
        let corner = obb2.vertices()[0];
        let obb2 = Obb::new(
            obb2.orientation,
            obb2.center + (inner - corner),
            obb2.half_extents,
        );

        assert!(ScalarObbOverlap.intersects(&obb1, &obb2));
        assert!(SimdObbOverlap.intersects(&obb1, &obb2));
    }
}

#[test]
fn far_boxes_never_overlap() {
    let mut rng = IsaacRng::seed_from_u64(44);

    for _ in 0..1_000 {
        let pos1 = random_pose(&mut rng, 1.0);
        let mut pos2 = random_pose(&mut rng, 1.0);
        // Half-extents are at most 2, so the bounding spheres have a radius of at most 2 * sqrt(3).
        pos2.translation.vector += Vector::new(0.0, 0.0, 20.0);

        let obb1 = random_obb(&mut rng, &pos1);
        let obb2 = random_obb(&mut rng, &pos2);

        assert!(!ScalarObbOverlap.intersects(&obb1, &obb2));
        assert!(!SimdObbOverlap.intersects(&obb1, &obb2));
    }
}
